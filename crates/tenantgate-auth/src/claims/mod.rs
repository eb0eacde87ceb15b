//! Claim normalization and compact token decoding.

pub mod normalizer;
pub mod token;

pub use normalizer::{RoleEncoding, normalize_claims, normalize_roles};
pub use token::{claims_from_token, decode_token_payload, token_expiry};
