//! Ordered route policy table and access evaluation.

pub mod defaults;
pub mod pattern;
pub mod resolver;
pub mod table;

pub use defaults::{DEFAULT_USER_PERMISSIONS, default_policies};
pub use pattern::RoutePattern;
pub use resolver::{AccessDecision, DenyReason, RoutePolicyResolver};
pub use table::{PolicyMatch, PolicyTable};
