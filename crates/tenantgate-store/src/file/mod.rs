//! JSON-file session store.

pub mod store;

pub use store::FileSessionStore;
