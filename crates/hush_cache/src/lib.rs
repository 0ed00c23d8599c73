//! URL-keyed response cache shared by every connection handler.

mod entry;
mod freshness;
mod store;

pub use entry::CachedEntry;
pub use freshness::{RevalidateError, check_not_modified};
pub use store::CacheStore;
