//! Versioned response cache and retrieval strategies for liftlog.
//!
//! Responses are stored in named generations, keyed by request identity
//! (method + URL), with exactly one entry per key per generation:
//!
//! - the **static** generation holds the app shell, populated once at
//!   install time from an explicit asset manifest (fail-fast: a partial
//!   static set fails the whole install)
//! - the **dynamic** generation mirrors live endpoint responses and is
//!   updated on every successful network read
//!
//! Generation names carry a build identifier; retiring a build deletes
//! every generation that does not match the current pair.
//!
//! Two retrieval strategies sit on top:
//!
//! - **network-first** for endpoint reads: try the network, mirror a
//!   success into the dynamic generation, fall back to the cached copy
//!   when the network fails
//! - **cache-first** for static assets: a cache hit never touches the
//!   network; a miss is fetched and returned without guaranteed storage

mod error;
mod install;
mod loader;
mod store;

pub use error::{CacheError, CacheResult};
pub use install::AssetManifest;
pub use loader::{CacheConfig, ResourceLoader, GENERATION_PREFIX};
pub use store::{CacheStore, CachedResponse, RequestKey};
