//! Console-side core: the store client, the reconnecting change notifier,
//! and the refresh coordinator that owns the list cache. The presentation
//! layer consumes these through their public interfaces only.

pub mod notifier;
pub mod refresh;
pub mod session;
pub mod store;
