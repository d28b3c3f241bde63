//! On-disk cache for geocoding matches
//!
//! Resolving a place name to coordinates always yields the same answer, so
//! matches are kept on disk for a configurable number of hours. Forecasts are
//! never cached.

mod manager;

pub use manager::{CacheManager, CachedData};
