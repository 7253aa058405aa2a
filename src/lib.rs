// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod metrics;
pub mod period;
pub mod record;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::error::ValidationError;
pub use crate::filter::RecordFilter;
pub use crate::period::{Granularity, Period};
pub use crate::record::{Status, SubscriptionRecord};
