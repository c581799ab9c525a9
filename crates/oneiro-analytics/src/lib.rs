//! Dream analytics engine.
//!
//! Pure, synchronous computation over an in-memory batch of dream records:
//! no I/O, no persistence, recomputed from scratch on every call. Every
//! metric excludes records missing the relevant field from its denominator
//! rather than substituting zeros, and an empty input produces a fully
//! zeroed report instead of an error.

pub mod recommend;
pub mod record;
pub mod report;
pub mod stats;

pub use recommend::{Priority, Recommendation};
pub use record::DreamRecord;
pub use report::{DreamAnalysis, analyze};
pub use stats::{Trend, pearson_correlation};
