//! Scoring pipeline.
//!
//! Raw answers flow through normalization and aggregation into profiles,
//! which are classified, gated on coverage and compared pairwise.

pub mod aggregator;
pub mod classifier;
pub mod comparator;
pub mod coverage;
pub mod normalize;
