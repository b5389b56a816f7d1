//! Entity resolution for film datasets.
//!
//! Decides when rows from different sources describe the same movie, person
//! or award, and merges them into one row per entity.
//!
//! # Algorithm
//!
//! 1. Key cells are trimmed; rows with a missing key component are dropped
//!    (or kept apart when dropping is disabled).
//! 2. Keys are bucketed in input order. Identical keys always share a
//!    bucket; otherwise the first representative whose similarity reaches
//!    the threshold wins. Sequel titles ("Rocky II", "Spiderman 2") only
//!    match identical keys.
//! 3. Each bucket is reconciled into one survivor by the [`ConflictPolicy`].
//!
//! # Example
//!
//! ```ignore
//! use film_match::{AggregateOptions, Aggregator, ConflictPolicy};
//!
//! let options = AggregateOptions::new(["movie_name", "movie_date"])
//!     .with_policy(ConflictPolicy::Automatic);
//! let aggregation = Aggregator::new(options).aggregate(table)?;
//! println!("{} rows merged", aggregation.report.merged_rows);
//! ```

pub mod aggregate;
pub mod bucket;
mod error;
pub mod guards;
mod policy;
mod reconcile;
pub mod similarity;

pub use aggregate::{
    AggregateOptions, AggregateReport, Aggregation, Aggregator, DEFAULT_THRESHOLD, aggregate,
};
pub use bucket::{FuzzyMerge, ResolvedKey};
pub use error::{MatchError, Result};
pub use guards::{has_roman_numeral, has_sequel_number, is_sequel_title};
pub use policy::{ConflictPolicy, ReconcileScope};
pub use reconcile::{Conflict, ConflictOperator, Resolution, merge_automatic, merge_longest};
pub use similarity::{ratio, render_key};
