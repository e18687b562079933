//! Scoring and ranking for trademark conflict detection.
//!
//! Takes normalized sub-scores from `markclash-features`, folds them into a
//! weighted composite, classifies the composite into a conflict tier and
//! ranks whole reference sets per candidate.

mod aggregate;
mod classify;
mod compare;
mod config;

pub use aggregate::{aggregate, family_mean, round2, Aggregate};
pub use classify::{classify, ConflictClassifier};
pub use compare::{BatchOutcome, Comparator};
pub use config::{ComparatorConfig, SecondaryField};

pub use tokio_util::sync::CancellationToken;
