//! Core domain model for markclash trademark conflict analysis.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `TextField`: an opaque display string as it arrived from a collaborator
//! - `CandidateRecord`: extraction output for one page/document unit
//! - `ReferenceEntry`: one row of the existing trademark database
//! - `SubScore`, `ComparisonResult`, `CandidateOutcome`: scoring output
//! - `ThresholdConfig`: tier boundaries and family weights

mod config;
mod record;
mod score;

pub use config::{ConfigError, FamilyWeights, ThresholdConfig, TierBounds, SENSITIVITY_RANGE};
pub use record::{CandidateRecord, ReferenceEntry, TextField, TrademarkStatus};
pub use score::{
    Algorithm, CandidateOutcome, ComparisonResult, Family, FieldScore, MalformedInput,
    MatchedField, SubScore, Tier,
};
