//! Core data types for feature occurrences, baseline data, and scan results.
//!
//! This module contains the fundamental types used throughout codesense:
//!
//! - [`FeatureOccurrence`] - A candidate web API usage found in source text
//! - [`BaselineStatus`] - The Baseline availability tier of a feature
//! - [`BaselineInfo`] - A resolved status plus its supporting metadata
//! - [`Issue`] - An occurrence joined with its resolved status
//! - [`ScanResult`] - All issues reported for one file
//!
//! # Example
//!
//! ```
//! use codesense::{BaselineInfo, BaselineStatus, FeatureOccurrence, Issue};
//!
//! let occurrence = FeatureOccurrence::new("fetch").at(1, 1).with_context("fetch()");
//! let info = BaselineInfo::new(BaselineStatus::WidelyAvailable);
//! let issue = Issue::new(occurrence, &info);
//!
//! assert_eq!(issue.feature, "fetch");
//! ```

mod baseline;
mod issue;

pub use baseline::*;
pub use issue::*;
