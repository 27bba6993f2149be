//! # PlayStats Analytics
//!
//! Derived playtime analytics for one account identifier.
//!
//! This crate turns the two retrieved activity collections into rankings,
//! a category distribution and formatted magnitudes, and runs the fetch
//! cycles that keep this state consistent while the identifier changes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod aggregation;
pub mod format;
pub mod identity;
pub mod merge;
pub mod orchestrator;
pub mod ranking;
pub mod report;
pub mod snapshot;
pub mod source;

pub use aggregation::*;
pub use format::*;
pub use identity::*;
pub use merge::*;
pub use orchestrator::*;
pub use ranking::*;
pub use report::*;
pub use snapshot::*;
pub use source::*;
