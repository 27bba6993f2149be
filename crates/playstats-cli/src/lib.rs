//! # PlayStats CLI
//!
//! Terminal front end for PlayStats: loads configuration, runs one fetch
//! cycle for an account identifier and prints the resulting report.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod cli;
pub mod error;
pub mod presenter;

pub use app::*;
pub use cli::*;
pub use error::*;
pub use presenter::*;
