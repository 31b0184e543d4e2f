//! # Galaxy Development Tools
//!
//! Command-line tools for development:
//! - Data validators
//! - Headless scripted simulation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod simulate;
pub mod validate;
