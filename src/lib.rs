//! defdex keeps a hand-maintained API definitions index in step with the Go
//! definitions embedded in a set of markdown API documents.
//!
//! A run discovers definitions, scores each one against every numbered
//! section of the index, reconciles the resulting expected index with what
//! the file says today, and can rewrite the file once an operator confirms.

pub mod apply;
pub mod config;
pub mod describe;
pub mod discovery;
pub mod error;
pub mod index;
pub mod markdown;
pub mod model;
pub mod placement;
pub mod reconcile;
pub mod report;
pub mod scoring;
pub mod tables;

pub use error::{Error, Result};
