//! filedoc: classify data and source files and extract renderer-agnostic
//! documentation summaries from them.

pub mod config;
pub mod core;
pub mod error;

pub use crate::core::{analyze, DocumentationModel, Engine, FileKind, SummaryBody};
pub use crate::error::{FiledocError, Result};
