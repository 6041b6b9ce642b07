/*!
Core of the report writing assistant.

This crate holds everything that does not touch a file, a network socket or a
terminal:

* identifier normalization and the benchmark resolver ([`normalize`], [`resolve`])
* the in-memory score dataset ([`Dataset`])
* the comparison engine producing the structured comparison reports
* the prompt templates and the [`Narrator`] sitting in front of a [`TextGenerator`]
* the report assembler ([`assemble`]) and the run orchestrator ([`Pipeline`])

The readers, the remote text generator and the document writer are provided by
the caller through the traits [`TableSource`], [`TextGenerator`] and
[`ContentExtractor`]. See the [`manual`] for the expected table layouts.
*/

mod assemble;
mod compare;
mod config;
mod dataset;
pub mod manual;
mod matching;
mod narrative;
mod pipeline;

use std::error::Error;
use std::fmt::Display;

pub use crate::assemble::*;
pub use crate::compare::*;
pub use crate::config::*;
pub use crate::dataset::*;
pub use crate::matching::*;
pub use crate::narrative::*;
pub use crate::pipeline::*;

/// Errors that stop a run, or a lookup, from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ReportErrors {
    /// One of the source tables could not be read or parsed.
    DatasetUnavailable(String),
    /// The primary (PCB) document was not provided.
    MissingPrimaryDocument,
    /// A benchmark table has no rows.
    NoBenchmarkData,
    /// A source table misses a column the layout requires.
    MissingColumn(String),
}

impl Error for ReportErrors {}

impl Display for ReportErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportErrors::DatasetUnavailable(msg) => write!(f, "Error loading Excel files: {}", msg),
            ReportErrors::MissingPrimaryDocument => {
                write!(f, "Silakan upload file PCB terlebih dahulu!")
            }
            ReportErrors::NoBenchmarkData => write!(f, "no benchmark data"),
            ReportErrors::MissingColumn(name) => write!(f, "missing column {:?}", name),
        }
    }
}
