// Mining module.
// Source file filtering, touch aggregation, and the runs that tie them to the fetcher.

pub mod aggregate;
pub mod filter;
pub mod pipeline;

pub use aggregate::{RunSummary, TouchCounts, TouchLog, TouchRecord};
pub use filter::{LanguageSet, LanguageTable, SourceFilter, is_source_file, source_extensions};
pub use pipeline::{FileSelection, Miner};
