// Export module.
// Writes aggregate tables as CSV and reads file lists back from earlier runs.

pub mod reader;
pub mod writer;

pub use reader::read_source_files;
pub use writer::{
    COUNT_HEADER, DETAILED_HEADER, SIMPLE_HEADER, write_author_touches, write_counts,
    write_file_histories,
};
