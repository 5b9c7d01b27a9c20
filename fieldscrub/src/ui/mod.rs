// fieldscrub/src/ui/mod.rs
//! Terminal presentation: status messages and the run summary, written to
//! stderr and coloured only when the stream is a terminal.

pub mod output_format;
pub mod summary;
