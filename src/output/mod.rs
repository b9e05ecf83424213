//! Output Module
//!
//! Sinks for discovered target groups beyond the HTTP endpoint.

mod file_sd;

pub use file_sd::FileSdWriter;
