//! Background Tasks Module
//!
//! Contains the long-running tasks spawned next to the HTTP server.
//!
//! # Tasks
//! - Sweeper: Removes expired cache entries at configured intervals
//! - Publisher: Hands each discovered batch to the API state and file output

mod publisher;
mod sweeper;

pub use publisher::spawn_publisher;
pub use sweeper::spawn_sweeper;
