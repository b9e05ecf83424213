//! Discovery Module
//!
//! The periodic refresh loop and the target groups it produces.

mod engine;
mod target_group;

pub use engine::Discovery;
pub use target_group::TargetGroup;
