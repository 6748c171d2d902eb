//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: Removes expired entries from in-process stores at a fixed interval

mod cleanup;

pub use cleanup::{spawn_cleanup_task, PurgeExpired};
