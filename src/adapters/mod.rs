//! Adapter implementations for port traits.
//!
//! - `live/`: AWS SDK implementations
//! - `memory`: in-process implementations for local runs and tests
//! - `recording/`: record interactions to cassettes
//! - `replaying/`: replay interactions from cassettes

pub mod live;
pub mod memory;
pub mod recording;
pub mod replaying;
