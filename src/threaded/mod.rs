//! Partitioned multi-task multiplication.
//!
//! The output is split into a fixed grid of disjoint blocks, one unit of
//! work per block, all joined before the product is returned. Units share
//! the inputs read-only and write straight into one output buffer; the
//! partition guarantees they never write the same cell.
//!
//! - `partition`: the pure block arithmetic
//! - `engine`: dispatch onto a rayon pool and the join
//! - `cancel`: optional cooperative stop signal

pub mod cancel;
pub mod engine;
pub mod partition;

pub use cancel::CancellationToken;
pub use engine::{Engine, EngineConfig, multiply_parallel, try_multiply_parallel};
pub use partition::{Block, compute_blocks, compute_blocks_truncating};
