//! Audio block memory.
//!
//! [`BlockPool`] is a fixed arena of `POOL_SIZE` blocks managed by an atomic
//! bitmap. Blocks leave the pool as [`PooledBlock`] handles and return to it
//! when the handle is dropped.
//!
//! ```text
//!  alloc / alloc_set          move           drop
//! ┌──────┐ ───────────► ┌──────┐ ──────► ┌──────┐ ──────► back to pool
//! │ free │              │ held │         │ sink │
//! └──────┘              └──────┘         └──────┘
//! ```

pub mod pool;
mod handle;

pub use handle::PooledBlock;
pub use pool::BlockPool;
