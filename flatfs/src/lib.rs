//! An in-memory file store over a fixed pool of fixed size blocks.
//!
//! Files live in one flat directory. Creating a file reserves
//! `ceil(size / block_size)` blocks from the pool, lowest numbered free block
//! first, and deleting it hands them all back. Blocks carry no bytes: reads,
//! writes and content views report which blocks would be touched.
//!
//! ```
//! use flatfs::{FsError, Volume};
//!
//! let mut vol = Volume::builder().with_capacity(4).build().unwrap();
//! assert_eq!(vol.create("a", 2048).unwrap(), &[0, 1]);
//! assert_eq!(vol.create("a", 1), Err(FsError::AlreadyExists("a".to_string())));
//! ```

mod alloc;
mod config;
mod error;
mod fs;
mod shared;

pub use crate::alloc::{BlockAllocator, BlockId, State};
pub use crate::config::{FullPolicy, VolumeBuilder, DEFAULT_BLOCK_SIZE, DEFAULT_CAPACITY};
pub use crate::error::{ConfigError, FsError, Result};
pub use crate::fs::{FileEntry, Usage, Volume, PLACEHOLDER};
pub use crate::shared::SharedVolume;
