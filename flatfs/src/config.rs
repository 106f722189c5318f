use crate::error::ConfigError;
use crate::fs::Volume;

/// Bytes covered by one block unless configured otherwise.
pub const DEFAULT_BLOCK_SIZE: u64 = 1024;
/// Blocks in the pool unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 1000;

/// What a create does with the blocks it already took when the pool runs dry
/// before the file is fully allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullPolicy {
    /// Keep them marked used. They belong to no file and are reported by
    /// `Volume::orphaned_blocks`.
    Leak,
    /// Hand them back to the pool.
    Rollback,
}

impl Default for FullPolicy {
    fn default() -> Self {
        FullPolicy::Leak
    }
}

/// Fixes the volume geometry. None of these can change once the volume is
/// built.
#[derive(Debug, Clone)]
pub struct VolumeBuilder {
    block_size: u64,
    capacity: usize,
    full_policy: FullPolicy,
}

impl Default for VolumeBuilder {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            capacity: DEFAULT_CAPACITY,
            full_policy: FullPolicy::default(),
        }
    }
}

impl VolumeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of bytes each block accounts for.
    pub fn with_block_size(mut self, bytes: u64) -> Self {
        self.block_size = bytes;
        self
    }

    /// Sets the number of blocks in the pool.
    pub fn with_capacity(mut self, blocks: usize) -> Self {
        self.capacity = blocks;
        self
    }

    pub fn with_full_policy(mut self, policy: FullPolicy) -> Self {
        self.full_policy = policy;
        self
    }

    pub fn build(self) -> Result<Volume, ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::InvalidArgument(
                "block size must be greater than zero".to_string(),
            ));
        }
        if self.capacity == 0 {
            return Err(ConfigError::InvalidArgument(
                "capacity must be at least one block".to_string(),
            ));
        }
        Ok(Volume::with_geometry(
            self.block_size,
            self.capacity,
            self.full_policy,
        ))
    }
}
