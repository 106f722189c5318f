use std::collections::BTreeMap;
use std::convert::TryFrom;

use log::debug;

use crate::alloc::{BlockAllocator, BlockId};
use crate::config::{FullPolicy, VolumeBuilder, DEFAULT_BLOCK_SIZE, DEFAULT_CAPACITY};
use crate::error::{FsError, Result};

/// Stand-in for block content. Blocks never hold bytes.
pub const PLACEHOLDER: &str = "<content goes here>";

/// Metadata for a single file in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// The declared size of the file in bytes. Fixed at creation.
    size: u64,
    /// Owned blocks in the order they were allocated.
    blocks: Vec<BlockId>,
}

impl FileEntry {
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }
}

/// Block accounting for the whole volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub capacity: usize,
    pub used: usize,
    pub free: usize,
    /// Used blocks owned by no file, see `FullPolicy::Leak`.
    pub orphaned: usize,
}

/// A single flat directory over a fixed pool of blocks, held entirely in
/// memory.
///
/// Every change of block ownership goes through the volume: a file either owns
/// all the blocks its size calls for or it does not exist.
#[derive(Debug, Clone)]
pub struct Volume {
    block_size: u64,
    full_policy: FullPolicy,
    alloc: BlockAllocator,
    entries: BTreeMap<String, FileEntry>,
    /// Blocks left marked used by creates that ran out of space.
    orphans: Vec<BlockId>,
}

impl Default for Volume {
    fn default() -> Self {
        Self::new()
    }
}

impl Volume {
    /// Creates a volume with the default geometry of 1000 blocks of 1024 bytes.
    pub fn new() -> Self {
        Self::with_geometry(DEFAULT_BLOCK_SIZE, DEFAULT_CAPACITY, FullPolicy::default())
    }

    pub fn builder() -> VolumeBuilder {
        VolumeBuilder::new()
    }

    pub(crate) fn with_geometry(block_size: u64, capacity: usize, full_policy: FullPolicy) -> Self {
        Self {
            block_size,
            full_policy,
            alloc: BlockAllocator::new(capacity),
            entries: BTreeMap::new(),
            orphans: Vec::new(),
        }
    }

    /// Number of blocks a file of `size` bytes occupies.
    pub fn blocks_needed(&self, size: u64) -> usize {
        let blocks = size / self.block_size + u64::from(size % self.block_size != 0);
        // Anything beyond usize can never be satisfied anyway.
        usize::try_from(blocks).unwrap_or(usize::MAX)
    }

    /// Creates a file of `size` bytes and returns the blocks it was given.
    ///
    /// A zero sized file owns no blocks. If the pool runs out part way through,
    /// the directory is left untouched and the blocks already taken are either
    /// orphaned or returned depending on the volume's `FullPolicy`.
    pub fn create(&mut self, name: &str, size: u64) -> Result<&[BlockId]> {
        if self.entries.contains_key(name) {
            return Err(FsError::AlreadyExists(name.to_string()));
        }

        let needed = self.blocks_needed(size);
        let mut blocks = Vec::with_capacity(needed.min(self.alloc.free_blocks()));
        while blocks.len() < needed {
            match self.alloc.allocate_one() {
                Some(blocknr) => blocks.push(blocknr),
                None => return Err(self.abandon(blocks, needed)),
            }
        }

        debug!("created {} ({} bytes) on blocks {:?}", name, size, blocks);
        let entry = self
            .entries
            .entry(name.to_string())
            .or_insert(FileEntry { size, blocks });
        Ok(&entry.blocks)
    }

    fn abandon(&mut self, taken: Vec<BlockId>, needed: usize) -> FsError {
        let obtained = taken.len();
        match self.full_policy {
            FullPolicy::Leak => {
                if !taken.is_empty() {
                    debug!("orphaned blocks {:?}", taken);
                }
                self.orphans.extend(taken);
            }
            FullPolicy::Rollback => {
                for blocknr in taken {
                    self.alloc.free_one(blocknr);
                }
            }
        }
        FsError::DiskFull { needed, obtained }
    }

    /// Removes a file and returns all of its blocks to the pool.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let entry = self
            .entries
            .remove(name)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        for &blocknr in entry.blocks.iter() {
            self.alloc.free_one(blocknr);
        }
        debug!("deleted {}, freed blocks {:?}", name, entry.blocks);
        Ok(())
    }

    /// Returns the blocks a read of the file would visit, in order.
    pub fn read(&self, name: &str) -> Result<&[BlockId]> {
        Ok(self.stat(name)?.blocks())
    }

    /// Returns the blocks a write of `data` would land on, in order. The data
    /// is not stored and the file keeps its size and blocks.
    pub fn write(&self, name: &str, data: &str) -> Result<&[BlockId]> {
        let entry = self.stat(name)?;
        debug!(
            "write of {} bytes to {} spans blocks {:?}",
            data.len(),
            name,
            entry.blocks
        );
        Ok(entry.blocks())
    }

    /// Pairs each owned block, in order, with placeholder content.
    pub fn view_content(&self, name: &str) -> Result<Vec<(BlockId, &'static str)>> {
        Ok(self
            .stat(name)?
            .blocks()
            .iter()
            .map(|&blocknr| (blocknr, PLACEHOLDER))
            .collect())
    }

    pub fn stat(&self, name: &str) -> Result<&FileEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| FsError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All files sorted by name.
    pub fn files(&self) -> impl Iterator<Item = (&str, &FileEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn orphaned_blocks(&self) -> &[BlockId] {
        &self.orphans
    }

    pub fn is_allocated(&self, blocknr: BlockId) -> bool {
        self.alloc.is_allocated(blocknr)
    }

    pub fn usage(&self) -> Usage {
        Usage {
            capacity: self.alloc.capacity(),
            used: self.alloc.used_blocks(),
            free: self.alloc.free_blocks(),
            orphaned: self.orphans.len(),
        }
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn capacity(&self) -> usize {
        self.alloc.capacity()
    }

    pub fn full_policy(&self) -> FullPolicy {
        self.full_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_volume(blocks: usize) -> Volume {
        Volume::builder()
            .with_capacity(blocks)
            .build()
            .expect("Could not build test volume.")
    }

    #[test]
    fn create_allocates_ceil_of_size_over_block_size() {
        let mut vol = Volume::new();

        assert_eq!(vol.create("one", 1).unwrap(), &[0]);
        assert_eq!(vol.create("exact", 2048).unwrap(), &[1, 2]);
        assert_eq!(vol.create("over", 2049).unwrap(), &[3, 4, 5]);
        assert_eq!(vol.read("over").unwrap().len(), 3);
    }

    #[test]
    fn zero_sized_file_owns_no_blocks() {
        let mut vol = small_volume(1);

        assert!(vol.create("empty", 0).unwrap().is_empty());
        assert_eq!(vol.usage().used, 0);
        assert!(vol.contains("empty"));
    }

    #[test]
    fn zero_sized_file_can_be_created_on_full_disk() {
        let mut vol = small_volume(1);
        vol.create("big", 1024).unwrap();

        assert!(vol.create("empty", 0).is_ok());
    }

    #[test]
    fn duplicate_name_returns_error_and_keeps_original() {
        let mut vol = small_volume(8);
        vol.create("a", 2048).unwrap();

        let result = vol.create("a", 4096);
        match result.unwrap_err() {
            FsError::AlreadyExists(name) => assert_eq!(name, "a"),
            other => panic!("Unexpected error type: {:?}", other),
        }
        assert_eq!(vol.read("a").unwrap(), &[0, 1]);
        assert_eq!(vol.stat("a").unwrap().size(), 2048);
        assert_eq!(vol.usage().used, 2);
    }

    #[test]
    fn missing_file_returns_not_found_for_every_accessor() {
        let mut vol = small_volume(4);
        let missing = FsError::NotFound("ghost".to_string());

        assert_eq!(vol.delete("ghost").unwrap_err(), missing);
        assert_eq!(vol.read("ghost").unwrap_err(), missing);
        assert_eq!(vol.write("ghost", "data").unwrap_err(), missing);
        assert_eq!(vol.view_content("ghost").unwrap_err(), missing);
        assert_eq!(vol.stat("ghost").unwrap_err(), missing);
    }

    #[test]
    fn delete_frees_blocks_for_reuse() {
        let mut vol = small_volume(4);
        vol.create("a", 2048).unwrap();
        vol.create("b", 1024).unwrap();

        vol.delete("a").unwrap();
        assert!(!vol.contains("a"));
        assert!(!vol.is_allocated(0));
        assert!(!vol.is_allocated(1));

        assert_eq!(vol.create("a", 2048).unwrap(), &[0, 1]);
    }

    #[test]
    fn write_reports_blocks_without_resizing() {
        let mut vol = small_volume(4);
        vol.create("a", 1024).unwrap();

        let blocks = vol.write("a", &"x".repeat(5000)).unwrap().to_vec();

        assert_eq!(blocks, vec![0]);
        assert_eq!(vol.stat("a").unwrap().size(), 1024);
        assert_eq!(vol.usage().used, 1);
    }

    #[test]
    fn view_content_pairs_blocks_with_placeholder() {
        let mut vol = small_volume(4);
        vol.create("a", 3000).unwrap();

        assert_eq!(
            vol.view_content("a").unwrap(),
            vec![(0, PLACEHOLDER), (1, PLACEHOLDER), (2, PLACEHOLDER)]
        );
    }

    #[test]
    fn block_order_follows_allocation_order() {
        let mut vol = small_volume(6);
        vol.create("a", 1024).unwrap();
        vol.create("b", 1024).unwrap();
        vol.create("c", 1024).unwrap();
        vol.delete("b").unwrap();

        // Block 1 is the lowest hole, the rest comes after the live files.
        assert_eq!(vol.create("d", 3072).unwrap(), &[1, 3, 4]);
        assert_eq!(vol.read("d").unwrap(), &[1, 3, 4]);
    }

    #[test]
    fn disk_full_leaves_partial_blocks_orphaned() {
        let mut vol = small_volume(3);
        vol.create("a", 2048).unwrap();

        let err = vol.create("b", 2048).unwrap_err();
        assert_eq!(err, FsError::DiskFull { needed: 2, obtained: 1 });
        assert!(!vol.contains("b"));
        assert_eq!(vol.orphaned_blocks(), &[2]);
        assert!(vol.is_allocated(2));
        assert_eq!(
            vol.usage(),
            Usage {
                capacity: 3,
                used: 3,
                free: 0,
                orphaned: 1
            }
        );
    }

    #[test]
    fn disk_full_with_rollback_restores_pool() {
        let mut vol = Volume::builder()
            .with_capacity(3)
            .with_full_policy(FullPolicy::Rollback)
            .build()
            .unwrap();
        vol.create("a", 2048).unwrap();

        let err = vol.create("b", 2048).unwrap_err();
        assert_eq!(err, FsError::DiskFull { needed: 2, obtained: 1 });
        assert!(vol.orphaned_blocks().is_empty());
        assert!(!vol.is_allocated(2));
        assert_eq!(vol.create("c", 1024).unwrap(), &[2]);
    }

    #[test]
    fn enormous_size_fails_with_disk_full() {
        let mut vol = small_volume(2);

        let err = vol.create("huge", u64::MAX).unwrap_err();
        match err {
            FsError::DiskFull { obtained, .. } => assert_eq!(obtained, 2),
            other => panic!("Unexpected error type: {:?}", other),
        }
    }

    #[test]
    fn files_are_listed_by_name() {
        let mut vol = small_volume(8);
        vol.create("zeta", 10).unwrap();
        vol.create("alpha", 10).unwrap();

        let names: Vec<&str> = vol.files().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(vol.len(), 2);
        assert!(!vol.is_empty());
    }

    #[test]
    fn blocks_needed_handles_custom_block_size() {
        let vol = Volume::builder().with_block_size(512).build().unwrap();

        assert_eq!(vol.blocks_needed(0), 0);
        assert_eq!(vol.blocks_needed(512), 1);
        assert_eq!(vol.blocks_needed(513), 2);
    }
}
