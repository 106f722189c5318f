use log::trace;

/// The block number to access ranging from 0 (the first block) to n - 1 (the last
/// block) where n is the capacity of the pool.
pub type BlockId = usize;

const WORD_BITS: usize = 64;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum State {
    Free,
    Used,
}

/// One bit per block, packed into 64 bit words. A set bit marks a used block.
#[derive(Debug, Clone)]
pub struct Bitmap {
    words: Vec<u64>,
    /// Number of meaningful bits. Bits past this in the last word are never set.
    len: usize,
}

impl Bitmap {
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; (len + WORD_BITS - 1) / WORD_BITS],
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn get(&self, blocknr: BlockId) -> State {
        assert!(blocknr < self.len, "block {} out of range", blocknr);
        // Grab the u64 containing the significant bit.
        let word = self.words[blocknr / WORD_BITS];

        let mask = 1_u64 << (blocknr % WORD_BITS);
        if word & mask == 0 {
            State::Free
        } else {
            State::Used
        }
    }

    pub fn set_reserved(&mut self, blocknr: BlockId) {
        assert!(blocknr < self.len, "block {} out of range", blocknr);
        self.words[blocknr / WORD_BITS] |= 1_u64 << (blocknr % WORD_BITS);
    }

    pub fn set_free(&mut self, blocknr: BlockId) {
        assert!(blocknr < self.len, "block {} out of range", blocknr);
        self.words[blocknr / WORD_BITS] &= !(1_u64 << (blocknr % WORD_BITS));
    }

    /// Returns the lowest numbered free block, if any.
    pub fn first_free(&self) -> Option<BlockId> {
        for (i, &word) in self.words.iter().enumerate() {
            if word == u64::MAX {
                continue;
            }
            let blocknr = i * WORD_BITS + (!word).trailing_zeros() as usize;
            // The tail of the last word is padding, not blocks.
            return if blocknr < self.len {
                Some(blocknr)
            } else {
                None
            };
        }
        None
    }
}

/// Hands out blocks from a fixed pool, always picking the lowest numbered free
/// block so allocation order is deterministic.
///
/// The scan is linear in the number of words in the bitmap. Fully used words
/// are skipped wholesale, which keeps the reference pool of 1000 blocks down to
/// 16 word checks in the worst case.
#[derive(Debug, Clone)]
pub struct BlockAllocator {
    bitmap: Bitmap,
    free: usize,
}

impl BlockAllocator {
    pub fn new(capacity: usize) -> Self {
        Self {
            bitmap: Bitmap::new(capacity),
            free: capacity,
        }
    }

    /// Reserves the lowest free block. Returns `None` once the pool is
    /// exhausted, which callers are expected to handle.
    pub fn allocate_one(&mut self) -> Option<BlockId> {
        let blocknr = self.bitmap.first_free()?;
        self.bitmap.set_reserved(blocknr);
        self.free -= 1;
        trace!("allocated block {}", blocknr);
        Some(blocknr)
    }

    /// Returns a block to the pool.
    ///
    /// # Panics
    ///
    /// Freeing a block that is out of range or already free means the caller's
    /// ownership records are corrupt, so this panics rather than carry on.
    pub fn free_one(&mut self, blocknr: BlockId) {
        assert!(
            blocknr < self.bitmap.len(),
            "freed block {} outside of pool of {} blocks",
            blocknr,
            self.bitmap.len()
        );
        assert_eq!(
            self.bitmap.get(blocknr),
            State::Used,
            "double free of block {}",
            blocknr
        );
        self.bitmap.set_free(blocknr);
        self.free += 1;
        trace!("freed block {}", blocknr);
    }

    pub fn get(&self, blocknr: BlockId) -> State {
        self.bitmap.get(blocknr)
    }

    /// Out of range blocks are reported as not allocated.
    pub fn is_allocated(&self, blocknr: BlockId) -> bool {
        blocknr < self.bitmap.len() && self.bitmap.get(blocknr) == State::Used
    }

    pub fn capacity(&self) -> usize {
        self.bitmap.len()
    }

    pub fn free_blocks(&self) -> usize {
        self.free
    }

    pub fn used_blocks(&self) -> usize {
        self.capacity() - self.free
    }
}
