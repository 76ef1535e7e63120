//! The index-linked heap core.
use core::{marker::PhantomData, mem, ptr::NonNull};

/// Size of one heap cell in bytes, header included.
pub const BLOCK_SIZE: usize = 8;

/// Payload bytes available in the first cell of a block.
///
/// When a block is handed out, the two free-list link words are overwritten
/// by user data, so only the header words are lost to bookkeeping.
pub const BODY_SIZE: usize = BLOCK_SIZE - mem::size_of::<Link>();

/// The largest number of cells a single pool may have.
///
/// Block numbers are 15-bit, so index `0x7FFF` is the last addressable cell
/// (~256 KiB of heap at the 8-byte cell size).
pub const MAX_BLOCKS: usize = BLOCKNO_MASK as usize;

/// High bit of a cell's next-index word: set iff the block is free.
const FREELIST_MASK: u16 = 0x8000;
/// Low 15 bits of a cell's next-index word: the block number proper.
const BLOCKNO_MASK: u16 = 0x7FFF;

/// A forward/backward index pair, the unit all four link fields are made of.
#[repr(C)]
#[derive(Clone, Copy)]
struct Link {
    next: u16,
    prev: u16,
}

/// A cell body: free-list links while the block is free, user data once the
/// block is handed out. The free flag in the owning cell's header word is
/// the discriminant; nothing ever reads the other interpretation.
#[repr(C)]
#[derive(Clone, Copy)]
union Body {
    free: Link,
    data: [u8; BODY_SIZE],
}

/// One heap cell.
///
/// ```text
///        +------+------+------+------+
///      c | *next| prev | nfree| pfree|   free block
///        +------+------+------+------+
///      c |  next| prev |    data     |   used block
///        +------+------+------+------+
/// ```
///
/// `next`/`prev` chain the cells in physical order; `nfree`/`pfree` chain
/// the free blocks. All four are cell indices, not addresses. The `*` marks
/// the free flag, carried in bit 15 of `next`.
///
/// A pool is declared as a plain array of zeroed cells:
///
/// ```
/// use idxalloc::Block;
/// static mut POOL: [Block; 2048] = [Block::NEW; 2048];
/// ```
#[repr(C, align(4))]
#[derive(Clone, Copy)]
pub struct Block {
    header: Link,
    body: Body,
}

impl Block {
    /// A zeroed cell, the required initial state of every pool cell.
    pub const NEW: Self = Self {
        header: Link { next: 0, prev: 0 },
        body: Body {
            data: [0; BODY_SIZE],
        },
    };
}

// The layout contract everything below relies on.
const _: () = assert!(mem::size_of::<Block>() == BLOCK_SIZE);
const _: () = assert!(mem::size_of::<Link>() == 4);

/// Counts gathered by [`Heap::info`].
///
/// `entries` are logical blocks, `blocks` are cells. `free_match` is set to
/// the probe pointer when it named the header of a free block (see
/// [`Heap::info`]).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapInfo {
    pub total_entries: u16,
    pub total_blocks: u16,
    pub used_entries: u16,
    pub used_blocks: u16,
    pub free_entries: u16,
    pub free_blocks: u16,
    pub free_match: Option<NonNull<u8>>,
}

/// The heap engine.
///
/// # Data Structure Overview
///
/// The pool is an array of 8-byte cells. A *logical block* is a run of
/// cells owned by the first one; only that first cell carries live link
/// fields. Two doubly linked lists are threaded through the cells, both
/// anchored at cell 0 (the sentinel, which never holds data):
///
/// ```text
///             physical order                         free list
///
///        +--------------------+
///      0 | next: 1            |             0 | nfree ----------+
///        +--------------------+               +------+          |
///      1 |  next: 3 | prev: 0 |  used                |          |
///        +--------------------+                      |          v
///      3 | *next: 4 | prev: 1 |  free   <------------|--- nfree/pfree
///        +--------------------+                      |
///      4 |  next: 6 | prev: 3 |  used                |
///        +--------------------+                      v
///      6 | *next: 0 | prev: 4 |  free   <--- nfree/pfree
///        +--------------------+
/// ```
///
/// A `next` of 0 marks the last block: its cells run to the end of the
/// pool. Adjacent free blocks never coexist; freeing eagerly merges with
/// both physical neighbors, so the free list stays short and its blocks
/// stay as large as possible.
///
/// # Properties
///
/// Allocation, deallocation and the in-place resize paths touch a bounded
/// number of links once the fit search has picked a block. Returned
/// pointers are 4-byte aligned; requests needing more than that are the
/// caller's problem (pad the size and align by hand, or use a different
/// allocator).
///
/// All methods take `&mut self` (or `&self` for the read-only walker);
/// mutual exclusion against other contexts, interrupt handlers included,
/// is the host's job. See `SpinLockedHeap` for a ready-made lock wrapper.
pub struct Heap<'pool> {
    base: NonNull<Block>,
    nblocks: u16,
    _phantom: PhantomData<&'pool mut [Block]>,
}

// Safety: All cells are logically owned by the `Heap` for `'pool` and have
//         no interior mutability, so these are safe.
unsafe impl Send for Heap<'_> {}
unsafe impl Sync for Heap<'_> {}

/// Emit a walker dump line: loud when `force`d, trace-level otherwise.
macro_rules! dump {
    ($force:expr, $($arg:tt)*) => {
        if $force {
            log::info!($($arg)*)
        } else {
            log::trace!($($arg)*)
        }
    };
}

/// Number of cells a payload of `size` bytes occupies.
///
/// The first cell contributes only [`BODY_SIZE`] bytes (its header is
/// bookkeeping); every further cell is payload in full.
fn blocks_for_size(size: usize) -> usize {
    debug_assert!(size != 0);
    if size <= BODY_SIZE {
        1
    } else {
        2 + (size - 1 - BODY_SIZE) / BLOCK_SIZE
    }
}

impl<'pool> Heap<'pool> {
    /// Create a heap over `pool`, resetting every cell to the zeroed state.
    ///
    /// Pools longer than [`MAX_BLOCKS`] cells are clamped; the excess cells
    /// are never touched.
    ///
    /// # Panics
    ///
    /// Panics if the pool has fewer than 3 cells (sentinel, one payload
    /// cell, one cell of tail slack), the smallest heap that can satisfy
    /// an allocation.
    pub fn new(pool: &'pool mut [Block]) -> Self {
        assert!(pool.len() >= 3, "pool too small: minimum is 3 cells");
        let nblocks = pool.len().min(MAX_BLOCKS);
        for block in &mut pool[..nblocks] {
            *block = Block::NEW;
        }
        // Safety: a slice pointer is never null.
        let base = unsafe { NonNull::new_unchecked(pool.as_mut_ptr()) };
        Self {
            base,
            nblocks: nblocks as u16,
            _phantom: PhantomData,
        }
    }

    /// Create a heap over `nblocks` cells at `base` without resetting them.
    ///
    /// # Safety
    ///
    /// `base` must be valid for reads and writes of `nblocks` cells for
    /// `'pool`, not aliased by anything else, and the cells must be zeroed
    /// (or left over from a previous `Heap` of the same geometry).
    /// `nblocks` must be at least 3.
    pub unsafe fn from_raw(base: NonNull<Block>, nblocks: usize) -> Self {
        debug_assert!(nblocks >= 3);
        Self {
            base,
            nblocks: nblocks.min(MAX_BLOCKS) as u16,
            _phantom: PhantomData,
        }
    }

    /// Attempt to allocate `size` bytes.
    ///
    /// Returns the starting address of the payload on success; `None` when
    /// `size` is 0 or no free block can hold it. The payload is 4-byte
    /// aligned and spans at least `size` bytes.
    pub fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        if size == 0 {
            log::debug!("allocate 0 bytes, nothing to do");
            return None;
        }

        let blocks = blocks_for_size(size);
        if blocks > MAX_BLOCKS {
            // Not encodable in a 15-bit span, so no pool can hold it.
            return None;
        }
        let blocks = blocks as u16;

        // Scan the free list. Interior blocks are fit candidates; the
        // trailing block (next index 0) is remembered as the end-of-heap
        // fallback and never fit-checked, so heap-end growth only happens
        // when nothing else fits.
        let mut best: Option<(u16, u16)> = None;
        let mut tail = 0;
        let mut cf = self.nfree(0);
        while cf != 0 {
            if self.next_block_no(cf) == 0 {
                tail = cf;
            } else {
                let span = self.span_of(cf);
                log::trace!("looking at block {} span {}", cf, span);

                #[cfg(feature = "first-fit")]
                if span >= blocks {
                    // This is the first block that fits!
                    best = Some((cf, span));
                    break;
                }

                #[cfg(not(feature = "first-fit"))]
                if span >= blocks && best.map_or(true, |(_, bs)| span < bs) {
                    best = Some((cf, span));
                }
            }
            cf = self.nfree(cf);
        }

        let cf = if let Some((cf, span)) = best {
            // An interior free block holds the request. Exact fits are
            // simply unhooked; otherwise the allocation is carved from the
            // high end of the block so the free remainder keeps its list
            // links untouched.
            if span == blocks {
                log::debug!("allocating {} blocks at {} (exact fit)", blocks, cf);
                self.disconnect_from_free_list(cf);
                cf
            } else {
                log::debug!("allocating {} blocks at {} (split)", blocks, cf);
                self.make_new_block(cf, span - blocks, FREELIST_MASK);
                cf + (span - blocks)
            }
        } else {
            // End-of-heap extension.
            if tail == 0 && self.next_block_no(0) != 0 {
                // Initialized heap with no trailing free block: a used
                // block runs to the end of the pool and nothing interior
                // fits either.
                log::debug!("no free block for {} blocks", blocks);
                return None;
            }
            let mut cf = tail;

            // One extra cell is needed for the replacement trailing block.
            if self.nblocks as usize <= cf as usize + blocks as usize + 1 {
                log::debug!("cannot allocate {} blocks at {}", blocks, cf);
                return None;
            }

            if cf == 0 {
                // Very first allocation: materialize the implicit free
                // block at cell 1. The pool arrives zeroed, so only the
                // nonzero fields need writing.
                log::debug!("initializing the free list");
                self.set_nblock(0, 1);
                self.set_nfree(0, 1);
                self.set_nblock(1, FREELIST_MASK);
                cf = 1;
            }

            log::debug!("allocating {} blocks at {} (end of heap)", blocks, cf);

            let lf = cf + blocks;

            // Splice the replacement trailing block into cf's spot on the
            // free list, then copy the cell verbatim so the new trailing
            // block inherits the flag and both list links.
            self.set_nfree(self.pfree(cf), lf);
            self.set_pfree(self.nfree(cf), lf);
            // Safety: both indices are in bounds (`lf < nblocks` was
            //         checked above) and distinct.
            unsafe {
                core::ptr::copy_nonoverlapping(self.cell(cf), self.cell(lf), 1);
            }

            self.set_nblock(cf, lf);
            self.set_pblock(lf, cf);
            cf
        };

        Some(self.data_ptr(cf))
    }

    /// Release an allocation. `None` is accepted and ignored.
    ///
    /// # Safety
    ///
    /// A `Some` pointer must denote a live allocation previously returned
    /// by this heap.
    pub unsafe fn deallocate(&mut self, ptr: Option<NonNull<u8>>) {
        let ptr = match ptr {
            Some(ptr) => ptr,
            None => {
                log::debug!("free a null pointer, nothing to do");
                return;
            }
        };

        let c = self.index_of(ptr);
        log::debug!("freeing block {}", c);
        self.free_block(c);
    }

    /// Resize an allocation, POSIX-style.
    ///
    /// `None` in is `allocate(size)`; `size == 0` frees and returns `None`.
    /// Grows in place when the neighboring free blocks allow it (moving the
    /// payload down when the room comes from the previous block), falls
    /// back to allocate-copy-free otherwise. On allocation failure the
    /// original block is untouched and still owned by the caller.
    ///
    /// # Safety
    ///
    /// A `Some` pointer must denote a live allocation previously returned
    /// by this heap. On success the old pointer is invalidated.
    pub unsafe fn reallocate(
        &mut self,
        ptr: Option<NonNull<u8>>,
        size: usize,
    ) -> Option<NonNull<u8>> {
        let mut ptr = match ptr {
            Some(ptr) => ptr,
            None => {
                log::debug!("realloc a null pointer, same as allocate");
                return self.allocate(size);
            }
        };

        if size == 0 {
            log::debug!("realloc to 0 bytes, same as free");
            self.deallocate(Some(ptr));
            return None;
        }

        let blocks = blocks_for_size(size);
        if blocks > MAX_BLOCKS {
            return None;
        }
        let blocks = blocks as u16;

        let mut c = self.index_of(ptr);
        let cur_span = self.span_of(c);
        let cur_size = cur_span as usize * BLOCK_SIZE - mem::size_of::<Link>();

        if cur_span == blocks {
            log::debug!("realloc to the same {} blocks, nothing to do", blocks);
            return Some(ptr);
        }

        // Absorb a free physical successor up front. It helps a grow, and
        // a shrink hands the enlarged remainder back in one piece.
        self.assimilate_up(c);

        // Growing into a free predecessor is only worthwhile when the
        // merged block holds the request; the payload then moves down into
        // the predecessor's cells.
        let p = self.pblock(c);
        if self.is_free(p) && blocks <= self.merged_span(p, c) {
            log::debug!("realloc assimilating down {} blocks", c - p);
            self.disconnect_from_free_list(p);
            c = self.assimilate_down(c, 0);
            // Safety: source and destination both live in the pool and may
            //         overlap; only the original payload moves.
            core::ptr::copy(ptr.as_ptr(), self.data_ptr(c).as_ptr(), cur_size);
            ptr = self.data_ptr(c);
        }

        let span = self.span_of(c);
        if span == blocks {
            log::debug!("realloc to {} blocks in place", blocks);
        } else if span > blocks {
            // Split the excess off the end and hand it back; freeing it
            // through the common path re-merges it with any free successor.
            log::debug!("realloc shrinking {} blocks to {}", span, blocks);
            self.make_new_block(c, blocks, 0);
            self.free_block(c + blocks);
        } else {
            // Still too small: fresh allocation, copy, release the old one.
            log::debug!("realloc growing {} blocks to {}, copying", span, blocks);
            let new = self.allocate(size)?;
            // Safety: distinct blocks never overlap; `cur_size` bytes fit
            //         in both (the new block holds `size >= cur_size`).
            core::ptr::copy_nonoverlapping(ptr.as_ptr(), new.as_ptr(), cur_size);
            self.free_block(self.index_of(ptr));
            ptr = new;
        }

        Some(ptr)
    }

    /// Walk the physical chain and tally used/free entries and cells.
    ///
    /// When `ptr` names the header of a free block encountered during the
    /// walk, the walk stops there and the pointer is echoed back in
    /// [`HeapInfo::free_match`] with the counts gathered so far, a cheap
    /// probe for "is this already on the free list?". Each block is dumped
    /// through the `log` facade, at info level when `force` is set and at
    /// trace level otherwise.
    pub fn info(&self, ptr: Option<NonNull<u8>>, force: bool) -> HeapInfo {
        let mut info = HeapInfo::default();

        dump!(force, "dumping the heap ({} cells):", self.nblocks);
        dump!(
            force,
            "|0x{:08x}|B {:5}|NB {:5}|PB {:5}|Z {:5}|NF {:5}|PF {:5}|",
            self.cell(0) as usize,
            0,
            self.next_block_no(0),
            self.pblock(0),
            self.next_block_no(0),
            self.nfree(0),
            self.pfree(0)
        );

        let mut c = self.next_block_no(0);
        while self.next_block_no(c) != 0 {
            let span = self.span_of(c);
            info.total_entries += 1;
            info.total_blocks += span;

            if self.is_free(c) {
                info.free_entries += 1;
                info.free_blocks += span;
                dump!(
                    force,
                    "|0x{:08x}|B {:5}|NB {:5}|PB {:5}|Z {:5}|NF {:5}|PF {:5}|",
                    self.cell(c) as usize,
                    c,
                    self.next_block_no(c),
                    self.pblock(c),
                    span,
                    self.nfree(c),
                    self.pfree(c)
                );

                if ptr.map_or(false, |p| p.as_ptr() == self.cell(c) as *mut u8) {
                    info.free_match = ptr;
                    return info;
                }
            } else {
                info.used_entries += 1;
                info.used_blocks += span;
                dump!(
                    force,
                    "|0x{:08x}|B {:5}|NB {:5}|PB {:5}|Z {:5}|",
                    self.cell(c) as usize,
                    c,
                    self.next_block_no(c),
                    self.pblock(c),
                    span
                );
            }

            c = self.next_block_no(c);
        }

        // The terminal block runs to the end of the pool. On a pristine
        // heap the walk never left the sentinel and cells 1.. are free
        // space that no block describes yet.
        if c != 0 {
            let span = self.nblocks - c;
            info.total_entries += 1;
            info.total_blocks += span;
            if self.is_free(c) {
                info.free_entries += 1;
                info.free_blocks += span;
                dump!(
                    force,
                    "|0x{:08x}|B {:5}|NB {:5}|PB {:5}|Z {:5}|NF {:5}|PF {:5}|",
                    self.cell(c) as usize,
                    c,
                    self.next_block_no(c),
                    self.pblock(c),
                    span,
                    self.nfree(c),
                    self.pfree(c)
                );
                if ptr.map_or(false, |p| p.as_ptr() == self.cell(c) as *mut u8) {
                    info.free_match = ptr;
                    return info;
                }
            } else {
                info.used_entries += 1;
                info.used_blocks += span;
                dump!(
                    force,
                    "|0x{:08x}|B {:5}|NB {:5}|PB {:5}|Z {:5}|",
                    self.cell(c) as usize,
                    c,
                    self.next_block_no(c),
                    self.pblock(c),
                    span
                );
            }
        } else {
            info.total_blocks += self.nblocks - 1;
            info.free_blocks += self.nblocks - 1;
        }

        dump!(
            force,
            "total entries {:5}    used entries {:5}    free entries {:5}",
            info.total_entries,
            info.used_entries,
            info.free_entries
        );
        dump!(
            force,
            "total blocks  {:5}    used blocks  {:5}    free blocks  {:5}",
            info.total_blocks,
            info.used_blocks,
            info.free_blocks
        );

        info
    }

    // ---------------------------------------------------------------
    // Structural primitives

    /// The common tail of `deallocate` and the realloc shrink path: merge
    /// block `c` with its free neighbors, or hook it onto the free list.
    fn free_block(&mut self, c: u16) {
        debug_assert!(c != 0 && c < self.nblocks);

        // Merge a free successor into c first; c stays a used block.
        self.assimilate_up(c);

        if self.is_free(self.pblock(c)) {
            // The previous block takes c over, keeping its own spot on the
            // free list.
            log::debug!("assimilating block {} down into {}", c, self.pblock(c));
            self.assimilate_down(c, FREELIST_MASK);
        } else {
            // No free neighbor below: head of the free list. Cheaper than
            // hunting backwards for the previous free block; the fit scan
            // tolerates the resulting address disorder.
            log::debug!("adding block {} to the head of the free list", c);
            self.set_pfree(self.nfree(0), c);
            self.set_nfree(c, self.nfree(0));
            self.set_pfree(c, 0);
            self.set_nfree(0, c);
            self.set_nblock(c, self.nblock(c) | FREELIST_MASK);
        }
    }

    /// Split the logical block at `c` after `blocks` cells. The new block
    /// enters the physical chain with `freemask` applied to `c`'s next
    /// word; wiring it into the free list is the caller's business.
    fn make_new_block(&mut self, c: u16, blocks: u16, freemask: u16) {
        debug_assert!(freemask == 0 || freemask == FREELIST_MASK);
        let s = c + blocks;
        let n = self.next_block_no(c);

        self.set_nblock(s, n);
        self.set_pblock(s, c);
        if n != 0 {
            self.set_pblock(n, s);
        }
        self.set_nblock(c, s | freemask);
    }

    /// Unhook `c` from the free list and clear its free flag. Safe on
    /// blocks whose neighbor links point at the sentinel.
    fn disconnect_from_free_list(&mut self, c: u16) {
        debug_assert!(self.is_free(c));

        self.set_nfree(self.pfree(c), self.nfree(c));
        self.set_pfree(self.nfree(c), self.pfree(c));

        self.set_nblock(c, self.nblock(c) & !FREELIST_MASK);
    }

    /// Merge a free physical successor into `c`, unhooking it from the
    /// free list. `c`'s own state is untouched; only its span grows. A
    /// trailing successor turns `c` into the trailing block.
    fn assimilate_up(&mut self, c: u16) {
        debug_assert!(!self.is_free(c));
        let n = self.nblock(c);
        if self.is_free(n) {
            log::debug!("assimilating block {} up into {}", n, c);
            self.disconnect_from_free_list(n);

            let nn = self.next_block_no(n);
            if nn != 0 {
                self.set_pblock(nn, c);
            }
            self.set_nblock(c, nn);
        }
    }

    /// Merge `c` into its physical predecessor, which the caller has
    /// already pulled off the free list (or is about to reuse). `freemask`
    /// decides whether the merged block stays free. Returns the
    /// predecessor's index.
    fn assimilate_down(&mut self, c: u16, freemask: u16) -> u16 {
        debug_assert!(freemask == 0 || freemask == FREELIST_MASK);
        let p = self.pblock(c);
        let n = self.nblock(c);
        debug_assert!(p != 0, "the sentinel is never merged");

        self.set_nblock(p, n | freemask);
        if n != 0 {
            self.set_pblock(n, p);
        }
        p
    }

    // ---------------------------------------------------------------
    // Link accessors

    #[inline]
    fn cell(&self, c: u16) -> *mut Block {
        debug_assert!(c < self.nblocks);
        // Safety: `c` is in bounds per the assert; the pool is borrowed
        //         for `'pool`.
        unsafe { self.base.as_ptr().add(c as usize) }
    }

    #[inline]
    fn nblock(&self, c: u16) -> u16 {
        unsafe { (*self.cell(c)).header.next }
    }

    #[inline]
    fn set_nblock(&mut self, c: u16, v: u16) {
        unsafe { (*self.cell(c)).header.next = v }
    }

    #[inline]
    fn pblock(&self, c: u16) -> u16 {
        unsafe { (*self.cell(c)).header.prev }
    }

    #[inline]
    fn set_pblock(&mut self, c: u16, v: u16) {
        unsafe { (*self.cell(c)).header.prev = v }
    }

    #[inline]
    fn nfree(&self, c: u16) -> u16 {
        // Safety: the body is only read as links on the sentinel and on
        //         free blocks, where they are the live interpretation.
        unsafe { (*self.cell(c)).body.free.next }
    }

    #[inline]
    fn set_nfree(&mut self, c: u16, v: u16) {
        unsafe { (*self.cell(c)).body.free.next = v }
    }

    #[inline]
    fn pfree(&self, c: u16) -> u16 {
        unsafe { (*self.cell(c)).body.free.prev }
    }

    #[inline]
    fn set_pfree(&mut self, c: u16, v: u16) {
        unsafe { (*self.cell(c)).body.free.prev = v }
    }

    /// `c`'s physical successor index, flag stripped. 0 means `c` is the
    /// last block in the pool.
    #[inline]
    fn next_block_no(&self, c: u16) -> u16 {
        self.nblock(c) & BLOCKNO_MASK
    }

    #[inline]
    fn is_free(&self, c: u16) -> bool {
        self.nblock(c) & FREELIST_MASK != 0
    }

    /// Span of the logical block at `c`, in cells. The trailing block runs
    /// to the end of the pool.
    #[inline]
    fn span_of(&self, c: u16) -> u16 {
        let n = self.next_block_no(c);
        if n == 0 {
            self.nblocks - c
        } else {
            n - c
        }
    }

    /// Cells from `p` through the end of `c`, its physical successor (the
    /// realloc down-merge fit check).
    #[inline]
    fn merged_span(&self, p: u16, c: u16) -> u16 {
        debug_assert_eq!(self.pblock(c), p);
        let n = self.next_block_no(c);
        if n == 0 {
            self.nblocks - p
        } else {
            n - p
        }
    }

    /// Address of the payload of the block at `c`.
    #[inline]
    fn data_ptr(&self, c: u16) -> NonNull<u8> {
        debug_assert!(c != 0, "the sentinel has no payload");
        // Safety: in-bounds cell, and a cell pointer is never null.
        unsafe {
            NonNull::new_unchecked(core::ptr::addr_of_mut!((*self.cell(c)).body) as *mut u8)
        }
    }

    /// Recover a cell index from a payload pointer.
    ///
    /// Trusts the caller in release builds; debug builds verify the
    /// pointer lies inside the pool and on a payload boundary.
    #[inline]
    fn index_of(&self, ptr: NonNull<u8>) -> u16 {
        let base = self.base.as_ptr() as usize;
        let offset = (ptr.as_ptr() as usize).wrapping_sub(base);
        debug_assert!(
            offset < self.nblocks as usize * BLOCK_SIZE
                && offset % BLOCK_SIZE == mem::size_of::<Link>(),
            "pointer does not belong to this heap"
        );
        (offset / BLOCK_SIZE) as u16
    }
}
