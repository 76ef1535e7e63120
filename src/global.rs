//! A pool-owning, lock-wrapped heap usable as the global allocator.
use core::{
    alloc::{GlobalAlloc, Layout},
    cell::UnsafeCell,
    ptr::{self, NonNull},
};

use crate::heap::{Block, Heap, HeapInfo};

/// Alignment of every payload the engine hands out: the cell body starts
/// 4 bytes into a 4-byte-aligned cell.
const PAYLOAD_ALIGN: usize = 4;

/// [`Heap`] plus its pool and a spinlock, in one `static`-friendly value.
///
/// `NBLOCKS` is the pool size in 8-byte cells, so `SpinLockedHeap<512>` is
/// a 4 KiB heap. Every operation takes the lock for its full duration,
/// which is the critical section the engine requires; on a bare-metal
/// single-core target, masking interrupts around use of the allocator is
/// still the host's responsibility.
///
/// ```no_run
/// #[global_allocator]
/// static HEAP: idxalloc::SpinLockedHeap<4096> = idxalloc::SpinLockedHeap::new();
///
/// fn main() {
///     let mut v = vec![1, 2, 3];
///     v.push(4);
/// }
/// ```
///
/// Payloads are 4-byte aligned. Layouts requesting a larger alignment are
/// refused with a null pointer rather than handed out misaligned.
pub struct SpinLockedHeap<const NBLOCKS: usize> {
    pool: UnsafeCell<[Block; NBLOCKS]>,
    lock: spin::Mutex<()>,
}

// Safety: the pool is only touched through `with_heap`, which holds the
//         lock for the duration of the access.
unsafe impl<const NBLOCKS: usize> Sync for SpinLockedHeap<NBLOCKS> {}

impl<const NBLOCKS: usize> SpinLockedHeap<NBLOCKS> {
    /// Create a heap with a zeroed pool. Usable in `static` initializers.
    ///
    /// # Panics
    ///
    /// Fails to evaluate when `NBLOCKS` is less than 3, the smallest pool
    /// that can satisfy an allocation.
    pub const fn new() -> Self {
        assert!(NBLOCKS >= 3, "pool too small: minimum is 3 cells");
        Self {
            pool: UnsafeCell::new([Block::NEW; NBLOCKS]),
            lock: spin::Mutex::new(()),
        }
    }

    /// Run `f` on the heap with the lock held.
    fn with_heap<R>(&self, f: impl FnOnce(&mut Heap<'_>) -> R) -> R {
        let _guard = self.lock.lock();
        // Safety: the pool lives as long as `self`, is aligned and zeroed
        //         by construction, and the lock guarantees exclusivity.
        let mut heap =
            unsafe { Heap::from_raw(NonNull::new_unchecked(self.pool.get().cast()), NBLOCKS) };
        f(&mut heap)
    }

    /// Walk the heap under the lock. See [`Heap::info`].
    pub fn info(&self, ptr: Option<NonNull<u8>>, force: bool) -> HeapInfo {
        self.with_heap(|heap| heap.info(ptr, force))
    }
}

impl<const NBLOCKS: usize> Default for SpinLockedHeap<NBLOCKS> {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl<const NBLOCKS: usize> GlobalAlloc for SpinLockedHeap<NBLOCKS> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() > PAYLOAD_ALIGN {
            return ptr::null_mut();
        }
        self.with_heap(|heap| heap.allocate(layout.size()))
            .map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        // Safety: `ptr` came from this allocator, as `GlobalAlloc` requires.
        self.with_heap(|heap| unsafe { heap.deallocate(NonNull::new(ptr)) })
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if layout.align() > PAYLOAD_ALIGN {
            return ptr::null_mut();
        }
        // Safety: `ptr` came from this allocator, as `GlobalAlloc` requires.
        self.with_heap(|heap| unsafe { heap.reallocate(NonNull::new(ptr), new_size) })
            .map_or(ptr::null_mut(), NonNull::as_ptr)
    }
}
