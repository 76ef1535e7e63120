//! This crate implements an index-linked free-list dynamic memory
//! allocator for small embedded systems (8-, 16- and 32-bit
//! microcontrollers).
//!
//!  - **Insertion and removal on both bookkeeping lists are constant
//!    time.** The heap is a flat array of 8-byte cells threaded by *two*
//!    doubly linked lists (physical order and the free list), so splitting,
//!    coalescing and unhooking a block never walk anything.
//!
//!  - **Bookkeeping is 16-bit, not pointer-wide.** Links are 15-bit cell
//!    indices with an in-band free flag. A free block costs 8 bytes of
//!    overhead, a live one only 4, and the whole heap tops out at 32767
//!    cells (~256 KiB), plenty for the targets this is meant for.
//!
//!  - **Fragmentation-resistant.** Freed blocks are eagerly merged with
//!    both physical neighbors, so the free list stays short and free
//!    regions stay as large as possible. The default fit policy is
//!    best-fit; enable the `first-fit` cargo feature to trade placement
//!    quality for scan time.
//!
//!  - **The memory pool is provided by the application.** Typically a
//!    zeroed `static` array; the allocator asks the environment for
//!    nothing.
//!
//!  - **This crate supports `#![no_std]`.** It can be used in bare-metal
//!    and RTOS-based applications.
//!
//! # Examples
//!
//! ## `Heap`: Core API
//!
//! ```rust
//! use idxalloc::{Block, Heap};
//!
//! let mut pool = [Block::NEW; 512];       // 4 KiB heap
//! let mut heap = Heap::new(&mut pool);
//!
//! unsafe {
//!     let a = heap.allocate(16).unwrap();
//!     let b = heap.allocate(100).unwrap();
//!     a.as_ptr().write_bytes(0xAA, 16);
//!     let b = heap.reallocate(Some(b), 200).unwrap();
//!     heap.deallocate(Some(a));
//!     heap.deallocate(Some(b));
//! }
//! ```
//!
//! ## `SpinLockedHeap`: Global Allocator
//!
//! With the `spin` feature (on by default), a pool-owning wrapper serializes
//! every operation behind a spinlock and implements
//! [`core::alloc::GlobalAlloc`]:
//!
//! ```rust
//! static HEAP: idxalloc::SpinLockedHeap<512> = idxalloc::SpinLockedHeap::new();
//! # let layout = core::alloc::Layout::from_size_align(24, 4).unwrap();
//! # unsafe {
//! #     use core::alloc::GlobalAlloc;
//! #     let p = HEAP.alloc(layout);
//! #     assert!(!p.is_null());
//! #     HEAP.dealloc(p, layout);
//! # }
//! ```
//!
//! Payloads are 4-byte aligned; the wrapper refuses layouts asking for
//! more. On a 32-bit target that covers every fundamental type, which is
//! the drop-in contract the allocator was built around.
//!
//! # Details
//!
//! ## Diagnostics
//!
//! [`Heap::info`] walks the heap and tallies used and free entries and
//! cells, optionally probing a pointer for free-list membership. The walk
//! (and the allocator's internal commentary) is reported through the
//! [`log`] facade at `debug`/`trace` level, or `info` level for a forced
//! dump; wire up any logger to see it.
#![no_std]

mod heap;
pub use self::heap::{Block, Heap, HeapInfo, BLOCK_SIZE, BODY_SIZE, MAX_BLOCKS};

#[cfg(feature = "spin")]
mod global;
#[cfg(feature = "spin")]
pub use self::global::SpinLockedHeap;

#[cfg(any(test, feature = "std"))]
extern crate std;
