//! Bump arenas for long-lived assets and per-frame scratch data.
//!
//! An [`Arena`] owns one preallocated block. Allocations bump a cursor and
//! hand back an [`ArenaSlice`] handle; the bytes are reached through the
//! arena, so a borrow of the data can never outlive it. [`Arena::reset`]
//! rewinds the cursor without freeing and advances the arena's epoch, after
//! which every older handle is rejected with [`Error::StaleAllocation`].

use std::marker::PhantomData;
use std::mem::{align_of, size_of};

use bytemuck::Pod;

use crate::error::{Error, Result};

/// Alignment of the backing block. Types with a stricter alignment cannot be
/// placed in an arena.
const BLOCK_ALIGN: usize = align_of::<u64>();

/// Handle to `len` values of `T` inside an [`Arena`].
#[derive(Debug)]
pub struct ArenaSlice<T> {
    offset: usize,
    len: usize,
    epoch: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ArenaSlice<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArenaSlice<T> {}

impl<T> ArenaSlice<T> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug)]
pub struct Arena {
    name: &'static str,
    block: Vec<u64>,
    cursor: usize,
    epoch: u32,
}

impl Arena {
    /// Preallocates `capacity` bytes, rounded up to whole 8-byte words.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let words = capacity.div_ceil(BLOCK_ALIGN);
        log::debug!("arena {name}: reserved {} bytes", words * BLOCK_ALIGN);
        Self {
            name,
            block: vec![0; words],
            cursor: 0,
            epoch: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.block.len() * BLOCK_ALIGN
    }

    /// Bytes handed out since the last reset, alignment padding included.
    pub fn used(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.cursor
    }

    /// Number of resets so far.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Reserves `len` values of `T`, each initialized to `fill`.
    pub fn alloc<T: Pod>(&mut self, len: usize, fill: T) -> Result<ArenaSlice<T>> {
        let handle = self.reserve::<T>(len)?;
        self.slice_mut(handle)?.fill(fill);
        Ok(handle)
    }

    /// Reserves room for `values` and copies them in.
    pub fn alloc_slice<T: Pod>(&mut self, values: &[T]) -> Result<ArenaSlice<T>> {
        let handle = self.reserve::<T>(values.len())?;
        self.slice_mut(handle)?.copy_from_slice(values);
        Ok(handle)
    }

    fn reserve<T: Pod>(&mut self, len: usize) -> Result<ArenaSlice<T>> {
        let align = align_of::<T>();
        if align > BLOCK_ALIGN {
            return Err(Error::UnsupportedAlignment { align });
        }

        let start = self.cursor.next_multiple_of(align);
        let requested = len.saturating_mul(size_of::<T>());
        let end = start.saturating_add(requested);
        if end > self.capacity() {
            return Err(Error::ArenaExhausted {
                requested,
                available: self.remaining(),
            });
        }

        self.cursor = end;
        Ok(ArenaSlice {
            offset: start,
            len,
            epoch: self.epoch,
            _marker: PhantomData,
        })
    }

    /// Rewinds the cursor. Memory is kept; earlier handles become stale.
    pub fn reset(&mut self) {
        log::trace!("arena {}: reset after {} bytes", self.name, self.cursor);
        self.cursor = 0;
        self.epoch = self.epoch.wrapping_add(1);
    }

    pub fn slice<T: Pod>(&self, handle: ArenaSlice<T>) -> Result<&[T]> {
        let range = self.byte_range(&handle)?;
        let bytes: &[u8] = bytemuck::cast_slice(&self.block);
        bytemuck::try_cast_slice(&bytes[range]).map_err(|_| Error::UnsupportedAlignment {
            align: align_of::<T>(),
        })
    }

    pub fn slice_mut<T: Pod>(&mut self, handle: ArenaSlice<T>) -> Result<&mut [T]> {
        let range = self.byte_range(&handle)?;
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut self.block);
        bytemuck::try_cast_slice_mut(&mut bytes[range]).map_err(|_| {
            Error::UnsupportedAlignment {
                align: align_of::<T>(),
            }
        })
    }

    fn byte_range<T>(&self, handle: &ArenaSlice<T>) -> Result<std::ops::Range<usize>> {
        if handle.epoch != self.epoch {
            return Err(Error::StaleAllocation);
        }
        Ok(handle.offset..handle.offset + handle.len * size_of::<T>())
    }
}

/// The two arenas of a session: assets that live until exit, and scratch
/// data rebuilt every frame.
#[derive(Debug)]
pub struct Memory {
    pub permanent: Arena,
    pub frame: Arena,
}

impl Memory {
    pub fn new(permanent_bytes: usize, frame_bytes: usize) -> Self {
        Self {
            permanent: Arena::new("permanent", permanent_bytes),
            frame: Arena::new("frame", frame_bytes),
        }
    }

    /// Discards everything allocated from the frame arena.
    pub fn reset_frame(&mut self) {
        self.frame.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_aligned_and_filled() {
        let mut arena = Arena::new("test", 64);
        let bytes = arena.alloc::<u8>(3, 7).unwrap();
        let floats = arena.alloc::<f32>(4, 1.5).unwrap();
        assert_eq!(arena.slice(bytes).unwrap(), &[7, 7, 7]);
        assert_eq!(arena.slice(floats).unwrap(), &[1.5; 4]);
        assert_eq!(arena.used(), 4 + 16);
    }

    #[test]
    fn overflowing_capacity_is_an_error() {
        let mut arena = Arena::new("test", 16);
        arena.alloc::<u32>(3, 0).unwrap();
        let err = arena.alloc::<u32>(2, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::ArenaExhausted {
                requested: 8,
                available: 4
            }
        ));
    }

    #[test]
    fn reset_rewinds_and_invalidates_handles() {
        let mut arena = Arena::new("test", 32);
        let old = arena.alloc::<u32>(8, 1).unwrap();
        assert_eq!(arena.remaining(), 0);

        arena.reset();
        assert_eq!(arena.used(), 0);
        assert!(matches!(arena.slice(old), Err(Error::StaleAllocation)));

        let new = arena.alloc::<u32>(8, 2).unwrap();
        assert_eq!(arena.slice(new).unwrap(), &[2; 8]);
    }

    #[test]
    fn memory_resets_only_the_frame_arena() {
        let mut memory = Memory::new(64, 64);
        let kept = memory.permanent.alloc_slice(&[1u32, 2, 3]).unwrap();
        let scratch = memory.frame.alloc::<f32>(4, 0.0).unwrap();

        memory.reset_frame();

        assert_eq!(memory.permanent.slice(kept).unwrap(), &[1, 2, 3]);
        assert!(memory.frame.slice(scratch).is_err());
    }
}
