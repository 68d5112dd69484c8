use std::alloc::Layout;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

use super::{AllocError, AllocPolicy, CapacityOverflowError};

/// A runtime-sized array whose memory is obtained and released through an [`AllocPolicy`]. Similar
/// to a [`Box<[T]>`](Box<T>), except that every allocation is fallible according to the policy.
///
/// This is the single owner of raw memory in the crate. Buffers, token arrays and pools are all
/// built on top of it, so that the strict/reporting decision is made in exactly one place.
///
/// # Time Complexity
/// | Method | Complexity |
/// |-|-|
/// | `size` | `O(1)` |
/// | `new_uninit` | `O(1)` |
/// | `realloc` | `O(n)`*, `O(1)` |
/// | `from_fn` | `O(n)` |
///
/// \* Depends on whether the allocator can resize in place.
pub struct RawArray<T> {
    pub(crate) ptr: NonNull<T>,
    pub(crate) size: usize,
    pub(crate) policy: AllocPolicy,
    pub(crate) _phantom: PhantomData<T>,
}

impl<T> RawArray<T> {
    /// Returns the number of elements in the Array.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the policy which owns the Array's memory.
    pub const fn policy(&self) -> AllocPolicy {
        self.policy
    }

    /// Creates a new Array with size 0. Nothing is allocated.
    pub const fn new(policy: AllocPolicy) -> RawArray<T> {
        RawArray {
            ptr: NonNull::dangling(),
            size: 0,
            policy,
            _phantom: PhantomData,
        }
    }

    /// Creates a new Array of [`MaybeUninit<T>`] with the provided `size`. All values are
    /// uninitialized.
    ///
    /// # Errors
    /// Fails if the layout would exceed [`isize::MAX`] bytes or the allocation is exhausted, and the
    /// policy is reporting.
    pub fn new_uninit(size: usize, policy: AllocPolicy) -> Result<RawArray<MaybeUninit<T>>, AllocError> {
        let layout = RawArray::<MaybeUninit<T>>::make_layout(size, policy)?;

        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            policy.alloc(layout)?.cast()
        };

        Ok(RawArray {
            ptr,
            size,
            policy,
            _phantom: PhantomData,
        })
    }

    /// Creates a new Array of `size` elements, initializing each with the result of `f` applied to
    /// its index.
    ///
    /// # Errors
    /// See [`RawArray::new_uninit`].
    pub fn from_fn<F>(size: usize, policy: AllocPolicy, mut f: F) -> Result<RawArray<T>, AllocError>
    where
        F: FnMut(usize) -> T,
    {
        let mut arr = RawArray::<T>::new_uninit(size, policy)?;

        for (index, slot) in arr.iter_mut().enumerate() {
            slot.write(f(index));
        }

        // SAFETY: Every element has just been written.
        Ok(unsafe { arr.assume_init() })
    }

    /// Decomposes an Array into its raw components without releasing anything.
    pub const fn into_parts(self) -> (NonNull<T>, usize, AllocPolicy) {
        let ret = (self.ptr, self.size, self.policy);
        mem::forget(self);
        ret
    }

    /// Creates an Array from its raw components.
    ///
    /// # Safety
    /// `ptr` must have been allocated by `policy` for exactly `size` values of `T` (or be dangling
    /// for a zero-sized layout), and all of them must be initialized.
    pub const unsafe fn from_parts(ptr: NonNull<T>, size: usize, policy: AllocPolicy) -> RawArray<T> {
        RawArray {
            ptr,
            size,
            policy,
            _phantom: PhantomData,
        }
    }

    /// Interprets self as an `RawArray<MaybeUninit<T>>`, which allows it to be reallocated.
    /// Elements are not dropped by the returned Array.
    pub const fn forget_init(self) -> RawArray<MaybeUninit<T>> {
        let (ptr, size, policy) = self.into_parts();
        // SAFETY: MaybeUninit<T> has the same layout as T, and no initialization is required.
        unsafe { RawArray::from_parts(ptr.cast(), size, policy) }
    }

    /// Creates a [`Layout`] for `size` elements of `T`.
    ///
    /// # Errors
    /// Fails if the layout size would exceed [`isize::MAX`] and the policy is reporting.
    pub(crate) fn make_layout(size: usize, policy: AllocPolicy) -> Result<Layout, CapacityOverflowError> {
        match Layout::array::<T>(size) {
            Ok(layout) => Ok(layout),
            Err(_) => policy.surface(CapacityOverflowError),
        }
    }
}

impl<T: Copy> RawArray<T> {
    /// Creates a new Array with `count` copies of `item`.
    ///
    /// # Errors
    /// See [`RawArray::new_uninit`].
    pub fn repeat_item(item: T, count: usize, policy: AllocPolicy) -> Result<RawArray<T>, AllocError> {
        RawArray::from_fn(count, policy, |_| item)
    }

    /// Creates a new Array holding a copy of `src`.
    ///
    /// # Errors
    /// See [`RawArray::new_uninit`].
    pub fn copy_from(src: &[T], policy: AllocPolicy) -> Result<RawArray<T>, AllocError> {
        let arr = RawArray::<T>::new_uninit(src.len(), policy)?;

        // SAFETY: arr was allocated for exactly src.len() values and can't overlap with src.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), arr.ptr.as_ptr().cast(), src.len());
            Ok(arr.assume_init())
        }
    }
}

impl<T> RawArray<MaybeUninit<T>> {
    /// Assume that all values of an `RawArray<MaybeUninit<T>>` are initialized.
    ///
    /// # Safety
    /// It is up to the caller to guarantee that every element is initialized.
    pub const unsafe fn assume_init(self) -> RawArray<T> {
        let (ptr, size, policy) = self.into_parts();
        // SAFETY: Same layout, initialization is guaranteed by the caller.
        unsafe { RawArray::from_parts(ptr.cast(), size, policy) }
    }

    /// Reallocate the Array to have size equal to `new_size`, with new locations uninitialized.
    /// Shrinking doesn't drop anything, any initialized values past `new_size` are forgotten.
    ///
    /// # Errors
    /// Fails if the new layout would exceed [`isize::MAX`] bytes or the allocation is exhausted, and
    /// the policy is reporting. In that case self is left untouched.
    pub fn realloc(&mut self, new_size: usize) -> Result<(), AllocError> {
        let new_layout = Self::make_layout(new_size, self.policy)?;

        let new_ptr = match (self.size, new_size) {
            (_, _) if size_of::<T>() == 0 => {
                // Nothing is ever allocated for zero-sized types, only the size changes.
                self.ptr
            },
            (old, new) if old == new => return Ok(()),
            (0, _) => self.policy.alloc(new_layout)?.cast(),
            (_, 0) => {
                // SAFETY: The current layout was valid when it was allocated by this policy.
                unsafe { self.policy.dealloc(self.ptr.cast(), self.current_layout()) };
                NonNull::dangling()
            },
            (_, _) => {
                // SAFETY: The same allocator and layout are used as for the existing allocation,
                // and the new layout has a non-zero size which is <= isize::MAX.
                unsafe {
                    self.policy.realloc(self.ptr.cast(), self.current_layout(), new_layout.size())?
                }.cast()
            },
        };

        self.ptr = new_ptr;
        self.size = new_size;
        Ok(())
    }
}

impl<T> RawArray<T> {
    fn current_layout(&self) -> Layout {
        // SAFETY: The same layout was validated when the current allocation was made.
        unsafe { Layout::array::<T>(self.size).unwrap_unchecked() }
    }
}

impl<T> Drop for RawArray<T> {
    fn drop(&mut self) {
        // SAFETY: All elements are initialized, properly aligned and only dropped here.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.size)) };

        if self.size != 0 && size_of::<T>() != 0 {
            // SAFETY: The allocation was made by this policy with the current layout.
            unsafe { self.policy.dealloc(self.ptr.cast(), self.current_layout()) };
        }
    }
}

impl<T> Deref for RawArray<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        // SAFETY: The pointer is nonnull, aligned and valid for size initialized values.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.size) }
    }
}

impl<T> DerefMut for RawArray<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: As for deref, and the borrow checker guarantees unique access through &mut self.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size) }
    }
}

// SAFETY: RawArray uniquely owns its memory, so it is Send when T is.
unsafe impl<T: Send> Send for RawArray<T> {}
// SAFETY: RawArray has no interior mutability.
unsafe impl<T: Sync> Sync for RawArray<T> {}

impl<T: Debug> Debug for RawArray<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
