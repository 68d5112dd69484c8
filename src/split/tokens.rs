use std::fmt::{self, Debug, Formatter};
use std::mem::{self, MaybeUninit};
use std::ops::Deref;

use crate::alloc::{AllocError, AllocPolicy, RawArray};
use crate::buffer::{GrowableBuffer, OwnedBytes};

/// The error produced by splitting, which can only fail to allocate.
pub type SplitError = AllocError;

/// Returns the non-empty runs of `input` between occurrences of `sep`, in order.
fn runs(input: &[u8], sep: u8) -> impl Iterator<Item = &[u8]> {
    input.split(move |b| *b == sep).filter(|run| !run.is_empty())
}

/// Returns the number of tokens `input` splits into. Leading, trailing and consecutive separators
/// never produce a token.
pub fn count_tokens(input: &[u8], sep: u8) -> usize {
    runs(input, sep).count()
}

/// An owned sequence of tokens, each copied into its own terminated buffer.
pub struct Tokens {
    items: RawArray<OwnedBytes>,
}

impl Tokens {
    /// Joins the tokens back together with `sep` between each pair.
    ///
    /// This doesn't restore the original input: leading, trailing and repeated separators were
    /// dropped by splitting and don't come back.
    ///
    /// ```
    /// # use utility_lib::alloc::AllocPolicy;
    /// # use utility_lib::split::split;
    /// let policy = AllocPolicy::reporting();
    /// let tokens = split(b",a,,b,", b',', policy).unwrap().unwrap();
    /// assert_eq!(tokens.join(b',', policy).unwrap(), "a,b");
    /// ```
    ///
    /// # Errors
    /// Fails if the allocation is exhausted and the policy is reporting.
    pub fn join(&self, sep: u8, policy: AllocPolicy) -> Result<OwnedBytes, AllocError> {
        let mut buf = GrowableBuffer::new(policy)?;
        for (index, token) in self.iter().enumerate() {
            if index != 0 {
                buf.push(sep)?;
            }
            buf.extend_from_slice(token)?;
        }
        buf.finalize(true)
    }
}

impl Deref for Tokens {
    type Target = [OwnedBytes];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl Debug for Tokens {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A sequence of tokens borrowed from the input they were split from in place.
pub struct TokenSlices<'a> {
    items: RawArray<&'a [u8]>,
}

impl<'a> Deref for TokenSlices<'a> {
    type Target = [&'a [u8]];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl Debug for TokenSlices<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|token| token.escape_ascii().to_string()))
            .finish()
    }
}

/// Splits `input` on every occurrence of `sep`, copying each token into its own terminated buffer.
///
/// Leading separators are skipped and consecutive separators never produce an empty token, so
/// [`None`] is returned when `input` is empty or consists only of separators.
///
/// ```
/// # use utility_lib::alloc::AllocPolicy;
/// # use utility_lib::split::split;
/// let tokens = split(b"a,,b", b',', AllocPolicy::reporting()).unwrap().unwrap();
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[0], "a");
/// assert_eq!(tokens[1], "b");
/// ```
///
/// # Errors
/// Fails if an allocation is exhausted and the policy is reporting. Every token copied so far is
/// released first.
pub fn split(input: &[u8], sep: u8, policy: AllocPolicy) -> Result<Option<Tokens>, SplitError> {
    let count = count_tokens(input, sep);
    if count == 0 {
        return Ok(None);
    }

    let mut arr = RawArray::<OwnedBytes>::new_uninit(count, policy)?;
    for (filled, token) in runs(input, sep).enumerate() {
        match OwnedBytes::duplicate(token, policy) {
            Ok(dup) => {
                arr[filled].write(dup);
            },
            Err(e) => {
                log::debug!("releasing {} of {} tokens after a failed copy", filled, count);
                release(&mut arr[..filled]);
                return Err(e);
            },
        }
    }

    Ok(Some(Tokens {
        // SAFETY: Exactly count tokens were yielded by runs, and each one has been written.
        items: unsafe { arr.assume_init() },
    }))
}

/// Drops every (initialized) token in `filled`.
fn release(filled: &mut [MaybeUninit<OwnedBytes>]) {
    for slot in filled {
        // SAFETY: The caller only passes the prefix of the array which has been written.
        unsafe { slot.assume_init_drop() };
    }
}

/// Splits `input` on every occurrence of `sep` without copying, as [`split`] does.
///
/// Each separator which directly follows a token is overwritten with a NUL byte, so that every
/// token is terminated within `input`. Leading and repeated separators are left as they are.
///
/// ```
/// # use utility_lib::alloc::AllocPolicy;
/// # use utility_lib::split::split_in_place;
/// let mut input = *b",a,,b";
/// let tokens = split_in_place(&mut input, b',', AllocPolicy::reporting()).unwrap().unwrap();
/// assert_eq!(&*tokens, [&b"a"[..], &b"b"[..]]);
/// drop(tokens);
/// assert_eq!(&input, b",a\0,b");
/// ```
///
/// # Errors
/// Fails if the token array can't be allocated and the policy is reporting. `input` is untouched
/// in that case.
pub fn split_in_place(input: &mut [u8], sep: u8, policy: AllocPolicy) -> Result<Option<TokenSlices<'_>>, SplitError> {
    let count = count_tokens(input, sep);
    if count == 0 {
        return Ok(None);
    }

    let mut arr = RawArray::<&[u8]>::new_uninit(count, policy)?;
    let mut rest = input;
    let mut filled = 0;

    while let Some(start) = rest.iter().position(|b| *b != sep) {
        let (_, tail) = mem::take(&mut rest).split_at_mut(start);
        let end = tail.iter().position(|b| *b == sep).unwrap_or(tail.len());
        let (token, tail) = tail.split_at_mut(end);

        if let Some((terminator, after)) = tail.split_first_mut() {
            *terminator = 0;
            rest = after;
        }

        arr[filled].write(token);
        filled += 1;
    }
    debug_assert_eq!(filled, count, "in-place split found a different number of tokens");

    Ok(Some(TokenSlices {
        // SAFETY: The walk visits the same runs that were counted, writing each one.
        items: unsafe { arr.assume_init() },
    }))
}
