//! Mixed-radix integer encodings.
//!
//! Two layouts are used and they are deliberately different:
//!
//! - **CPT rows** ([`row_index`], [`row_digits`]): the *last* digit is the least
//!   significant. For parents `(A, B)` with cardinalities `(2, 3)` the rows are
//!   ordered `(a0,b0) (a0,b1) (a0,b2) (a1,b0) ...`. This is the on-disk table
//!   layout and must match whatever authored the CPT.
//! - **Joint configurations** ([`MixedRadix`]): the *first* digit is the least
//!   significant, so appending a variable never moves existing entries. A prefix
//!   of `k` digits indexes the table built from the first `k` variables.

use serde::{Deserialize, Serialize};

/// Product of radices, or `None` on overflow.
///
/// An empty product is 1 (a variable with no parents has exactly one row).
pub fn checked_product<I>(radices: I) -> Option<usize>
where
    I: IntoIterator<Item = usize>,
{
    radices
        .into_iter()
        .try_fold(1usize, |acc, r| acc.checked_mul(r))
}

/// Encode `digits` as a row index, least-significant digit last.
///
/// Returns `None` when the slices differ in length, a digit is out of range
/// for its radix, or the index overflows.
pub fn row_index(digits: &[usize], radices: &[usize]) -> Option<usize> {
    if digits.len() != radices.len() {
        return None;
    }
    let outcome: Result<Option<usize>, std::convert::Infallible> =
        try_row_index(digits.len(), |pos| Ok((digits[pos], radices[pos])));
    match outcome {
        Ok(index) => index,
        Err(never) => match never {},
    }
}

/// Streaming form of [`row_index`] that never allocates.
///
/// `digit_at(pos)` supplies `(digit, radix)` for each position; it is called
/// from the last position to the first. Errors from `digit_at` are passed
/// through; `Ok(None)` means a digit was out of range or the index overflowed.
pub fn try_row_index<E, F>(len: usize, mut digit_at: F) -> Result<Option<usize>, E>
where
    F: FnMut(usize) -> Result<(usize, usize), E>,
{
    let mut index = 0usize;
    let mut multiplier = 1usize;
    for pos in (0..len).rev() {
        let (digit, radix) = digit_at(pos)?;
        if digit >= radix {
            return Ok(None);
        }
        let step = match digit.checked_mul(multiplier) {
            Some(step) => step,
            None => return Ok(None),
        };
        index = match index.checked_add(step) {
            Some(index) => index,
            None => return Ok(None),
        };
        multiplier = match multiplier.checked_mul(radix) {
            Some(m) => m,
            None if pos == 0 => multiplier,
            None => return Ok(None),
        };
    }
    Ok(Some(index))
}

/// Decode a row index back into digits, least-significant digit last.
pub fn row_digits(index: usize, radices: &[usize]) -> Option<Vec<usize>> {
    let size = checked_product(radices.iter().copied())?;
    if index >= size {
        return None;
    }
    let mut digits = vec![0usize; radices.len()];
    let mut rest = index;
    for (slot, &radix) in digits.iter_mut().zip(radices).rev() {
        *slot = rest % radix;
        rest /= radix;
    }
    Some(digits)
}

/// Least-significant-first mixed-radix layout over a fixed list of radices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedRadix {
    radices: Vec<usize>,
    strides: Vec<usize>,
    size: usize,
}

impl MixedRadix {
    /// Build the layout. Fails on a zero radix or when the total size overflows.
    pub fn new(radices: Vec<usize>) -> Option<Self> {
        if radices.iter().any(|&r| r == 0) {
            return None;
        }
        let mut strides = Vec::with_capacity(radices.len());
        let mut stride = 1usize;
        for &radix in &radices {
            strides.push(stride);
            stride = stride.checked_mul(radix)?;
        }
        Some(Self {
            radices,
            strides,
            size: stride,
        })
    }

    /// Number of positions (digits).
    pub fn len(&self) -> usize {
        self.radices.len()
    }

    /// True when there are no positions.
    pub fn is_empty(&self) -> bool {
        self.radices.is_empty()
    }

    /// Total number of encodable values.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Radix of position `pos`.
    pub fn radix(&self, pos: usize) -> usize {
        self.radices[pos]
    }

    /// Stride of position `pos` (product of all lower radices).
    pub fn stride(&self, pos: usize) -> usize {
        self.strides[pos]
    }

    /// Digit at `pos` of `index`.
    pub fn digit(&self, index: usize, pos: usize) -> usize {
        (index / self.strides[pos]) % self.radices[pos]
    }

    /// Decode the lowest `len` digits of `index` into `out` (cleared first).
    pub fn decode_prefix(&self, index: usize, len: usize, out: &mut Vec<usize>) {
        out.clear();
        let mut rest = index;
        for &radix in &self.radices[..len] {
            out.push(rest % radix);
            rest /= radix;
        }
    }

    /// Encode digits (least significant first). `None` if a digit is out of range.
    pub fn encode(&self, digits: &[usize]) -> Option<usize> {
        if digits.len() > self.radices.len() {
            return None;
        }
        let mut index = 0usize;
        for (pos, &digit) in digits.iter().enumerate() {
            if digit >= self.radices[pos] {
                return None;
            }
            index += digit * self.strides[pos];
        }
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_product_empty_is_one() {
        assert_eq!(checked_product(std::iter::empty()), Some(1));
        assert_eq!(checked_product([2, 3, 4]), Some(24));
        assert_eq!(checked_product([usize::MAX, 2]), None);
    }

    #[test]
    fn row_index_last_digit_is_least_significant() {
        // (a, b) with |a| = 2, |b| = 3
        let radices = [2, 3];
        assert_eq!(row_index(&[0, 0], &radices), Some(0));
        assert_eq!(row_index(&[0, 1], &radices), Some(1));
        assert_eq!(row_index(&[0, 2], &radices), Some(2));
        assert_eq!(row_index(&[1, 0], &radices), Some(3));
        assert_eq!(row_index(&[1, 2], &radices), Some(5));
    }

    #[test]
    fn row_index_matches_three_binary_parents() {
        // (true, false, true) with true = 0, false = 1 -> 0b010 = 2
        assert_eq!(row_index(&[0, 1, 0], &[2, 2, 2]), Some(2));
        assert_eq!(row_index(&[1, 1, 1], &[2, 2, 2]), Some(7));
    }

    #[test]
    fn row_index_rejects_bad_input() {
        assert_eq!(row_index(&[2], &[2]), None);
        assert_eq!(row_index(&[0, 0], &[2]), None);
        assert_eq!(row_index(&[], &[]), Some(0));
    }

    #[test]
    fn try_row_index_passes_errors_through() {
        let out: Result<Option<usize>, &str> =
            try_row_index(2, |pos| if pos == 1 { Err("missing") } else { Ok((0, 2)) });
        assert_eq!(out, Err("missing"));
    }

    #[test]
    fn row_digits_inverts_row_index() {
        let radices = [3, 2, 4];
        for i in 0..24 {
            let digits = row_digits(i, &radices).unwrap();
            assert_eq!(row_index(&digits, &radices), Some(i));
        }
        assert_eq!(row_digits(24, &radices), None);
    }

    #[test]
    fn mixed_radix_first_digit_is_least_significant() {
        let layout = MixedRadix::new(vec![2, 3]).unwrap();
        assert_eq!(layout.size(), 6);
        assert_eq!(layout.stride(0), 1);
        assert_eq!(layout.stride(1), 2);
        assert_eq!(layout.encode(&[1, 2]), Some(5));
        assert_eq!(layout.digit(5, 0), 1);
        assert_eq!(layout.digit(5, 1), 2);
    }

    #[test]
    fn mixed_radix_prefix_is_stable() {
        let layout = MixedRadix::new(vec![2, 3, 2]).unwrap();
        let idx = layout.encode(&[1, 2]).unwrap();
        let mut buf = Vec::new();
        layout.decode_prefix(idx, 2, &mut buf);
        assert_eq!(buf, vec![1, 2]);
        layout.decode_prefix(idx + layout.stride(2), 3, &mut buf);
        assert_eq!(buf, vec![1, 2, 1]);
    }

    #[test]
    fn mixed_radix_rejects_zero_radix_and_overflow() {
        assert!(MixedRadix::new(vec![2, 0]).is_none());
        assert!(MixedRadix::new(vec![usize::MAX, 2]).is_none());
        assert!(MixedRadix::new(vec![]).unwrap().is_empty());
    }
}
