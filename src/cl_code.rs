//! Run-length encoding of a block-type-2 code-length sequence into the
//! 19-symbol code-length alphabet (§4.7), and the Huffman code built over
//! that alphabet so the code-length sequence itself can be transmitted.

use crate::huffman;
use crate::tables::{CL_PERMUTATION, NUM_CL_SYMBOLS};

const MAX_CL_CODE_LEN: u32 = 7;

/// One run-length-encoded entry of a code-length sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClEntry {
    /// A literal code length, CL symbols 0..=15.
    Value(u16),
    /// Symbol 16: repeat the previous length `3 + n` more times, `n` in 0..=3.
    RepeatPrev(u8),
    /// Symbol 17: `3 + n` zero lengths, `n` in 0..=7.
    RepeatZeroShort(u8),
    /// Symbol 18: `11 + n` zero lengths, `n` in 0..=127.
    RepeatZeroLong(u8),
}

impl ClEntry {
    /// The CL alphabet symbol (0..=18) this entry is coded with.
    pub fn symbol(&self) -> u16 {
        match *self {
            ClEntry::Value(v) => v,
            ClEntry::RepeatPrev(_) => 16,
            ClEntry::RepeatZeroShort(_) => 17,
            ClEntry::RepeatZeroLong(_) => 18,
        }
    }

    /// The extra-bits field following this entry's code, as (value, width).
    pub fn extra(&self) -> Option<(u32, u32)> {
        match *self {
            ClEntry::Value(_) => None,
            ClEntry::RepeatPrev(n) => Some((n as u32, 2)),
            ClEntry::RepeatZeroShort(n) => Some((n as u32, 3)),
            ClEntry::RepeatZeroLong(n) => Some((n as u32, 7)),
        }
    }
}

/// Index one past the last nonzero entry at or after `min_len`, or `min_len`
/// itself if none exists. Used to trim trailing runs of unused code lengths
/// before RLE-encoding a dynamic block's code-length sequence, and again to
/// trim the code-length code's own permuted length table before emission.
pub fn trimmed_len(lengths: &[u16], min_len: usize) -> usize {
    let mut last = min_len;
    for (i, &len) in lengths.iter().enumerate().skip(min_len) {
        if len != 0 {
            last = i + 1;
        }
    }
    last
}

/// Run-length encode a (already trimmed) code-length sequence using CL
/// symbols 16 (repeat previous), 17 (short zero run) and 18 (long zero run).
pub fn rle(code_lengths: &[u16]) -> Vec<ClEntry> {
    let n = code_lengths.len();
    let mut out = Vec::new();
    let mut i = 0;
    while i < n {
        let current = code_lengths[i];
        if current == 0 && i + 2 < n && code_lengths[i + 1] == 0 && code_lengths[i + 2] == 0 {
            let mut length = 3;
            while length + i < n {
                if code_lengths[length + i] != 0 || length == 138 {
                    break;
                }
                length += 1;
            }
            out.push(if length < 11 {
                ClEntry::RepeatZeroShort((length - 3) as u8)
            } else {
                ClEntry::RepeatZeroLong((length - 11) as u8)
            });
            i += length;
        } else if i + 3 < n
            && current == code_lengths[i + 1]
            && current == code_lengths[i + 2]
            && current == code_lengths[i + 3]
        {
            out.push(ClEntry::Value(current));
            let mut length = 3;
            while length + i + 1 < n {
                if code_lengths[length + i + 1] != current || length == 6 {
                    break;
                }
                length += 1;
            }
            out.push(ClEntry::RepeatPrev((length - 3) as u8));
            i += length + 1;
        } else {
            out.push(ClEntry::Value(current));
            i += 1;
        }
    }
    out
}

/// The code-length alphabet's own canonical Huffman code, plus how many of
/// the 19 permuted length entries actually need to be written (HCLEN + 4).
pub struct ClCode {
    pub lengths: [u16; NUM_CL_SYMBOLS],
    pub codes: [u16; NUM_CL_SYMBOLS],
    pub num_to_write: usize,
}

/// Build the CL code from the frequency of each CL symbol across both the
/// literal/length and distance RLE streams (they share one alphabet).
pub fn build_cl_code(ll_entries: &[ClEntry], dist_entries: &[ClEntry]) -> ClCode {
    let mut freq = vec![0u32; NUM_CL_SYMBOLS];
    for e in ll_entries.iter().chain(dist_entries.iter()) {
        freq[e.symbol() as usize] += 1;
    }

    let lengths_vec = huffman::package_merge(MAX_CL_CODE_LEN, NUM_CL_SYMBOLS, &freq);
    let codes_vec = huffman::canonical_codes(&lengths_vec);

    let mut lengths = [0u16; NUM_CL_SYMBOLS];
    let mut codes = [0u16; NUM_CL_SYMBOLS];
    lengths.copy_from_slice(&lengths_vec);
    codes.copy_from_slice(&codes_vec);

    // The first 4 permuted entries (symbols 16, 17, 18, 0) are always
    // written; trailing zero-length entries beyond that can be dropped.
    let mut num_to_write = 4;
    for (i, &sym) in CL_PERMUTATION.iter().enumerate().skip(4) {
        if lengths[sym] != 0 {
            num_to_write = i + 1;
        }
    }

    ClCode { lengths, codes, num_to_write }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_run_uses_repeat_prev() {
        let lengths = [5u16, 5, 5, 5, 5];
        let entries = rle(&lengths);
        assert_eq!(entries[0], ClEntry::Value(5));
        assert!(matches!(entries[1], ClEntry::RepeatPrev(_)));
    }

    #[test]
    fn short_zero_run_below_eleven() {
        let lengths = [0u16; 5];
        let entries = rle(&lengths);
        assert_eq!(entries, vec![ClEntry::RepeatZeroShort(2)]);
    }

    #[test]
    fn long_zero_run_at_eleven() {
        let lengths = [0u16; 11];
        let entries = rle(&lengths);
        assert_eq!(entries, vec![ClEntry::RepeatZeroLong(0)]);
    }

    #[test]
    fn zero_run_caps_at_138() {
        let lengths = [0u16; 200];
        let entries = rle(&lengths);
        assert_eq!(entries[0], ClEntry::RepeatZeroLong(127));
        // remaining 62 zeros must still be accounted for
        let remaining: usize = entries[1..]
            .iter()
            .map(|e| match e {
                ClEntry::RepeatZeroShort(n) => 3 + *n as usize,
                ClEntry::RepeatZeroLong(n) => 11 + *n as usize,
                ClEntry::Value(_) => 1,
                ClEntry::RepeatPrev(n) => 3 + *n as usize,
            })
            .sum();
        assert_eq!(138 + remaining, 200);
    }

    #[test]
    fn nonzero_repeat_caps_at_six_extra() {
        let lengths = [4u16; 20];
        let entries = rle(&lengths);
        assert_eq!(entries[0], ClEntry::Value(4));
        assert_eq!(entries[1], ClEntry::RepeatPrev(3));
    }

    #[test]
    fn run_reaching_exact_end_is_fully_covered() {
        let mut lengths = vec![1u16, 2, 3];
        lengths.extend([0u16, 0, 0]);
        let entries = rle(&lengths);
        let last = entries.last().unwrap();
        assert!(matches!(last, ClEntry::RepeatZeroShort(0)));
    }

    #[test]
    fn trimmed_len_drops_trailing_zeros_only() {
        let lengths = [1u16, 0, 2, 0, 0];
        assert_eq!(trimmed_len(&lengths, 0), 3);
    }

    #[test]
    fn trimmed_len_never_goes_below_min() {
        let lengths = [0u16; 10];
        assert_eq!(trimmed_len(&lengths, 4), 4);
    }

    #[test]
    fn cl_code_assigns_used_value_symbols_a_length() {
        let ll = rle(&[8u16; 1]);
        let dist = rle(&[3u16; 1]);
        let code = build_cl_code(&ll, &dist);
        assert!(code.lengths[8] > 0);
        assert!(code.num_to_write >= 4);
    }
}
