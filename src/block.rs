//! DEFLATE block writer (§4.8): turns one block's LZSS tokens into a stored,
//! fixed-Huffman or dynamic-Huffman block, picking whichever the data calls
//! for.
//!
//! The three block types share nothing in their bit layout, so each gets its
//! own `write_*` function; `write_block` is just the decision tree over
//! them. Huffman code construction (`huffman::package_merge`,
//! `huffman::canonical_codes`) and code-length-alphabet bookkeeping
//! (`cl_code`) live in their own modules; this one is pure plumbing.

use crate::bitsink::BitSink;
use crate::cl_code::{self, ClCode};
use crate::huffman;
use crate::tables;
use crate::window::{Token, Window};
use crate::{Error, Result};

const MAX_BLOCK_SIZE: usize = (1 << 16) - 1;

/// The block-type-1 (fixed Huffman) code tables, built once at start-up from
/// the RFC 1951 §3.2.6 length assignment and shared by every block that
/// chooses type 1.
pub struct FixedCode {
    ll_lengths: [u16; tables::NUM_LITLEN_FIXED_SYMBOLS],
    ll_codes: Vec<u16>,
    dist_lengths: [u16; tables::NUM_DISTANCE_FIXED_SYMBOLS],
    dist_codes: Vec<u16>,
}

impl FixedCode {
    pub fn new() -> Self {
        let ll_lengths = tables::fixed_litlen_lengths();
        let dist_lengths = tables::fixed_distance_lengths();
        let ll_codes = huffman::canonical_codes(&ll_lengths);
        let dist_codes = huffman::canonical_codes(&dist_lengths);
        Self { ll_lengths, ll_codes, dist_lengths, dist_codes }
    }
}

impl Default for FixedCode {
    fn default() -> Self {
        Self::new()
    }
}

/// Write one DEFLATE block's contents (not including the BFINAL bit, which
/// the caller owns since it depends on whether more blocks follow).
///
/// Runs LZSS over `contents` via `window`, then picks a block type: stored,
/// if Huffman coding would lose to just storing the bytes raw; otherwise
/// fixed or dynamic Huffman, based on how skewed the symbol frequencies are.
pub fn write_block(
    sink: &mut BitSink,
    window: &mut Window,
    fixed: &FixedCode,
    contents: &[u8],
) -> Result<()> {
    if contents.len() > MAX_BLOCK_SIZE {
        return Err(Error::BlockTooLarge(contents.len()));
    }

    let tokens = window.tokenize_block(contents);

    let stored_overhead_bits = 8 * contents.len() as u64 + 40;
    if tokens.estimated_type1_bits > stored_overhead_bits {
        log::debug!(
            "block of {} bytes: LZSS estimate {} bits exceeds stored overhead, using type 0",
            contents.len(),
            tokens.estimated_type1_bits
        );
        write_stored(sink, contents);
        return Ok(());
    }

    let (ll_freq, dist_freq) = frequencies(&tokens.tokens);

    if frequency_analysis(&ll_freq, &dist_freq) {
        log::debug!("block of {} bytes: low variance, using type 1", contents.len());
        write_fixed(sink, fixed, &tokens.tokens);
    } else {
        log::debug!("block of {} bytes: high variance, using type 2", contents.len());
        write_dynamic(sink, &tokens.tokens, &ll_freq, &dist_freq);
    }
    Ok(())
}

/// Type 0: two header bits, pad to a byte, LEN/NLEN, then the raw bytes.
fn write_stored(sink: &mut BitSink, contents: &[u8]) {
    sink.push_bits(0, 2);
    sink.flush_to_byte();
    sink.push_u16(contents.len() as u16);
    sink.push_u16(!(contents.len() as u16));
    for &b in contents {
        sink.push_byte(b);
    }
}

/// Type 1: two header bits, then every token Huffman-coded under the fixed
/// code, then the end-of-block symbol.
fn write_fixed(sink: &mut BitSink, fixed: &FixedCode, tokens: &[Token]) {
    sink.push_bits(1, 2);
    for t in tokens {
        emit_token(sink, t, &fixed.ll_lengths, &fixed.ll_codes, &fixed.dist_lengths, &fixed.dist_codes);
    }
    sink.push_code(fixed.ll_codes[256] as u32, fixed.ll_lengths[256] as u32);
}

/// Type 2: two header bits, a package-merge-built code tailored to this
/// block's symbol frequencies, the code-length-code preamble describing
/// that code, then every token, then end-of-block.
fn write_dynamic(sink: &mut BitSink, tokens: &[Token], ll_freq: &[u32], dist_freq: &[u32]) {
    sink.push_bits(2, 2);

    let ll_lengths =
        huffman::package_merge(15, tables::NUM_LITLEN_SYMBOLS, &ll_freq[..tables::NUM_LITLEN_SYMBOLS]);
    let dist_lengths =
        huffman::package_merge(15, tables::NUM_DISTANCE_SYMBOLS, &dist_freq[..tables::NUM_DISTANCE_SYMBOLS]);
    let ll_codes = huffman::canonical_codes(&ll_lengths);
    let dist_codes = huffman::canonical_codes(&dist_lengths);

    write_cl_data(sink, &ll_lengths, &dist_lengths);

    for t in tokens {
        emit_token(sink, t, &ll_lengths, &ll_codes, &dist_lengths, &dist_codes);
    }
    sink.push_code(ll_codes[256] as u32, ll_lengths[256] as u32);
}

/// Emit one token using whichever code table (fixed or dynamic) the caller
/// built for this block.
fn emit_token(
    sink: &mut BitSink,
    token: &Token,
    ll_lengths: &[u16],
    ll_codes: &[u16],
    dist_lengths: &[u16],
    dist_codes: &[u16],
) {
    match *token {
        Token::Literal(b) => {
            let sym = b as usize;
            sink.push_code(ll_codes[sym] as u32, ll_lengths[sym] as u32);
        }
        Token::Backref(m) => {
            let length_symbol = tables::length_to_symbol(m.length);
            sink.push_code(ll_codes[length_symbol as usize] as u32, ll_lengths[length_symbol as usize] as u32);
            let length_offset = tables::length_offset(m.length, length_symbol);
            sink.push_bits(length_offset as u32, tables::LENGTH_EXTRA_BITS[(length_symbol - 257) as usize]);

            let distance_symbol = tables::distance_to_symbol(m.distance);
            sink.push_code(dist_codes[distance_symbol as usize] as u32, dist_lengths[distance_symbol as usize] as u32);
            let distance_offset = tables::distance_offset(m.distance, distance_symbol);
            sink.push_bits(distance_offset as u32, tables::DISTANCE_EXTRA_BITS[distance_symbol as usize]);
        }
    }
}

/// Count per-symbol frequencies over a token stream, literal/length and
/// distance alphabets separately. The end-of-block symbol (256) always
/// occurs exactly once per block, whether or not any token used it yet.
///
/// Sized to the *fixed*-code alphabets (288/32), one count per symbol
/// DEFLATE could possibly name, even though symbols 286/287 and 30/31
/// never occur: the variance heuristic below is defined over the whole
/// alphabet DEFLATE could have used, not just the symbols actually seen.
fn frequencies(tokens: &[Token]) -> (Vec<u32>, Vec<u32>) {
    let mut ll = vec![0u32; tables::NUM_LITLEN_FIXED_SYMBOLS];
    let mut dist = vec![0u32; tables::NUM_DISTANCE_FIXED_SYMBOLS];
    for t in tokens {
        match *t {
            Token::Literal(b) => ll[b as usize] += 1,
            Token::Backref(m) => {
                let ls = tables::length_to_symbol(m.length);
                let ds = tables::distance_to_symbol(m.distance);
                ll[ls as usize] += 1;
                dist[ds as usize] += 1;
            }
        }
    }
    ll[256] += 1;
    (ll, dist)
}

/// Population variance of a frequency array, including its zero entries:
/// a flat distribution has low variance and favors the fixed code, a skewed
/// one has high variance and is worth building a dynamic code for.
fn variance(values: &[u32]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    values.iter().map(|&v| { let d = v as f64 - mean; d * d }).sum::<f64>() / n
}

fn frequency_analysis(ll_freq: &[u32], dist_freq: &[u32]) -> bool {
    variance(ll_freq) <= 1.5 && variance(dist_freq) <= 1.5
}

/// Write the dynamic block's code-length-code preamble: HLIT/HDIST/HCLEN,
/// the permuted CL code-length table, then the RLE-encoded literal/length
/// and distance code-length sequences.
fn write_cl_data(sink: &mut BitSink, ll_lengths: &[u16], dist_lengths: &[u16]) {
    let num_ll = cl_code::trimmed_len(ll_lengths, 257);
    let num_dist = cl_code::trimmed_len(dist_lengths, 1);

    sink.push_bits((num_ll - 257) as u32, 5);
    sink.push_bits((num_dist - 1) as u32, 5);

    let ll_entries = cl_code::rle(&ll_lengths[..num_ll]);
    let dist_entries = cl_code::rle(&dist_lengths[..num_dist]);

    let ClCode { lengths: cl_lengths, codes: cl_codes, num_to_write } =
        cl_code::build_cl_code(&ll_entries, &dist_entries);

    sink.push_bits((num_to_write - 4) as u32, 4);
    for &sym in tables::CL_PERMUTATION.iter().take(num_to_write) {
        sink.push_bits(cl_lengths[sym] as u32, 3);
    }

    write_cl_entries(sink, &ll_entries, &cl_lengths, &cl_codes);
    if dist_entries.is_empty() {
        sink.push_bits(0, 5);
    } else {
        write_cl_entries(sink, &dist_entries, &cl_lengths, &cl_codes);
    }
}

fn write_cl_entries(sink: &mut BitSink, entries: &[cl_code::ClEntry], cl_lengths: &[u16], cl_codes: &[u16]) {
    for entry in entries {
        let sym = entry.symbol() as usize;
        sink.push_code(cl_codes[sym] as u32, cl_lengths[sym] as u32);
        if let Some((value, width)) = entry.extra() {
            sink.push_bits(value, width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_block_header_and_length_fields() {
        let mut sink = BitSink::new();
        write_stored(&mut sink, b"abc");
        let bytes = sink.finalize();
        // header byte: BTYPE=00 in bits 0-1 of the first byte (BFINAL is the
        // caller's concern, not written here), rest padded with zero.
        assert_eq!(bytes[0], 0);
        assert_eq!(u16::from_le_bytes([bytes[1], bytes[2]]), 3);
        assert_eq!(u16::from_le_bytes([bytes[3], bytes[4]]), !3u16);
        assert_eq!(&bytes[5..8], b"abc");
    }

    #[test]
    fn empty_block_picks_fixed_or_dynamic_not_stored() {
        let mut sink = BitSink::new();
        let mut window = Window::new();
        let fixed = FixedCode::new();
        write_block(&mut sink, &mut window, &fixed, &[]).unwrap();
        // an empty block still needs at least the end-of-block symbol.
        assert!(!sink.finalize().is_empty());
    }

    #[test]
    fn oversized_block_is_rejected() {
        let mut sink = BitSink::new();
        let mut window = Window::new();
        let fixed = FixedCode::new();
        let huge = vec![0u8; MAX_BLOCK_SIZE + 1];
        assert!(write_block(&mut sink, &mut window, &fixed, &huge).is_err());
    }

    #[test]
    fn repetitive_block_uses_huffman_not_stored() {
        let mut sink = BitSink::new();
        let mut window = Window::new();
        let fixed = FixedCode::new();
        let data = vec![b'a'; 1000];
        write_block(&mut sink, &mut window, &fixed, &data).unwrap();
        let bytes = sink.finalize();
        // 1000 bytes of one repeated byte should compress to far less than
        // the stored-block's 1000+5 byte floor.
        assert!(bytes.len() < 100);
    }

    #[test]
    fn non_repetitive_block_round_trips_through_token_estimate() {
        let mut sink = BitSink::new();
        let mut window = Window::new();
        let fixed = FixedCode::new();
        // distinct bytes with no exploitable repetition: every token is a
        // literal, so the LZSS bit estimate never exceeds the stored
        // overhead and a Huffman-coded block (fixed or dynamic) is chosen.
        let data: Vec<u8> = (0..20u32).map(|i| ((i * 2654435761) % 256) as u8).collect();
        write_block(&mut sink, &mut window, &fixed, &data).unwrap();
        assert!(!sink.finalize().is_empty());
    }

    #[test]
    fn frequency_analysis_prefers_fixed_for_flat_distribution() {
        let ll = vec![1u32; tables::NUM_LITLEN_SYMBOLS];
        let dist = vec![1u32; tables::NUM_DISTANCE_SYMBOLS];
        assert!(frequency_analysis(&ll, &dist));
    }

    #[test]
    fn frequency_analysis_prefers_dynamic_for_skewed_distribution() {
        let mut ll = vec![0u32; tables::NUM_LITLEN_SYMBOLS];
        ll[b'a' as usize] = 10_000;
        ll[256] = 1;
        let dist = vec![0u32; tables::NUM_DISTANCE_SYMBOLS];
        assert!(!frequency_analysis(&ll, &dist));
    }
}
