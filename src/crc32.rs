//! The reflected IEEE CRC-32 used for the gzip trailer (polynomial
//! 0xEDB88320, init 0xFFFFFFFF, final XOR 0xFFFFFFFF).
//!
//! Exposed byte-at-a-time (`init_with_byte`/`extend_with_byte`) to match
//! the driver, which reads stdin one byte at a time and wants to fold each
//! byte into the running checksum as it arrives rather than buffering the
//! whole input first.

const POLY: u32 = 0xEDB8_8320;

fn table_entry(mut byte: u32) -> u32 {
    for _ in 0..8 {
        byte = if byte & 1 != 0 { POLY ^ (byte >> 1) } else { byte >> 1 };
    }
    byte
}

/// Fold one byte into a CRC accumulator (the *internal*, un-complemented
/// representation — i.e. before the leading/trailing 0xFFFFFFFF XOR).
fn step(crc: u32, byte: u8) -> u32 {
    let idx = ((crc ^ byte as u32) & 0xFF) as u32;
    table_entry(idx) ^ (crc >> 8)
}

/// Start a running CRC-32 with the first input byte.
pub fn init_with_byte(first_byte: u8) -> u32 {
    step(0xFFFF_FFFF, first_byte) ^ 0xFFFF_FFFF
}

/// Fold the next input byte into a CRC-32 produced by `init_with_byte` or a
/// previous call to `extend_with_byte`.
pub fn extend_with_byte(next_byte: u8, old_crc: u32) -> u32 {
    step(old_crc ^ 0xFFFF_FFFF, next_byte) ^ 0xFFFF_FFFF
}

/// Convenience: CRC-32 of a full buffer, for tests and the empty-input case.
pub fn of_slice(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in data {
        crc = step(crc, b);
    }
    crc ^ 0xFFFF_FFFF
}
