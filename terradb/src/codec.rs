//! Delta bit-packing codec for cell records.
//!
//! A cell is stored as its minimum elevation plus one unsigned
//! `width`-bit delta per sample, where `width` is just wide enough for
//! `max - min`. Deltas are concatenated LSB-first with no padding between
//! samples, and the resulting bitstream is serialized least-significant
//! byte first. The on-disk bit and byte order is fixed; it does not follow
//! the host.
//!
//! Because `8 * width` bits is a whole number of bytes for any width, the
//! packing pattern is periodic with period 8 samples: each full 8-sample
//! cycle emits exactly `width` bytes and leaves the accumulator empty, so
//! the stream re-aligns to a byte boundary every 8 samples.
//!
//! Width 0 means constant: the minimum alone reconstructs the cell and no
//! bytes are stored.

use crate::error::{Result, TerrainError};

/// Widest delta this codec packs.
///
/// Callers guarantee the data domain keeps `max - min` within 15 bits; the
/// cell encoder stores wider cells uncompressed instead of packing them.
pub const MAX_BIT_WIDTH: u8 = 15;

/// Packed byte length for `count` samples at `width` bits each.
#[inline]
pub fn packed_len(count: usize, width: u8) -> usize {
    (count * width as usize + 7) / 8
}

/// Bits required to represent `delta` (0 for a zero delta).
#[inline]
pub fn bit_width(delta: u32) -> u8 {
    (32 - delta.leading_zeros()) as u8
}

/// Pack `samples` into `out`, returning `(minimum, width)`.
///
/// `out` is cleared first and receives exactly
/// [`packed_len`]`(samples.len(), width)` bytes; for a constant input the
/// width is 0 and `out` stays empty.
///
/// # Panics
///
/// Debug-asserts that `samples` is non-empty and that the delta fits in
/// [`MAX_BIT_WIDTH`] bits; both are caller-guaranteed preconditions.
pub fn pack(samples: &[i16], out: &mut Vec<u8>) -> (i16, u8) {
    debug_assert!(!samples.is_empty());
    out.clear();

    let mut min = samples[0];
    let mut max = samples[0];
    for &s in &samples[1..] {
        min = min.min(s);
        max = max.max(s);
    }

    let width = bit_width((max as i32 - min as i32) as u32);
    debug_assert!(width <= MAX_BIT_WIDTH);
    if width == 0 {
        return (min, 0);
    }

    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    for &s in samples {
        acc |= ((s as i32 - min as i32) as u32) << bits;
        bits += width as u32;
        while bits >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    // Anything left is the final partial byte
    if bits > 0 {
        out.push(acc as u8);
    }

    (min, width)
}

/// Reconstruct `count` samples from a packed record.
///
/// Exact inverse of [`pack`]; this is the same routine the query engine
/// uses to open cell records. `out` is cleared first.
///
/// # Errors
///
/// [`TerrainError::ShortRead`] if `packed` holds fewer bytes than `count`
/// samples at `width` bits require.
pub fn unpack(packed: &[u8], min: i16, width: u8, count: usize, out: &mut Vec<i16>) -> Result<()> {
    debug_assert!(width <= MAX_BIT_WIDTH);
    out.clear();

    if width == 0 {
        out.resize(count, min);
        return Ok(());
    }

    let needed = packed_len(count, width);
    if packed.len() < needed {
        return Err(TerrainError::ShortRead {
            expected: needed,
            actual: packed.len(),
        });
    }

    let mask: u32 = (1u32 << width) - 1;
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut next = 0usize;
    for _ in 0..count {
        while bits < width as u32 {
            acc |= (packed[next] as u32) << bits;
            next += 1;
            bits += 8;
        }
        let delta = acc & mask;
        acc >>= width;
        bits -= width as u32;
        out.push((min as i32 + delta as i32) as i16);
    }

    Ok(())
}
