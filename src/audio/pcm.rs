//! Conversions between integer samples and little-endian PCM bytes.
//!
//! 8-bit PCM is unsigned (offset by 128), wider depths are two's complement,
//! matching the WAV convention.

/// Write `sample` as `bits / 8` little-endian bytes into the front of `out`.
pub fn encode_sample(sample: i32, bits: u16, out: &mut [u8]) {
    match bits {
        8 => out[0] = (sample + 128) as u8,
        16 => out[..2].copy_from_slice(&(sample as i16).to_le_bytes()),
        24 => out[..3].copy_from_slice(&sample.to_le_bytes()[..3]),
        _ => out[..4].copy_from_slice(&sample.to_le_bytes()),
    }
}

/// Inverse of [`encode_sample`].
pub fn decode_sample(bytes: &[u8], bits: u16) -> i32 {
    match bits {
        8 => i32::from(bytes[0]) - 128,
        16 => i32::from(i16::from_le_bytes([bytes[0], bytes[1]])),
        // shift up then back down to sign-extend the top byte
        24 => i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8,
        _ => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    }
}

/// Scale a float sample in [-1.0, 1.0] to 16-bit, clipping out-of-range input.
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}
