//! Dense 1bpp bitmap: byte `r * 16 + c / 8`, bit `7 - c % 8` holds pixel `(r, c)`.
//!
//! This is also the on-disk format of a single-frame `img.bin` (no header).

use crate::error::{VidError, VidResult};
use crate::frame::{MonoFrame, DISPLAY_WIDTH, PIXEL_COUNT};

/// Encoded size of one frame.
pub const PACKED_LEN: usize = PIXEL_COUNT / 8;

const ROW_BYTES: usize = DISPLAY_WIDTH as usize / 8;

#[derive(Clone, PartialEq, Eq)]
pub struct PackedFrame {
    bytes: [u8; PACKED_LEN],
}

impl PackedFrame {
    pub fn pack(frame: &MonoFrame) -> Self {
        let mut bytes = [0u8; PACKED_LEN];
        for (byte, group) in bytes.iter_mut().zip(frame.pixels().chunks_exact(8)) {
            *byte = group
                .iter()
                .fold(0u8, |acc, &px| (acc << 1) | u8::from(px));
        }
        Self { bytes }
    }

    pub fn unpack(&self) -> MonoFrame {
        let bits = self
            .bytes
            .iter()
            .flat_map(|&b| (0..8).rev().map(move |i| b & (1 << i) != 0))
            .collect();
        MonoFrame::from_vec(bits)
    }

    /// Wrap an encoded buffer.
    ///
    /// # Errors
    /// [`VidError::Format`] unless `bytes` is exactly [`PACKED_LEN`] long.
    pub fn from_bytes(bytes: &[u8]) -> VidResult<Self> {
        let bytes: [u8; PACKED_LEN] = bytes.try_into().map_err(|_| {
            VidError::format(
                "packed_decode",
                format!("expected {} bytes, got {}", PACKED_LEN, bytes.len()),
            )
        })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The 16 bytes of row `y`.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.bytes[y * ROW_BYTES..(y + 1) * ROW_BYTES]
    }
}

impl std::fmt::Debug for PackedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PackedFrame({} bytes)", PACKED_LEN)
    }
}
