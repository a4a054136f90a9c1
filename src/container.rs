//! # Video Container
//!
//! A header followed by the encoded frames in order:
//!
//! ```text
//! ┌───────┬────────┬──────────────────┬─────────┬─────────┬─────┐
//! │ w: u8 │ h: u8  │ frame_count: u32 │ entry 0 │ entry 1 │ ... │
//! └───────┴────────┴──────────────────┴─────────┴─────────┴─────┘
//!
//!   packed entry : [1024 bytes]
//!   rle entry    : [len: u32][len run bytes]
//! ```
//!
//! All integers are little-endian. The header does not record which encoding
//! the entries use; readers are told.

use std::io::{Seek, SeekFrom, Write};

use crate::codec::{PackedFrame, RleFrame, RunStats, PACKED_LEN};
use crate::error::{VidError, VidResult};
use crate::frame::{MonoFrame, DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 6;

const LEN_PREFIX: usize = 4;

/// How frames are stored in a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Encoding {
    /// `[len: u32][runs]` per frame
    #[default]
    Rle,
    /// 1024 bytes per frame
    Packed,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Rle => f.write_str("rle"),
            Encoding::Packed => f.write_str("packed"),
        }
    }
}

/// One frame in either encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodedFrame {
    Packed(PackedFrame),
    Rle(RleFrame),
}

impl EncodedFrame {
    /// Encode `frame`, recording runs into `stats` when RLE is selected.
    pub fn encode(
        frame: &MonoFrame,
        encoding: Encoding,
        stats: Option<&mut RunStats>,
    ) -> VidResult<Self> {
        Ok(match (encoding, stats) {
            (Encoding::Packed, _) => EncodedFrame::Packed(PackedFrame::pack(frame)),
            (Encoding::Rle, Some(stats)) => {
                EncodedFrame::Rle(RleFrame::encode_with_stats(frame, stats)?)
            }
            (Encoding::Rle, None) => EncodedFrame::Rle(RleFrame::encode(frame)?),
        })
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            EncodedFrame::Packed(_) => Encoding::Packed,
            EncodedFrame::Rle(_) => Encoding::Rle,
        }
    }

    pub fn decode(&self) -> VidResult<MonoFrame> {
        match self {
            EncodedFrame::Packed(p) => Ok(p.unpack()),
            EncodedFrame::Rle(r) => r.decode(),
        }
    }

    /// Payload bytes, without the RLE length prefix.
    pub fn payload(&self) -> &[u8] {
        match self {
            EncodedFrame::Packed(p) => p.as_bytes(),
            EncodedFrame::Rle(r) => r.as_bytes(),
        }
    }

    /// Bytes this frame occupies inside a container.
    pub fn stored_len(&self) -> usize {
        match self {
            EncodedFrame::Packed(_) => PACKED_LEN,
            EncodedFrame::Rle(r) => LEN_PREFIX + r.run_count(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub width: u8,
    pub height: u8,
    pub frame_count: u32,
}

impl Header {
    pub fn new(frame_count: u32) -> Self {
        Self {
            width: DISPLAY_WIDTH as u8,
            height: DISPLAY_HEIGHT as u8,
            frame_count,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let count = self.frame_count.to_le_bytes();
        [
            self.width,
            self.height,
            count[0],
            count[1],
            count[2],
            count[3],
        ]
    }

    /// Parse and validate the leading header of `data`.
    ///
    /// # Errors
    /// [`VidError::Format`] if `data` is shorter than [`HEADER_LEN`] or the
    /// geometry is not 128×64.
    pub fn parse(data: &[u8]) -> VidResult<Self> {
        let Some(bytes) = data.get(..HEADER_LEN) else {
            return Err(VidError::format(
                "container_header",
                format!("expected {} header bytes, got {}", HEADER_LEN, data.len()),
            ));
        };
        let header = Self {
            width: bytes[0],
            height: bytes[1],
            frame_count: u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
        };
        if u32::from(header.width) != DISPLAY_WIDTH || u32::from(header.height) != DISPLAY_HEIGHT {
            return Err(VidError::format(
                "container_header",
                format!(
                    "geometry {}x{} is not {}x{}",
                    header.width, header.height, DISPLAY_WIDTH, DISPLAY_HEIGHT
                ),
            ));
        }
        Ok(header)
    }
}

/// Streams frames into a container, patching the frame count on [`finish`].
///
/// [`finish`]: ContainerWriter::finish
pub struct ContainerWriter<W: Write + Seek> {
    inner: W,
    encoding: Encoding,
    start: u64,
    frames: u32,
}

impl<W: Write + Seek> ContainerWriter<W> {
    /// Write a placeholder header at the current position of `inner`.
    pub fn new(mut inner: W, encoding: Encoding) -> VidResult<Self> {
        let start = inner
            .stream_position()
            .map_err(|e| VidError::io("container_open", e))?;
        inner
            .write_all(&Header::new(0).to_bytes())
            .map_err(|e| VidError::io("container_header", e))?;
        Ok(Self {
            inner,
            encoding,
            start,
            frames: 0,
        })
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn frame_count(&self) -> u32 {
        self.frames
    }

    /// Append one frame.
    ///
    /// # Errors
    /// [`VidError::Encoding`] if the frame uses a different encoding than the
    /// container or the count would overflow `u32`.
    pub fn write_frame(&mut self, frame: &EncodedFrame) -> VidResult<()> {
        if frame.encoding() != self.encoding {
            return Err(VidError::encoding(
                "container_write",
                format!(
                    "{} frame in a {} container",
                    frame.encoding(),
                    self.encoding
                ),
            ));
        }
        let next = self.frames.checked_add(1).ok_or_else(|| {
            VidError::encoding("container_write", "frame count exceeds u32::MAX")
        })?;

        let io_err = |e| VidError::io("container_write", e).with_frame_index(u64::from(next - 1));
        if let EncodedFrame::Rle(rle) = frame {
            let len = rle.run_count() as u32;
            self.inner.write_all(&len.to_le_bytes()).map_err(io_err)?;
        }
        self.inner.write_all(frame.payload()).map_err(io_err)?;

        self.frames = next;
        Ok(())
    }

    /// Encode and append a binary plane.
    ///
    /// `stats` is only updated once the frame has been written.
    pub fn push(&mut self, frame: &MonoFrame, stats: Option<&mut RunStats>) -> VidResult<usize> {
        let mut scratch = RunStats::new();
        let encoded = EncodedFrame::encode(frame, self.encoding, Some(&mut scratch))
            .map_err(|e| e.with_frame_index(u64::from(self.frames)))?;
        self.write_frame(&encoded)?;

        let len = encoded.payload().len();
        if let Some(stats) = stats {
            scratch.record_frame(len, frame.foreground_count());
            stats.merge(&scratch);
        }
        Ok(len)
    }

    /// Patch the frame count into the header and hand back the sink.
    pub fn finish(mut self) -> VidResult<W> {
        let io_err = |e| VidError::io("container_finish", e);
        self.inner
            .seek(SeekFrom::Start(self.start + 2))
            .map_err(io_err)?;
        self.inner
            .write_all(&self.frames.to_le_bytes())
            .map_err(io_err)?;
        self.inner.seek(SeekFrom::End(0)).map_err(io_err)?;
        self.inner.flush().map_err(io_err)?;
        Ok(self.inner)
    }
}

/// Reads frames back out of an in-memory (usually memory-mapped) container.
///
/// Iterating yields decoded frames. After the last entry the reader checks
/// that no bytes remain; leftovers are reported as one final error.
pub struct ContainerReader<'a> {
    data: &'a [u8],
    header: Header,
    encoding: Encoding,
    pos: usize,
    index: u32,
    done: bool,
}

impl<'a> ContainerReader<'a> {
    pub fn new(data: &'a [u8], encoding: Encoding) -> VidResult<Self> {
        let header = Header::parse(data)?;
        Ok(Self {
            data,
            header,
            encoding,
            pos: HEADER_LEN,
            index: 0,
            done: false,
        })
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Next entry without decoding it.
    pub fn next_encoded(&mut self) -> Option<VidResult<EncodedFrame>> {
        if self.done {
            return None;
        }
        if self.index == self.header.frame_count {
            self.done = true;
            let left = self.data.len() - self.pos;
            return (left > 0).then(|| {
                Err(VidError::format(
                    "container_read",
                    format!("{} trailing bytes after frame {}", left, self.index),
                ))
            });
        }

        let result = self
            .read_entry()
            .map_err(|e| e.with_frame_index(u64::from(self.index)));
        match result {
            Ok(_) => self.index += 1,
            Err(_) => self.done = true,
        }
        Some(result)
    }

    fn read_entry(&mut self) -> VidResult<EncodedFrame> {
        match self.encoding {
            Encoding::Packed => {
                let bytes = self.take(PACKED_LEN)?;
                Ok(EncodedFrame::Packed(PackedFrame::from_bytes(bytes)?))
            }
            Encoding::Rle => {
                let prefix = self.take(LEN_PREFIX)?;
                let len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
                let runs = self.take(len as usize)?;
                Ok(EncodedFrame::Rle(RleFrame::from_bytes(runs.to_vec())?))
            }
        }
    }

    fn take(&mut self, n: usize) -> VidResult<&'a [u8]> {
        let data = self.data;
        let end = self.pos.checked_add(n).filter(|&end| end <= data.len());
        let Some(end) = end else {
            return Err(VidError::format(
                "container_read",
                format!(
                    "entry truncated: need {} bytes, {} available",
                    n,
                    data.len() - self.pos
                ),
            )
            .with_metadata("offset", self.pos.to_string()));
        };
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }
}

impl Iterator for ContainerReader<'_> {
    type Item = VidResult<MonoFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = u64::from(self.index);
        self.next_encoded()
            .map(|entry| entry.and_then(|f| f.decode().map_err(|e| e.with_frame_index(index))))
    }
}

/// Decode every frame of a container.
pub fn read_all(data: &[u8], encoding: Encoding) -> VidResult<Vec<MonoFrame>> {
    ContainerReader::new(data, encoding)?.collect()
}
