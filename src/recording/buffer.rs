//! Per-channel sample accumulation for one segment

use crate::audio::{demux, samples_from_le_bytes, samples_to_le_bytes};
use crate::errors::Result;
use crate::timing::CaptureTimestamp;

/// Raw little-endian PCM chunks of one channel, in capture order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelBuffer {
    chunks: Vec<Vec<u8>>,
}

impl ChannelBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_samples(&mut self, samples: &[i16]) {
        self.chunks.push(samples_to_le_bytes(samples));
    }

    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Number of mono frames held (one i16 each)
    pub fn frame_count(&self) -> usize {
        self.byte_len() / 2
    }

    /// All chunks concatenated with no gaps
    pub fn to_bytes(&self) -> Vec<u8> {
        self.chunks.concat()
    }

    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.chunks.iter().flat_map(|c| samples_from_le_bytes(c))
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(Vec::is_empty)
    }
}

/// Everything captured during one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSegment {
    pub channel_buffers: Vec<ChannelBuffer>,
    pub captured_at: CaptureTimestamp,
}

impl RecordingSegment {
    pub fn new(channels: usize) -> Self {
        Self {
            channel_buffers: vec![ChannelBuffer::new(); channels],
            captured_at: CaptureTimestamp::now(),
        }
    }

    pub fn channels(&self) -> usize {
        self.channel_buffers.len()
    }

    /// Split an interleaved block and append each channel to its buffer.
    pub fn append_block(&mut self, block: &[i16]) -> Result<()> {
        let split = demux(block, self.channels())?;
        for (buffer, samples) in self.channel_buffers.iter_mut().zip(split) {
            buffer.push_samples(&samples);
        }
        Ok(())
    }
}
