//! Interleaved frame demultiplexing
//!
//! Channel `j` of an interleaved block is every `channels`-th sample starting at
//! offset `j`. A trailing partial frame is kept: its samples go to the leading
//! channels, exactly as a strided slice of the block would.

use crate::errors::{RecorderError, Result};

/// Split an interleaved block into one sample buffer per channel.
///
/// # Errors
/// Returns `InvalidChannelCount` when `channels` is zero.
pub fn demux(block: &[i16], channels: usize) -> Result<Vec<Vec<i16>>> {
    if channels < 1 {
        return Err(RecorderError::InvalidChannelCount(channels));
    }

    Ok((0..channels)
        .map(|j| block.iter().skip(j).step_by(channels).copied().collect())
        .collect())
}

/// Inverse of [`demux`] for equally sized channel buffers.
pub fn interleave(channels: &[Vec<i16>]) -> Vec<i16> {
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = Vec::with_capacity(frames * channels.len());
    for i in 0..frames {
        for channel in channels {
            out.push(channel[i]);
        }
    }
    out
}

/// Decode little-endian i16 PCM bytes. A dangling odd byte is ignored.
pub fn samples_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Encode samples as little-endian i16 PCM bytes.
pub fn samples_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_stereo_split() {
        let block = [1, 2, 3, 4, 5, 6, 7, 8];
        let channels = demux(&block, 2).unwrap();
        assert_eq!(channels, vec![vec![1, 3, 5, 7], vec![2, 4, 6, 8]]);
    }

    #[test]
    fn test_single_channel_is_identity() {
        let block = [9, -9, 300, i16::MIN, i16::MAX];
        let channels = demux(&block, 1).unwrap();
        assert_eq!(channels, vec![block.to_vec()]);
    }

    #[test]
    fn test_zero_channels_rejected() {
        let err = demux(&[1, 2, 3], 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidChannelCount);
    }

    #[test]
    fn test_partial_trailing_frame_goes_to_leading_channels() {
        let channels = demux(&[1, 2, 3, 4, 5, 6, 7], 3).unwrap();
        assert_eq!(channels, vec![vec![1, 4, 7], vec![2, 5], vec![3, 6]]);

        let channels = demux(&[1, 2, 3, 4, 5, 6, 7, 8], 3).unwrap();
        assert_eq!(channels, vec![vec![1, 4, 7], vec![2, 5, 8], vec![3, 6]]);
    }

    #[test]
    fn test_block_shorter_than_one_frame() {
        let channels = demux(&[5], 4).unwrap();
        assert_eq!(channels, vec![vec![5], vec![], vec![], vec![]]);
    }

    #[test]
    fn test_empty_block() {
        let channels = demux(&[], 4).unwrap();
        assert_eq!(channels.len(), 4);
        assert!(channels.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_interleave_inverts_demux() {
        let block: Vec<i16> = (0..24).collect();
        let channels = demux(&block, 4).unwrap();
        assert_eq!(interleave(&channels), block);
    }

    #[test]
    fn test_le_bytes() {
        let samples = [0x0102, -2, 0];
        let bytes = samples_to_le_bytes(&samples);
        assert_eq!(bytes, vec![0x02, 0x01, 0xFE, 0xFF, 0x00, 0x00]);
        assert_eq!(samples_from_le_bytes(&bytes), samples.to_vec());
        assert_eq!(samples_from_le_bytes(&[0x01]), Vec::<i16>::new());
    }
}
