//! Planar multi-channel sample block.
//!
//! A [`Block`] holds one render cycle's worth of audio laid out channel-major:
//! frame `i` of channel `c` lives at `c * block_size + i`. The length is
//! always `channels * block_size` and no operation can change it.

use crate::{Error, Result};

/// Sample rate plus block shape. Any change is a reconfiguration event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub sample_rate: f64,
    pub channels: usize,
    pub block_size: usize,
}

/// Fixed-size planar sample buffer for one render cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    channels: usize,
    block_size: usize,
    data: Vec<f32>,
}

impl Block {
    /// Zero-filled block.
    pub fn allocate(channels: usize, block_size: usize) -> Self {
        Self {
            channels,
            block_size,
            data: vec![0.0; channels * block_size],
        }
    }

    /// Wrap channel-major samples, checking the length invariant.
    pub fn from_planar(channels: usize, block_size: usize, samples: Vec<f32>) -> Result<Self> {
        let expected = channels * block_size;
        if samples.len() != expected {
            return Err(Error::GeometryMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            channels,
            block_size,
            data: samples,
        })
    }

    /// Build from one slice per channel. All channels must share a length.
    pub fn from_channels(channels: &[&[f32]]) -> Result<Self> {
        let block_size = channels.first().map_or(0, |c| c.len());
        let mut data = Vec::with_capacity(channels.len() * block_size);
        for channel in channels {
            if channel.len() != block_size {
                return Err(Error::GeometryMismatch {
                    expected: block_size,
                    actual: channel.len(),
                });
            }
            data.extend_from_slice(channel);
        }
        Ok(Self {
            channels: channels.len(),
            block_size,
            data,
        })
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn channel(&self, c: usize) -> &[f32] {
        let start = c * self.block_size;
        &self.data[start..start + self.block_size]
    }

    #[inline]
    pub fn channel_mut(&mut self, c: usize) -> &mut [f32] {
        let start = c * self.block_size;
        &mut self.data[start..start + self.block_size]
    }

    /// Disjoint views of channels 0 and 1.
    ///
    /// Panics on a mono block; stereo units declare a two-channel minimum so
    /// the engine never hands them one.
    #[inline]
    pub fn stereo_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        let (left, rest) = self.data.split_at_mut(self.block_size);
        (left, &mut rest[..self.block_size])
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.data.chunks_exact_mut(self.block_size.max(1))
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.data
    }

    #[inline]
    pub fn same_shape(&self, other: &Block) -> bool {
        self.channels == other.channels && self.block_size == other.block_size
    }

    /// Copy samples from a block of the same shape. Does not allocate.
    #[inline]
    pub fn copy_from(&mut self, other: &Block) {
        debug_assert!(self.same_shape(other));
        self.data.copy_from_slice(&other.data);
    }

    /// Add samples from a block of the same shape. Does not allocate.
    #[inline]
    pub fn mix_from(&mut self, other: &Block) {
        debug_assert!(self.same_shape(other));
        for (dst, src) in self.data.iter_mut().zip(&other.data) {
            *dst += src;
        }
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Change shape, reusing the allocation when it is large enough.
    pub(crate) fn reshape(&mut self, channels: usize, block_size: usize) {
        self.channels = channels;
        self.block_size = block_size;
        self.data.clear();
        self.data.resize(channels * block_size, 0.0);
    }
}
