//! Whole-buffer rendering without real-time constraints.
//!
//! Feeds planar input through the chain in engine-sized blocks. Frames that do
//! not fill a block wait for the next [`render`](OfflineRenderer::render)
//! call, so a stream split over several calls renders exactly like one call.
//! [`finish`](OfflineRenderer::finish) zero-pads and flushes the remainder and
//! trims the padding from the result.

use crate::error::{Error, Result};
use crate::{Block, Controller, Engine};

/// Rendered audio, one `Vec` per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: f64,
}

impl RenderResult {
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate
    }

    /// Peak absolute sample over all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flatten()
            .fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Channels interleaved frame by frame.
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frames();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for i in 0..frames {
            out.extend(self.channels.iter().map(|c| c[i]));
        }
        out
    }
}

/// Owns an engine and renders complete buffers through it.
pub struct OfflineRenderer {
    engine: Engine,
    /// Input not yet rendered, shorter than one block.
    pending: Vec<Vec<f32>>,
}

impl OfflineRenderer {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            pending: Vec::new(),
        }
    }

    pub fn controller(&self) -> &Controller {
        self.engine.controller()
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }

    /// Frames held back until the next call or [`finish`](Self::finish).
    pub fn pending_frames(&self) -> usize {
        self.pending.first().map_or(0, Vec::len)
    }

    /// Continue the stream with `input` (one slice per channel, equal
    /// lengths) and return every whole block now available.
    ///
    /// The result may be shorter than `input`: a trailing partial block is
    /// held back and rendered ahead of the next call's input.
    pub fn render(&mut self, input: &[&[f32]]) -> Result<RenderResult> {
        let frames = input.first().map_or(0, |c| c.len());
        for (channel, samples) in input.iter().enumerate() {
            if samples.len() != frames {
                return Err(Error::RaggedInput {
                    channel,
                    expected: frames,
                    actual: samples.len(),
                });
            }
        }
        if self.pending_frames() == 0 {
            self.pending = vec![Vec::new(); input.len()];
        } else if self.pending.len() != input.len() {
            return Err(Error::ChannelCountChanged {
                expected: self.pending.len(),
                actual: input.len(),
            });
        }

        for (pending, samples) in self.pending.iter_mut().zip(input) {
            pending.extend_from_slice(samples);
        }
        let block_size = self.engine.config().block_size;
        let whole = self.pending_frames() / block_size * block_size;
        let output = self.run(whole);
        for pending in &mut self.pending {
            pending.drain(..whole);
        }

        tracing::debug!(
            "Rendered {} frames on {} channels offline, {} pending",
            whole,
            input.len(),
            self.pending_frames()
        );
        Ok(self.result(output))
    }

    /// Render the held-back frames, zero-padded to a block, and end the
    /// stream. The padding is trimmed from the result.
    pub fn finish(&mut self) -> RenderResult {
        let frames = self.pending_frames();
        let output = self.run(frames);
        self.pending.clear();
        self.result(output)
    }

    /// Render a complete buffer: [`render`](Self::render) then
    /// [`finish`](Self::finish). The output has as many frames as `input`.
    pub fn render_all(&mut self, input: &[&[f32]]) -> Result<RenderResult> {
        let mut result = self.render(input)?;
        let tail = self.finish();
        for (out, rest) in result.channels.iter_mut().zip(tail.channels) {
            out.extend(rest);
        }
        Ok(result)
    }

    /// Render the first `frames` pending frames block by block.
    fn run(&mut self, frames: usize) -> Vec<Vec<f32>> {
        let block_size = self.engine.config().block_size;
        let mut output: Vec<Vec<f32>> = self
            .pending
            .iter()
            .map(|_| Vec::with_capacity(frames))
            .collect();
        let mut block = Block::allocate(self.pending.len(), block_size);

        let mut start = 0;
        while start < frames {
            let len = block_size.min(frames - start);
            for (c, samples) in self.pending.iter().enumerate() {
                let dst = block.channel_mut(c);
                dst[..len].copy_from_slice(&samples[start..start + len]);
                dst[len..].fill(0.0);
            }
            self.engine.render_block(&mut block);
            for (c, out) in output.iter_mut().enumerate() {
                out.extend_from_slice(&block.channel(c)[..len]);
            }
            start += len;
        }
        output
    }

    fn result(&self, channels: Vec<Vec<f32>>) -> RenderResult {
        RenderResult {
            channels,
            sample_rate: self.engine.controller().sample_rate(),
        }
    }
}
