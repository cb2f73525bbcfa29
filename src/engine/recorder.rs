//! WAV capture of offline renders

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::context::ProcessingContext;
use super::offline::OfflineContext;

/// Writes rendered mono audio to a 32-bit float WAV file
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    samples_written: u64,
}

impl Recorder {
    /// Create a recorder writing to `path`
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            sample_rate,
            samples_written: 0,
        })
    }

    /// Create a recorder matching an offline context's sample rate
    pub fn for_context(path: &Path, ctx: &OfflineContext) -> Result<Self> {
        Self::new(path, ctx.sample_rate().round() as u32)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Duration recorded so far in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples_written as f64 / self.sample_rate as f64
    }

    /// Write a buffer of samples
    pub fn write_buffer(&mut self, buffer: &[f32]) -> Result<()> {
        for &sample in buffer {
            self.writer
                .write_sample(sample)
                .context("failed to write sample")?;
        }
        self.samples_written += buffer.len() as u64;
        Ok(())
    }

    /// Render everything scheduled on `ctx` plus `tail` seconds of silence
    ///
    /// Rendering is capped at `max_seconds` of voice activity.
    pub fn capture(&mut self, ctx: &mut OfflineContext, tail: f64, max_seconds: f64) -> Result<()> {
        let voiced = ctx.render_to_silence(max_seconds);
        self.write_buffer(&voiced)?;

        let silence = ctx.render_seconds(tail);
        self.write_buffer(&silence)
    }

    /// Finalize the WAV file
    ///
    /// This must be called to properly close the file and write the header.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("failed to finalize WAV file")
    }
}
