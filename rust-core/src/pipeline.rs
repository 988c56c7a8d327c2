//! Strain-to-audio pipeline
//!
//! whiten -> (bandpass) -> (frequency shift) -> (resample) -> encode -> WAV.
//! Every stage is a pure transform over an owned buffer, so independent
//! detector channels can be rendered concurrently.

use log::{debug, info};
use rayon::prelude::*;
use std::path::Path;

use crate::audio::{encode_with, resample, write_wav, AudioBuffer, EncoderConfig};
use crate::error::{Result, SonifyError};
use crate::filters::bandpass::{bandpass, BandpassConfig};
use crate::filters::noise_psd::PsdModel;
use crate::filters::shift::{bin_shift_with, frequency_shift_with};
use crate::filters::whiten::whiten_with;
use crate::loader::StrainRecord;
use crate::signal::TimeSeries;
use crate::spectrum::fft::FftEngine;

/// Frequency shifter used by the shift stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftMethod {
    /// Continuous translation by any offset
    PhaseModulation,

    /// Whole-bin reassignment, for parity with older renderings
    BinReassignment,
}

#[derive(Debug, Clone)]
pub struct ShiftConfig {
    pub offset_hz: f64,
    pub method: ShiftMethod,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            offset_hz: 400.0,
            method: ShiftMethod::PhaseModulation,
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct SonifyConfig {
    /// Band limiting applied right after whitening
    pub bandpass: Option<BandpassConfig>,

    pub shift: Option<ShiftConfig>,

    pub encoder: EncoderConfig,

    /// Convert to this rate before encoding; `None` keeps the strain rate
    pub playback_rate: Option<u32>,
}

impl Default for SonifyConfig {
    fn default() -> Self {
        Self {
            bandpass: Some(BandpassConfig::default()),
            shift: Some(ShiftConfig::default()),
            encoder: EncoderConfig::default(),
            playback_rate: None,
        }
    }
}

/// One post-whitening stage
trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, fft: &FftEngine, signal: &TimeSeries) -> Result<TimeSeries>;
}

struct BandpassStage(BandpassConfig);

impl Stage for BandpassStage {
    fn name(&self) -> &'static str {
        "bandpass"
    }

    fn apply(&self, _fft: &FftEngine, signal: &TimeSeries) -> Result<TimeSeries> {
        bandpass(signal, &self.0)
    }
}

struct ShiftStage(ShiftConfig);

impl Stage for ShiftStage {
    fn name(&self) -> &'static str {
        "shift"
    }

    fn apply(&self, fft: &FftEngine, signal: &TimeSeries) -> Result<TimeSeries> {
        let fs = signal.sample_rate();
        match self.0.method {
            ShiftMethod::PhaseModulation => frequency_shift_with(fft, signal, self.0.offset_hz, fs),
            ShiftMethod::BinReassignment => {
                bin_shift_with(fft, signal, self.0.offset_hz, fs).map(|shifted| shifted.series)
            }
        }
    }
}

struct ResampleStage(u32);

impl Stage for ResampleStage {
    fn name(&self) -> &'static str {
        "resample"
    }

    fn apply(&self, _fft: &FftEngine, signal: &TimeSeries) -> Result<TimeSeries> {
        resample(signal, self.0)
    }
}

/// One detector channel to render
pub struct Channel<'a> {
    pub label: String,
    pub strain: &'a TimeSeries,
    pub psd: &'a dyn PsdModel,
}

/// Renders whitened, audible versions of detector strain
pub struct Sonifier {
    config: SonifyConfig,
    fft: FftEngine,
    stages: Vec<Box<dyn Stage>>,
}

impl Sonifier {
    pub fn new(config: SonifyConfig) -> Self {
        let mut stages: Vec<Box<dyn Stage>> = Vec::new();
        if let Some(bp) = &config.bandpass {
            stages.push(Box::new(BandpassStage(bp.clone())));
        }
        if let Some(shift) = &config.shift {
            stages.push(Box::new(ShiftStage(shift.clone())));
        }
        if let Some(rate) = config.playback_rate {
            stages.push(Box::new(ResampleStage(rate)));
        }

        Self {
            config,
            fft: FftEngine::new(),
            stages,
        }
    }

    pub fn config(&self) -> &SonifyConfig {
        &self.config
    }

    /// Whiten `strain` against `psd`, then run the configured stages
    pub fn condition<P: PsdModel + ?Sized>(&self, strain: &TimeSeries, psd: &P) -> Result<TimeSeries> {
        let mut signal = whiten_with(&self.fft, strain, psd, strain.dt())?;

        for stage in &self.stages {
            debug!("pipeline: {} on {} samples", stage.name(), signal.len());
            signal = stage.apply(&self.fft, &signal)?;
        }

        Ok(signal)
    }

    /// Condition and encode to 16-bit PCM at the output rate
    pub fn render<P: PsdModel + ?Sized>(&self, strain: &TimeSeries, psd: &P) -> Result<AudioBuffer> {
        let conditioned = self.condition(strain, psd)?;
        let rate = audio_rate(&conditioned)?;
        encode_with(&conditioned, rate, &self.config.encoder)
    }

    /// Render and write a mono 16-bit WAV file
    pub fn render_to_file<P, Q>(&self, strain: &TimeSeries, psd: &P, path: Q) -> Result<AudioBuffer>
    where
        P: PsdModel + ?Sized,
        Q: AsRef<Path>,
    {
        let audio = self.render(strain, psd)?;
        write_wav(path, &audio)?;
        Ok(audio)
    }

    pub fn render_record<P: PsdModel + ?Sized>(&self, record: &StrainRecord, psd: &P) -> Result<AudioBuffer> {
        self.render(record.strain(), psd)
    }

    /// Render independent channels in parallel; results keep input order
    pub fn render_channels(&self, channels: &[Channel<'_>]) -> Vec<Result<AudioBuffer>> {
        info!("rendering {} channels", channels.len());

        channels
            .par_iter()
            .map(|channel| {
                debug!("pipeline: channel {}", channel.label);
                self.render(channel.strain, channel.psd)
            })
            .collect()
    }
}

impl Default for Sonifier {
    fn default() -> Self {
        Self::new(SonifyConfig::default())
    }
}

/// Integer audio rate of a conditioned series
fn audio_rate(signal: &TimeSeries) -> Result<u32> {
    let fs = signal.sample_rate();
    let rounded = fs.round();
    if (fs - rounded).abs() > 1e-6 * rounded || rounded < 1.0 || rounded > u32::MAX as f64 {
        return Err(SonifyError::InvalidParameter(format!(
            "audio needs an integer sample rate, got {fs} Hz"
        )));
    }
    Ok(rounded as u32)
}
