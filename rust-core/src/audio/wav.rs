//! Mono 16-bit PCM WAV persistence (hound)

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::info;
use std::path::Path;

use super::encode::{encode_with, AudioBuffer, EncoderConfig};
use crate::error::{Result, SonifyError};
use crate::signal::TimeSeries;

fn pcm16_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Write `audio` as a single-channel 16-bit little-endian PCM WAV file
///
/// The writer owns the file handle: on an early return it is dropped (and
/// closed) before the error reaches the caller; on success it is finalised so
/// the header sizes are written before the handle is released.
pub fn write_wav<P: AsRef<Path>>(path: P, audio: &AudioBuffer) -> Result<()> {
    let path = path.as_ref();
    let mut writer = WavWriter::create(path, pcm16_spec(audio.sample_rate))?;

    for &sample in &audio.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    info!(
        "wrote {} samples at {} Hz to {}",
        audio.len(),
        audio.sample_rate,
        path.display()
    );
    Ok(())
}

/// Read a mono 16-bit PCM WAV file back into an `AudioBuffer`
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels != 1 || spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int {
        return Err(SonifyError::UnsupportedFormat(format!(
            "expected mono 16-bit PCM, got {} channel(s) of {}-bit {:?}",
            spec.channels, spec.bits_per_sample, spec.sample_format
        )));
    }

    let samples = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(AudioBuffer::new(samples, spec.sample_rate))
}

/// Encode `data` with the default headroom and write it to `path`
pub fn write_wavfile<P: AsRef<Path>>(path: P, sample_rate: u32, data: &TimeSeries) -> Result<AudioBuffer> {
    let audio = encode_with(data, sample_rate, &EncoderConfig::default())?;
    write_wav(path, &audio)?;
    Ok(audio)
}
