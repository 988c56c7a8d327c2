//! Python bindings for the full strain-to-audio pipeline

use numpy::PyReadonlyArray1;
use pyo3::prelude::*;

use crate::audio::EncoderConfig;
use crate::filters::{BandpassConfig, InterpolatedPsd};
use crate::pipeline::{ShiftConfig, ShiftMethod, Sonifier, SonifyConfig};
use crate::signal::TimeSeries;

/// Strain sonifier exposed to Python
#[pyclass(name = "Sonifier")]
pub struct PySonifier {
    sonifier: Sonifier,
}

#[pymethods]
impl PySonifier {
    /// Create a new sonifier
    ///
    /// Args:
    ///     band: (low_hz, high_hz) bandpass after whitening, or None
    ///     fshift: Frequency offset in Hz, or None to skip shifting
    ///     legacy_shift: Use whole-bin reassignment instead of modulation
    ///     headroom: Fraction of full scale for the loudest sample
    ///     playback_rate: Resample to this rate before encoding, or None
    #[new]
    #[pyo3(signature = (band=Some((20.0, 300.0)), fshift=Some(400.0), legacy_shift=false, headroom=0.9, playback_rate=None))]
    fn new(
        band: Option<(f64, f64)>,
        fshift: Option<f64>,
        legacy_shift: bool,
        headroom: f64,
        playback_rate: Option<u32>,
    ) -> Self {
        let method = if legacy_shift {
            ShiftMethod::BinReassignment
        } else {
            ShiftMethod::PhaseModulation
        };

        let config = SonifyConfig {
            bandpass: band.map(|(low_hz, high_hz)| BandpassConfig {
                low_hz,
                high_hz,
                ..BandpassConfig::default()
            }),
            shift: fshift.map(|offset_hz| ShiftConfig { offset_hz, method }),
            encoder: EncoderConfig { headroom },
            playback_rate,
        };

        Self {
            sonifier: Sonifier::new(config),
        }
    }

    /// Whiten, condition, encode and write `strain` to a WAV file
    ///
    /// Returns:
    ///     Number of audio samples written
    fn render_to_file(
        &self,
        strain: PyReadonlyArray1<f64>,
        fs: f64,
        psd_freqs: PyReadonlyArray1<f64>,
        psd_values: PyReadonlyArray1<f64>,
        path: &str,
    ) -> PyResult<usize> {
        let signal = TimeSeries::from_sample_rate(strain.as_slice()?.to_vec(), fs)?;
        let psd = InterpolatedPsd::new(psd_freqs.as_slice()?.to_vec(), psd_values.as_slice()?.to_vec())?;

        let audio = self.sonifier.render_to_file(&signal, &psd, path)?;
        Ok(audio.len())
    }
}
