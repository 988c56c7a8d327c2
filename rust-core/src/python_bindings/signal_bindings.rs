//! Python bindings for the individual conditioning stages

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

use crate::audio;
use crate::filters::{self, InterpolatedPsd};
use crate::signal::TimeSeries;
use crate::spectrum::{self, FftEngine, WelchConfig};

/// Whiten a strain series against a tabulated one-sided PSD
///
/// Args:
///     strain: Strain samples
///     psd_freqs: PSD knot frequencies in Hz (strictly increasing)
///     psd_values: PSD at each knot
///     dt: Sample spacing in seconds
///
/// Returns:
///     Whitened samples, same length as `strain`
#[pyfunction]
pub fn whiten<'py>(
    py: Python<'py>,
    strain: PyReadonlyArray1<f64>,
    psd_freqs: PyReadonlyArray1<f64>,
    psd_values: PyReadonlyArray1<f64>,
    dt: f64,
) -> PyResult<&'py PyArray1<f64>> {
    let signal = TimeSeries::new(strain.as_slice()?.to_vec(), dt)?;
    let psd = InterpolatedPsd::new(psd_freqs.as_slice()?.to_vec(), psd_values.as_slice()?.to_vec())?;

    let white = filters::whiten(&signal, &psd, dt)?;
    Ok(PyArray1::from_vec(py, white.into_samples()))
}

/// Shift frequency content by `fshift` Hz
#[pyfunction]
#[pyo3(signature = (data, fshift=100.0, sample_rate=4096.0))]
pub fn reqshift<'py>(
    py: Python<'py>,
    data: PyReadonlyArray1<f64>,
    fshift: f64,
    sample_rate: f64,
) -> PyResult<&'py PyArray1<f64>> {
    let signal = TimeSeries::from_sample_rate(data.as_slice()?.to_vec(), sample_rate)?;
    let shifted = filters::frequency_shift(&signal, fshift, sample_rate)?;
    Ok(PyArray1::from_vec(py, shifted.into_samples()))
}

/// Whole-bin shift; returns (samples, nbins, signal_lost)
#[pyfunction]
pub fn bin_shift<'py>(
    py: Python<'py>,
    data: PyReadonlyArray1<f64>,
    fshift: f64,
    sample_rate: f64,
) -> PyResult<(&'py PyArray1<f64>, i64, bool)> {
    let signal = TimeSeries::from_sample_rate(data.as_slice()?.to_vec(), sample_rate)?;
    let shifted = filters::bin_shift(&signal, fshift, sample_rate)?;
    let lost = shifted.signal_lost();

    Ok((
        PyArray1::from_vec(py, shifted.series.into_samples()),
        shifted.nbins,
        lost,
    ))
}

/// Welch PSD estimate; returns (frequencies, power)
#[pyfunction]
#[pyo3(signature = (strain, fs, nfft=16384, noverlap=8192))]
pub fn estimate_psd<'py>(
    py: Python<'py>,
    strain: PyReadonlyArray1<f64>,
    fs: f64,
    nfft: usize,
    noverlap: usize,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let signal = TimeSeries::from_sample_rate(strain.as_slice()?.to_vec(), fs)?;
    let config = WelchConfig {
        nfft,
        noverlap,
        ..WelchConfig::default()
    };

    let estimate = spectrum::estimate_psd(&signal, &config, &FftEngine::new())?;
    Ok((
        PyArray1::from_vec(py, estimate.frequencies),
        PyArray1::from_vec(py, estimate.power),
    ))
}

/// Encode `data` to 16-bit PCM at `fs` and write it to `filename`
#[pyfunction]
pub fn write_wavfile(filename: &str, fs: u32, data: PyReadonlyArray1<f64>) -> PyResult<usize> {
    let signal = TimeSeries::from_sample_rate(data.as_slice()?.to_vec(), fs as f64)?;
    let audio = audio::write_wavfile(filename, fs, &signal)?;
    Ok(audio.len())
}
