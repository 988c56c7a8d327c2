//! Strain Sonify - gravitational-wave strain conditioning and audification
//!
//! Whitens detector strain against a noise PSD, optionally band-limits and
//! shifts it into the audible range, and renders it as 16-bit PCM audio.
//! Python bindings are available with the `python` feature.

// PyO3 macro-generated impls trip this lint on newer toolchains
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod error;
pub mod signal;
pub mod spectrum;
pub mod filters;
pub mod audio;
pub mod loader;
pub mod pipeline;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use error::{Result, SonifyError};
pub use signal::{Spectrum, TimeSeries};
pub use spectrum::{FftEngine, SpectralTransform};
pub use filters::{bin_shift, frequency_shift, whiten, InterpolatedPsd, PsdModel};
pub use audio::{encode, write_wav, AudioBuffer};
pub use pipeline::{Sonifier, SonifyConfig};
