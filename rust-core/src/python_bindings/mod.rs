//! PyO3 bindings for Python integration (enabled by the `python` feature)

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::error::SonifyError;

mod signal_bindings;
mod sonifier_bindings;

impl From<SonifyError> for PyErr {
    fn from(err: SonifyError) -> Self {
        match err {
            SonifyError::Io(_) | SonifyError::Wav(_) => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Python module definition
#[pymodule]
fn strain_sonify(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(signal_bindings::whiten, m)?)?;
    m.add_function(wrap_pyfunction!(signal_bindings::reqshift, m)?)?;
    m.add_function(wrap_pyfunction!(signal_bindings::bin_shift, m)?)?;
    m.add_function(wrap_pyfunction!(signal_bindings::estimate_psd, m)?)?;
    m.add_function(wrap_pyfunction!(signal_bindings::write_wavfile, m)?)?;

    m.add_class::<sonifier_bindings::PySonifier>()?;

    Ok(())
}
