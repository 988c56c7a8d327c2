//! Contract for the detector-data and template loaders
//!
//! Reading the detector container format happens outside this crate. A loader
//! hands its buffers over through these types, which refuse mismatched
//! lengths instead of truncating.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, SonifyError};
use crate::signal::TimeSeries;

/// A single channel metadata value
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Int(i64),
    Float(f64),
    Text(String),
    Flags(Vec<String>),
}

pub type ChannelMeta = BTreeMap<String, MetaValue>;

/// Strain for one detector channel with its GPS time stamps
#[derive(Debug, Clone)]
pub struct StrainRecord {
    strain: TimeSeries,
    time: Vec<f64>,
    metadata: ChannelMeta,
}

impl StrainRecord {
    pub fn new(strain: TimeSeries, time: Vec<f64>, metadata: ChannelMeta) -> Result<Self> {
        if time.len() != strain.len() {
            return Err(SonifyError::LengthMismatch {
                context: "strain vs. time axis",
                expected: strain.len(),
                actual: time.len(),
            });
        }
        Ok(Self {
            strain,
            time,
            metadata,
        })
    }

    pub fn strain(&self) -> &TimeSeries {
        &self.strain
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn metadata(&self) -> &ChannelMeta {
        &self.metadata
    }

    /// GPS time of the first sample
    pub fn start_time(&self) -> f64 {
        self.time[0]
    }
}

/// Reference waveform polarizations h+ and h×
#[derive(Debug, Clone)]
pub struct Template {
    plus: TimeSeries,
    cross: TimeSeries,
}

impl Template {
    pub fn new(plus: TimeSeries, cross: TimeSeries) -> Result<Self> {
        if plus.len() != cross.len() {
            return Err(SonifyError::LengthMismatch {
                context: "template plus vs. cross polarization",
                expected: plus.len(),
                actual: cross.len(),
            });
        }
        plus.check_dt(cross.dt())?;
        Ok(Self { plus, cross })
    }

    pub fn plus(&self) -> &TimeSeries {
        &self.plus
    }

    pub fn cross(&self) -> &TimeSeries {
        &self.cross
    }
}

/// Source of detector strain and templates
pub trait StrainSource {
    fn load_strain(&self, path: &Path, channel: &str) -> Result<StrainRecord>;

    fn load_template(&self, path: &Path) -> Result<Template>;
}
