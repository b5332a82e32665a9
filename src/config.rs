//! Locator configuration.
//!
//! [`LocatorConfig`] holds the few knobs of [`TrialLocator`](crate::TrialLocator).
//! Per-task sample counts and partition thresholds are fixed constants of the
//! dataset layout and are not configurable.

use crate::error::{EegError, Result};
use crate::{EEG_FILE_NAME, SAMPLING_RATE_HZ};

/// Configuration for [`TrialLocator`](crate::TrialLocator).
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use eegtrials::LocatorConfig;
///
/// let cfg = LocatorConfig {
///     allow_short_trial: true,   // keep truncated final trials
///     ..LocatorConfig::default()
/// };
/// assert_eq!(cfg.eeg_file_name, "EEGdata.csv");
/// ```
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Sampling rate of the recordings in Hz.
    ///
    /// Must be finite and positive, see [`LocatorConfig::validate`].
    /// Only used to report [`TrialSlice::onset`](crate::TrialSlice::onset) and
    /// [`TrialSlice::duration`](crate::TrialSlice::duration); row arithmetic
    /// always uses the fixed per-task sample counts.
    ///
    /// Default: `250.0` Hz.
    pub sampling_rate_hz: f64,

    /// File name of the recording inside each session directory.
    ///
    /// Default: `"EEGdata.csv"`.
    pub eeg_file_name: String,

    /// Accept a trial whose rows run past the end of the file.
    ///
    /// When `false` such a trial fails with `EegError::OutOfRange`.  When
    /// `true` the available rows are returned and
    /// [`TrialSlice::is_truncated`](crate::TrialSlice::is_truncated) reports
    /// it.  A trial that starts past the end of the file is an error either
    /// way.
    ///
    /// Default: `false`.
    pub allow_short_trial: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: SAMPLING_RATE_HZ,
            eeg_file_name: EEG_FILE_NAME.to_string(),
            allow_short_trial: false,
        }
    }
}

impl LocatorConfig {
    /// Checks the fields a locator depends on
    ///
    /// # Errors
    ///
    /// * `EegError::InvalidArgument` - `sampling_rate_hz` is not a finite
    ///   positive number, or `eeg_file_name` is empty
    pub fn validate(&self) -> Result<()> {
        if !(self.sampling_rate_hz.is_finite() && self.sampling_rate_hz > 0.0) {
            return Err(EegError::InvalidArgument(format!(
                "Sampling rate must be a positive number of Hz, got {}",
                self.sampling_rate_hz
            )));
        }
        if self.eeg_file_name.trim().is_empty() {
            return Err(EegError::InvalidArgument("EEG file name must not be empty".to_string()));
        }
        Ok(())
    }
}
