use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::config::LocatorConfig;
use crate::error::{EegError, Result};
use crate::types::{RowRange, Task, TrialDescriptor, TrialSlice};
use crate::utils::{open_existing, parse_sample};
use crate::MI_SAMPLES_PER_TRIAL;

const MAX_PREALLOC_ROWS: usize = MI_SAMPLES_PER_TRIAL;

/// Resolves trials to their rows inside per-subject session recordings
///
/// The dataset is laid out as
/// `{base}/{task}/{partition}/{subject_id}/{trial_session}/EEGdata.csv`,
/// one CSV file per session holding every trial of that session back to back
/// with no boundary markers. A trial is recovered purely from the fixed
/// per-task sample count, see [`RowRange::for_trial`].
///
/// The locator only holds its base path and configuration. Every call reads
/// the session file again and nothing is cached, so one locator can be
/// shared freely between threads.
///
/// # Examples
///
/// ```rust
/// use eegtrials::{Task, TrialDescriptor, TrialLocator};
///
/// # // Generate test dataset (hidden from docs)
/// # let dir = "locator_doc_dataset";
/// # eegtrials::doctest_utils::create_simple_dataset(dir)?;
/// #
/// let locator = TrialLocator::new(dir);
/// let descriptor = TrialDescriptor::new(1, Task::MotorImagery, "S01", "1", 1)?;
///
/// let slice = locator.locate(&descriptor)?;
/// assert_eq!(slice.len(), 2250);
/// assert_eq!((slice.range().start, slice.range().end), (0, 2249));
/// println!("Data shape: {:?}", slice.shape());
///
/// # // Cleanup (hidden from docs)
/// # std::fs::remove_dir_all(dir).ok();
/// # Ok::<(), eegtrials::EegError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TrialLocator {
    base_path: PathBuf,
    config: LocatorConfig,
}

impl TrialLocator {
    /// Creates a locator over the dataset rooted at `base_path` with the
    /// default configuration
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self::with_config(base_path, LocatorConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(base_path: P, config: LocatorConfig) -> Self {
        TrialLocator {
            base_path: base_path.as_ref().to_path_buf(),
            config,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Path of the session recording that holds `descriptor`'s trial
    ///
    /// Pure path arithmetic; the file is not touched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::path::Path;
    /// use eegtrials::{Task, TrialDescriptor, TrialLocator};
    ///
    /// let locator = TrialLocator::new("/data/mtc");
    /// let d = TrialDescriptor::new(4850, Task::Ssvep, "S30", "2", 3)?;
    /// assert_eq!(
    ///     locator.eeg_path(&d),
    ///     Path::new("/data/mtc/SSVEP/validation/S30/2/EEGdata.csv")
    /// );
    /// # Ok::<(), eegtrials::EegError>(())
    /// ```
    pub fn eeg_path(&self, descriptor: &TrialDescriptor) -> PathBuf {
        self.base_path
            .join(descriptor.task().as_str())
            .join(descriptor.partition().as_str())
            .join(descriptor.subject_id())
            .join(descriptor.trial_session())
            .join(&self.config.eeg_file_name)
    }

    /// Row range of the `trial`-th trial of a `task` session
    pub fn trial_range(task: Task, trial: u32) -> Result<RowRange> {
        RowRange::for_trial(task, trial)
    }

    /// Reads the rows of one trial
    ///
    /// # Errors
    ///
    /// * `EegError::InvalidArgument` - The descriptor's trial range cannot be computed,
    ///   or the locator's configuration is invalid
    /// * `EegError::NotFound` - The session recording does not exist
    /// * `EegError::OutOfRange` - The recording ends before the trial does
    ///   (unless [`LocatorConfig::allow_short_trial`] is set and at least one
    ///   row of the trial exists)
    /// * `EegError::InvalidFormat` - A cell inside the trial is not numeric
    /// * `EegError::Csv` / `EegError::Io` - The recording could not be read
    pub fn locate(&self, descriptor: &TrialDescriptor) -> Result<TrialSlice> {
        let range = descriptor.row_range()?;
        let path = self.eeg_path(descriptor);

        debug!(
            id = descriptor.id(),
            partition = %descriptor.partition(),
            path = %path.display(),
            rows = %range,
            "locating trial"
        );

        self.read_range(&path, range)
    }

    /// Reads rows `range` of the recording at `path`
    ///
    /// Rows are streamed and reading stops at `range.end`; rows before
    /// `range.start` are skipped without being parsed.
    ///
    /// # Errors
    ///
    /// * `EegError::InvalidArgument` - `range` is inverted (`end < start`) or
    ///   the locator's configuration is invalid (see [`LocatorConfig::validate`])
    /// * otherwise as [`TrialLocator::locate`]
    pub fn read_range(&self, path: &Path, range: RowRange) -> Result<TrialSlice> {
        self.config.validate()?;
        if range.is_empty() {
            return Err(EegError::InvalidArgument(format!("Inverted row range {}", range)));
        }

        let file = open_existing(path)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(file));

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 预分配上限：一个最长的试次
        let mut rows = Vec::with_capacity(range.len().min(MAX_PREALLOC_ROWS));
        let mut record = StringRecord::new();
        // 当前记录在文件中的行号（不含表头）
        let mut row_index = 0usize;

        while row_index <= range.end && reader.read_record(&mut record)? {
            if row_index >= range.start {
                rows.push(parse_row(&record, row_index, &columns)?);
            }
            row_index += 1;
        }

        if rows.len() < range.len() {
            let available = row_index;
            if rows.is_empty() || !self.config.allow_short_trial {
                return Err(EegError::OutOfRange {
                    path: path.to_path_buf(),
                    start: range.start,
                    end: range.end,
                    available,
                });
            }
            debug!(
                path = %path.display(),
                requested = range.len(),
                returned = rows.len(),
                "returning truncated trial"
            );
        }

        Ok(TrialSlice {
            source: path.to_path_buf(),
            columns,
            rows,
            range,
            sampling_rate_hz: self.config.sampling_rate_hz,
        })
    }
}

/// Locates and reads one trial below `base_path` with the default configuration
///
/// Shorthand for `TrialLocator::new(base_path).locate(descriptor)`.
pub fn locate_trial<P: AsRef<Path>>(descriptor: &TrialDescriptor, base_path: P) -> Result<TrialSlice> {
    TrialLocator::new(base_path).locate(descriptor)
}

fn parse_row(record: &StringRecord, row_index: usize, columns: &[String]) -> Result<Vec<f64>> {
    record
        .iter()
        .zip(columns)
        .map(|(cell, column)| parse_sample(cell, row_index, column))
        .collect()
}
