use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::TimeDelta;

use crate::error::{EegError, Result};
use crate::{MI_SAMPLES_PER_TRIAL, SSVEP_SAMPLES_PER_TRIAL, TRAIN_MAX_ID, VALIDATION_MAX_ID};

/// Recording paradigm of a trial
///
/// The task decides both the top-level directory of the recording and the
/// fixed number of samples each trial occupies in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Motor imagery, 9 s trials
    MotorImagery,
    /// Steady-state visually evoked potential, 7 s trials
    Ssvep,
}

impl Task {
    /// Name used in metadata tables and directory names (`MI` / `SSVEP`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::MotorImagery => "MI",
            Task::Ssvep => "SSVEP",
        }
    }

    /// Number of sample rows one trial occupies in a session file
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eegtrials::Task;
    ///
    /// assert_eq!(Task::MotorImagery.samples_per_trial(), 2250); // 9 s * 250 Hz
    /// assert_eq!(Task::Ssvep.samples_per_trial(), 1750);        // 7 s * 250 Hz
    /// ```
    pub fn samples_per_trial(&self) -> usize {
        match self {
            Task::MotorImagery => MI_SAMPLES_PER_TRIAL,
            Task::Ssvep => SSVEP_SAMPLES_PER_TRIAL,
        }
    }
}

impl FromStr for Task {
    type Err = EegError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "MI" => Ok(Task::MotorImagery),
            "SSVEP" => Ok(Task::Ssvep),
            other => Err(EegError::InvalidArgument(format!("Unknown task: '{}'", other))),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dataset split a trial belongs to
///
/// Never stored: it is derived from the trial id alone, see
/// [`Partition::from_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Partition {
    Train,
    Validation,
    Test,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Train, Partition::Validation, Partition::Test];

    /// Classifies a trial id into its partition
    ///
    /// Ids up to 4800 are training trials, ids up to 4900 validation trials,
    /// everything above is test data.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eegtrials::Partition;
    ///
    /// assert_eq!(Partition::from_id(4800), Partition::Train);
    /// assert_eq!(Partition::from_id(4801), Partition::Validation);
    /// assert_eq!(Partition::from_id(4900), Partition::Validation);
    /// assert_eq!(Partition::from_id(4901), Partition::Test);
    /// ```
    pub fn from_id(id: u64) -> Self {
        if id <= TRAIN_MAX_ID {
            Partition::Train
        } else if id <= VALIDATION_MAX_ID {
            Partition::Validation
        } else {
            Partition::Test
        }
    }

    /// Directory name of the partition (`train` / `validation` / `test`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Validation => "validation",
            Partition::Test => "test",
        }
    }

    /// File name of the metadata table listing this partition's trials
    pub fn metadata_file_name(&self) -> String {
        format!("{}.csv", self.as_str())
    }
}

impl FromStr for Partition {
    type Err = EegError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "train" => Ok(Partition::Train),
            "validation" => Ok(Partition::Validation),
            "test" => Ok(Partition::Test),
            other => Err(EegError::InvalidArgument(format!("Unknown partition: '{}'", other))),
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a metadata table, validated
///
/// A descriptor can only be built through [`TrialDescriptor::new`], so every
/// value in circulation has `id >= 1`, `trial >= 1` and subject/session names
/// that are safe to use as single path components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialDescriptor {
    id: u64,
    task: Task,
    subject_id: String,
    trial_session: String,
    trial: u32,
    label: Option<String>,
}

impl TrialDescriptor {
    /// Creates a validated descriptor
    ///
    /// # Errors
    ///
    /// * `EegError::InvalidArgument` - `id` or `trial` is zero, or the subject
    ///   or session is empty or not a single path component
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eegtrials::{Partition, Task, TrialDescriptor};
    ///
    /// let d = TrialDescriptor::new(4850, Task::Ssvep, "S07", "2", 3)?;
    /// assert_eq!(d.partition(), Partition::Validation);
    ///
    /// assert!(TrialDescriptor::new(1, Task::MotorImagery, "S01", "1", 0).is_err());
    /// # Ok::<(), eegtrials::EegError>(())
    /// ```
    pub fn new(
        id: u64,
        task: Task,
        subject_id: impl Into<String>,
        trial_session: impl Into<String>,
        trial: u32,
    ) -> Result<Self> {
        if id == 0 {
            return Err(EegError::InvalidArgument("Trial id must be >= 1".to_string()));
        }
        if trial == 0 {
            return Err(EegError::InvalidArgument(format!(
                "Trial index must be >= 1 (id {})",
                id
            )));
        }

        let subject_id = subject_id.into().trim().to_string();
        let trial_session = trial_session.into().trim().to_string();
        check_path_component("subject_id", &subject_id)?;
        check_path_component("trial_session", &trial_session)?;

        Ok(TrialDescriptor {
            id,
            task,
            subject_id,
            trial_session,
            trial,
            label: None,
        })
    }

    /// Attaches the class label of a train/validation row
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn trial_session(&self) -> &str {
        &self.trial_session
    }

    /// 1-based index of the trial within its session file
    pub fn trial(&self) -> u32 {
        self.trial
    }

    /// Class label; `None` for test rows
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn partition(&self) -> Partition {
        Partition::from_id(self.id)
    }

    /// Row range of this trial inside its session file
    pub fn row_range(&self) -> Result<RowRange> {
        RowRange::for_trial(self.task, self.trial)
    }
}

impl fmt::Display for TrialDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id             {}", self.id)?;
        writeln!(f, "task           {}", self.task)?;
        writeln!(f, "subject_id     {}", self.subject_id)?;
        writeln!(f, "trial_session  {}", self.trial_session)?;
        write!(f, "trial          {}", self.trial)?;
        if let Some(label) = &self.label {
            write!(f, "\nlabel          {}", label)?;
        }
        Ok(())
    }
}

fn check_path_component(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(EegError::InvalidArgument(format!("{} must not be empty", field)));
    }
    if value == "." || value == ".." || value.contains(&['/', '\\'][..]) {
        return Err(EegError::InvalidArgument(format!(
            "{} '{}' is not a single path component",
            field, value
        )));
    }
    Ok(())
}

/// Inclusive row range `[start, end]` inside a session file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    /// Range of the `trial`-th trial (1-based) for `task`
    ///
    /// `start = (trial - 1) * samples_per_trial`, `end = start + samples_per_trial - 1`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eegtrials::{RowRange, Task};
    ///
    /// let r = RowRange::for_trial(Task::Ssvep, 3)?;
    /// assert_eq!((r.start, r.end), (3500, 5249));
    /// assert_eq!(r.next().start, 5250);
    /// # Ok::<(), eegtrials::EegError>(())
    /// ```
    pub fn for_trial(task: Task, trial: u32) -> Result<Self> {
        if trial == 0 {
            return Err(EegError::InvalidArgument("Trial index must be >= 1".to_string()));
        }
        let len = task.samples_per_trial();
        let start = (trial as usize - 1)
            .checked_mul(len)
            .ok_or_else(|| EegError::InvalidArgument(format!("Trial index {} too large", trial)))?;
        Ok(RowRange {
            start,
            end: start + len - 1,
        })
    }

    /// Number of rows covered, both ends included
    ///
    /// An inverted range (`end < start`) covers no rows. A range reaching
    /// `usize::MAX` saturates.
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start).saturating_add(1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, row: usize) -> bool {
        row >= self.start && row <= self.end
    }

    /// Range of the following trial of the same length
    pub fn next(&self) -> RowRange {
        RowRange {
            start: self.end.saturating_add(1),
            end: self.end.saturating_add(self.len()),
        }
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Sample rows of one trial, cut out of its session file
///
/// Rows keep the column order of the source file; `rows()[0]` is the sample
/// at `range().start`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSlice {
    pub(crate) source: PathBuf,
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<f64>>,
    pub(crate) range: RowRange,
    pub(crate) sampling_rate_hz: f64,
}

impl TrialSlice {
    /// Number of sample rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(rows, columns)`, like a data frame shape
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }

    /// First `n` rows (fewer when the slice is shorter)
    pub fn head(&self, n: usize) -> &[Vec<f64>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// All samples of one named column
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Requested row range in the source file
    pub fn range(&self) -> RowRange {
        self.range
    }

    /// Session file the rows were read from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// `true` when the file ended before the requested range did
    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.range.len()
    }

    /// Offset of the first row from the start of the recording
    pub fn onset(&self) -> TimeDelta {
        samples_to_time(self.range.start, self.sampling_rate_hz)
    }

    /// Time covered by the rows actually returned
    pub fn duration(&self) -> TimeDelta {
        samples_to_time(self.rows.len(), self.sampling_rate_hz)
    }
}

fn samples_to_time(samples: usize, sampling_rate_hz: f64) -> TimeDelta {
    // 微秒精度足够：250 Hz 下每个样本 4000 微秒
    let micros = (samples as f64 * 1_000_000.0 / sampling_rate_hz).round() as i64;
    TimeDelta::microseconds(micros)
}
