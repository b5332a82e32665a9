use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};

use crate::error::{EegError, Result};
use crate::types::{Task, TrialDescriptor};

/// Session recording writer producing `EEGdata.csv` files
///
/// Writes the layout [`TrialLocator`](crate::TrialLocator) reads: one header
/// row of channel names followed by numeric sample rows, trials back to back
/// without markers.
///
/// # File Creation Workflow
///
/// 1. Create writer with `RecordingWriter::create()` (parent directories are created)
/// 2. Append rows with `write_row()` or whole trials with `write_trial()`
/// 3. Call `finalize()` to flush
///
/// # Examples
///
/// ```rust
/// use eegtrials::{RecordingWriter, Task};
///
/// let mut writer = RecordingWriter::create("writer_doc/EEGdata.csv", &["C3", "CZ", "C4"])?;
///
/// // Two MI trials of constant data
/// for trial in 0..2 {
///     writer.write_trial(Task::MotorImagery, |_| vec![trial as f64; 3])?;
/// }
/// assert_eq!(writer.finalize()?, 4500);
///
/// # std::fs::remove_dir_all("writer_doc").ok();
/// # Ok::<(), eegtrials::EegError>(())
/// ```
pub struct RecordingWriter {
    writer: Writer<BufWriter<File>>,
    path: PathBuf,
    n_columns: usize,
    rows_written: usize,
}

impl RecordingWriter {
    /// Creates (or truncates) a recording and writes its header row
    ///
    /// # Errors
    ///
    /// * `EegError::InvalidArgument` - `columns` is empty
    /// * `EegError::Io` - The file or its parent directories cannot be created
    pub fn create<P: AsRef<Path>, S: AsRef<str>>(path: P, columns: &[S]) -> Result<Self> {
        let path = path.as_ref();
        if columns.is_empty() {
            return Err(EegError::InvalidArgument(
                "A recording needs at least one column".to_string(),
            ));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;

        let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));
        writer.write_record(columns.iter().map(|c| c.as_ref()))?;

        Ok(RecordingWriter {
            writer,
            path: path.to_path_buf(),
            n_columns: columns.len(),
            rows_written: 0,
        })
    }

    /// Creates the recording that holds `descriptor`'s session below `base_path`
    pub fn create_for<P: AsRef<Path>, S: AsRef<str>>(
        base_path: P,
        descriptor: &TrialDescriptor,
        columns: &[S],
    ) -> Result<Self> {
        let path = crate::TrialLocator::new(base_path).eeg_path(descriptor);
        Self::create(path, columns)
    }

    /// Appends one sample row
    ///
    /// # Errors
    ///
    /// * `EegError::InvalidArgument` - The row width differs from the header
    pub fn write_row(&mut self, row: &[f64]) -> Result<()> {
        if row.len() != self.n_columns {
            return Err(EegError::InvalidArgument(format!(
                "Row has {} values, recording has {} columns",
                row.len(),
                self.n_columns
            )));
        }

        // NaN 写成空单元格，与读取端保持一致
        self.writer.write_record(row.iter().map(|v| {
            if v.is_nan() {
                String::new()
            } else {
                v.to_string()
            }
        }))?;
        self.rows_written += 1;
        Ok(())
    }

    /// Appends one full trial of `task`
    ///
    /// `sample` is called with the sample index inside the trial and returns
    /// that row.
    pub fn write_trial<F>(&mut self, task: Task, mut sample: F) -> Result<()>
    where
        F: FnMut(usize) -> Vec<f64>,
    {
        for i in 0..task.samples_per_trial() {
            let row = sample(i);
            self.write_row(&row)?;
        }
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes the recording and returns the number of sample rows written
    pub fn finalize(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.rows_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rejects_empty_header() {
        let dir = TempDir::new().unwrap();
        let columns: [&str; 0] = [];
        let result = RecordingWriter::create(dir.path().join("EEGdata.csv"), &columns);
        assert!(matches!(result, Err(EegError::InvalidArgument(_))));
    }

    #[test]
    fn test_row_width_checked() {
        let dir = TempDir::new().unwrap();
        let mut writer = RecordingWriter::create(dir.path().join("a/b/EEGdata.csv"), &["C3", "C4"]).unwrap();
        assert!(writer.write_row(&[1.0, 2.0]).is_ok());
        assert!(matches!(writer.write_row(&[1.0]), Err(EegError::InvalidArgument(_))));
        assert_eq!(writer.finalize().unwrap(), 1);

        let text = fs::read_to_string(dir.path().join("a/b/EEGdata.csv")).unwrap();
        assert_eq!(text, "C3,C4\n1,2\n");
    }

    #[test]
    fn test_nan_written_as_empty_cell() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("EEGdata.csv");
        let mut writer = RecordingWriter::create(&path, &["C3", "C4"]).unwrap();
        writer.write_row(&[f64::NAN, 0.5]).unwrap();
        writer.finalize().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "C3,C4\n,0.5\n");
    }
}
