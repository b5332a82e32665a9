use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::error::{EegError, Result};
use crate::types::{Partition, Task, TrialDescriptor};
use crate::utils::{open_existing, parse_index};

/// Raw metadata row as it appears in the CSV table
///
/// Every cell is read as text first; [`TrialDescriptor::new`] does the
/// validation. Columns other than these are ignored.
#[derive(Debug, Deserialize)]
struct MetadataRow {
    id: String,
    task: String,
    subject_id: String,
    trial_session: String,
    trial: String,
    #[serde(default)]
    label: Option<String>,
}

impl MetadataRow {
    fn into_descriptor(self) -> Result<TrialDescriptor> {
        let id = parse_index("id", &self.id)?;
        let task: Task = self.task.parse()?;
        let trial = parse_index("trial", &self.trial)?;
        let trial = u32::try_from(trial)
            .map_err(|_| EegError::InvalidFormat(format!("trial: {} is too large", trial)))?;

        let descriptor = TrialDescriptor::new(id, task, self.subject_id, self.trial_session, trial)?;
        Ok(match self.label.filter(|l| !l.trim().is_empty()) {
            Some(label) => descriptor.with_label(label.trim()),
            None => descriptor,
        })
    }
}

/// One metadata table (`train.csv`, `validation.csv` or `test.csv`)
///
/// Rows keep the order of the file. The table owns validated
/// [`TrialDescriptor`]s; nothing in it refers back to the CSV text.
///
/// # Examples
///
/// ```rust
/// use eegtrials::{MetadataTable, Task, TrialDescriptor};
///
/// let table = MetadataTable::from_descriptors(vec![
///     TrialDescriptor::new(1, Task::MotorImagery, "S01", "1", 1)?.with_label("Left"),
///     TrialDescriptor::new(2, Task::MotorImagery, "S01", "1", 2)?.with_label("Right"),
/// ]);
///
/// # let path = "metadata_doc_train.csv";
/// table.write(path)?;
/// let loaded = MetadataTable::load(path)?;
/// assert_eq!(loaded.len(), 2);
/// assert_eq!(loaded.find_by_id(2).and_then(|d| d.label()), Some("Right"));
/// # std::fs::remove_file(path).ok();
/// # Ok::<(), eegtrials::EegError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    rows: Vec<TrialDescriptor>,
}

impl MetadataTable {
    pub fn from_descriptors(rows: Vec<TrialDescriptor>) -> Self {
        MetadataTable { rows }
    }

    /// Reads a metadata table from a CSV file with a header row
    ///
    /// Required columns: `id`, `task`, `subject_id`, `trial_session`, `trial`.
    /// `label` is optional; an empty label cell reads as no label.
    ///
    /// # Errors
    ///
    /// * `EegError::NotFound` - The file does not exist
    /// * `EegError::InvalidFormat` - A row is missing a column or holds a cell
    ///   that does not parse (e.g. a non-numeric `id`)
    /// * `EegError::InvalidArgument` - A row parses but is not a valid trial:
    ///   unknown task, `id` or `trial` of zero, unusable subject/session name
    /// * `EegError::Csv` / `EegError::Io` - The file could not be read
    ///
    /// `InvalidFormat` and `InvalidArgument` messages name the file and the
    /// 1-based data row.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = open_existing(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let mut rows = Vec::new();
        for (i, result) in reader.deserialize::<MetadataRow>().enumerate() {
            let descriptor = result
                .map_err(|e| EegError::InvalidFormat(e.to_string()))
                .and_then(MetadataRow::into_descriptor)
                .map_err(|e| at_row(path, i + 1, e))?;
            rows.push(descriptor);
        }

        debug!(path = %path.display(), rows = rows.len(), "loaded metadata table");
        Ok(MetadataTable { rows })
    }

    /// Writes the table in the layout [`MetadataTable::load`] reads
    ///
    /// The `label` column is only written when at least one row has a label.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let with_labels = self.has_labels();
        let mut writer = WriterBuilder::new().from_path(path)?;

        let mut header = vec!["id", "task", "subject_id", "trial_session", "trial"];
        if with_labels {
            header.push("label");
        }
        writer.write_record(&header)?;

        for d in &self.rows {
            let mut record = vec![
                d.id().to_string(),
                d.task().to_string(),
                d.subject_id().to_string(),
                d.trial_session().to_string(),
                d.trial().to_string(),
            ];
            if with_labels {
                record.push(d.label().unwrap_or_default().to_string());
            }
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at position `index` in file order
    pub fn get(&self, index: usize) -> Option<&TrialDescriptor> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrialDescriptor> {
        self.rows.iter()
    }

    pub fn find_by_id(&self, id: u64) -> Option<&TrialDescriptor> {
        self.rows.iter().find(|d| d.id() == id)
    }

    /// `true` when any row carries a label (train and validation tables)
    pub fn has_labels(&self) -> bool {
        self.rows.iter().any(|d| d.label().is_some())
    }
}

impl<'a> IntoIterator for &'a MetadataTable {
    type Item = &'a TrialDescriptor;
    type IntoIter = std::slice::Iter<'a, TrialDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// The three metadata tables of a dataset
///
/// Loaded once and handed to whoever needs them; there is no process-wide
/// copy.
#[derive(Debug, Clone, Default)]
pub struct DatasetMetadata {
    root: PathBuf,
    train: MetadataTable,
    validation: MetadataTable,
    test: MetadataTable,
}

impl DatasetMetadata {
    /// Loads `train.csv`, `validation.csv` and `test.csv` from `base_path`
    ///
    /// # Errors
    ///
    /// Fails with the first error of [`MetadataTable::load`]; all three
    /// tables must exist.
    pub fn load<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let root = base_path.as_ref().to_path_buf();
        let load = |p: Partition| MetadataTable::load(root.join(p.metadata_file_name()));

        Ok(DatasetMetadata {
            train: load(Partition::Train)?,
            validation: load(Partition::Validation)?,
            test: load(Partition::Test)?,
            root,
        })
    }

    /// Directory the tables were loaded from
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table(&self, partition: Partition) -> &MetadataTable {
        match partition {
            Partition::Train => &self.train,
            Partition::Validation => &self.validation,
            Partition::Test => &self.test,
        }
    }

    /// Total number of rows over all three tables
    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks an id up in the table its id range belongs to
    pub fn find_by_id(&self, id: u64) -> Option<&TrialDescriptor> {
        self.table(Partition::from_id(id)).find_by_id(id)
    }
}

/// Prefixes a row failure with its file and 1-based data row, keeping the kind
fn at_row(path: &Path, row: usize, err: EegError) -> EegError {
    let place = |msg: String| format!("{} row {}: {}", path.display(), row, msg);
    match err {
        EegError::InvalidArgument(msg) => EegError::InvalidArgument(place(msg)),
        EegError::InvalidFormat(msg) => EegError::InvalidFormat(place(msg)),
        other => other,
    }
}
