// Internal utilities for documentation tests
// This file contains helper functions to generate small datasets for doctests

use crate::{MetadataTable, RecordingWriter, Result, Task, TrialDescriptor};
use std::path::Path;

/// Channel layout of the generated recordings
pub const CHANNELS: [&str; 9] = ["Time", "FZ", "C3", "CZ", "C4", "PZ", "PO7", "OZ", "PO8"];

/// Sample value of `channel` at `row` of a generated recording
///
/// The `Time` column holds the row index itself, so a slice can be checked
/// against the rows it claims to come from.
pub fn sample_value(row: usize, channel: usize) -> f64 {
    if channel == 0 {
        row as f64
    } else {
        ((row + channel * 31) % 200) as f64 - 100.0
    }
}

/// Writes a recording holding `trials` back-to-back trials of `task`
pub fn write_session<P: AsRef<Path>>(base: P, descriptor: &TrialDescriptor, trials: usize) -> Result<()> {
    let mut writer = RecordingWriter::create_for(&base, descriptor, &CHANNELS)?;
    let total = trials * descriptor.task().samples_per_trial();
    for row in 0..total {
        let values: Vec<f64> = (0..CHANNELS.len()).map(|ch| sample_value(row, ch)).collect();
        writer.write_row(&values)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Creates a small dataset for documentation examples
///
/// Layout:
/// - `train.csv`: ids 1..=3, MI, subject S01 session 1, trials 1..=3
/// - `validation.csv`: ids 4849 and 4850, SSVEP, subject S30 session 2, trials 2 and 3
/// - `test.csv`: id 4901, MI, subject S40 session 1, trial 1 (no label)
///
/// with one recording per session long enough for every listed trial.
pub fn create_simple_dataset<P: AsRef<Path>>(base: P) -> Result<()> {
    let base = base.as_ref();

    let train = vec![
        TrialDescriptor::new(1, Task::MotorImagery, "S01", "1", 1)?.with_label("Left"),
        TrialDescriptor::new(2, Task::MotorImagery, "S01", "1", 2)?.with_label("Right"),
        TrialDescriptor::new(3, Task::MotorImagery, "S01", "1", 3)?.with_label("Left"),
    ];
    let validation = vec![
        TrialDescriptor::new(4849, Task::Ssvep, "S30", "2", 2)?.with_label("Backward"),
        TrialDescriptor::new(4850, Task::Ssvep, "S30", "2", 3)?.with_label("Forward"),
    ];
    let test = vec![TrialDescriptor::new(4901, Task::MotorImagery, "S40", "1", 1)?];

    write_session(base, &train[0], 3)?;
    write_session(base, &validation[0], 3)?;
    write_session(base, &test[0], 1)?;

    MetadataTable::from_descriptors(train).write(base.join("train.csv"))?;
    MetadataTable::from_descriptors(validation).write(base.join("validation.csv"))?;
    MetadataTable::from_descriptors(test).write(base.join("test.csv"))?;
    Ok(())
}
