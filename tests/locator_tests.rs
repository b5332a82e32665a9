use eegtrials::doctest_utils::{create_simple_dataset, sample_value, write_session, CHANNELS};
use eegtrials::{
    locate_trial, EegError, LocatorConfig, Partition, RecordingWriter, Task, TrialDescriptor,
    TrialLocator,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// 创建测试数据集的辅助函数
fn dataset() -> TempDir {
    let dir = TempDir::new().unwrap();
    create_simple_dataset(dir.path()).unwrap();
    dir
}

// 检查切片中的每一行都来自期望的源行
fn assert_rows_match_source(rows: &[Vec<f64>], first_row: usize) {
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), CHANNELS.len());
        for (ch, value) in row.iter().enumerate() {
            assert_eq!(*value, sample_value(first_row + i, ch), "row {} channel {}", i, ch);
        }
    }
}

#[test]
fn test_first_mi_trial() {
    let dir = dataset();
    let d = TrialDescriptor::new(1, Task::MotorImagery, "S01", "1", 1).unwrap();

    let slice = locate_trial(&d, dir.path()).unwrap();

    assert_eq!(slice.len(), 2250);
    assert_eq!(slice.shape(), (2250, CHANNELS.len()));
    assert_eq!((slice.range().start, slice.range().end), (0, 2249));
    assert_eq!(
        slice.source(),
        dir.path().join("MI").join("train").join("S01").join("1").join("EEGdata.csv")
    );
    assert_eq!(slice.columns()[0], "Time");
    assert_rows_match_source(slice.rows(), 0);
    assert!(!slice.is_truncated());
}

#[test]
fn test_validation_ssvep_trial() {
    let dir = dataset();
    let d = TrialDescriptor::new(4850, Task::Ssvep, "S30", "2", 3).unwrap();
    assert_eq!(d.partition(), Partition::Validation);

    let slice = TrialLocator::new(dir.path()).locate(&d).unwrap();

    assert_eq!(slice.len(), 1750);
    assert_eq!((slice.range().start, slice.range().end), (3500, 5249));
    let time = slice.column("Time").unwrap();
    assert_eq!(time.first().copied(), Some(3500.0));
    assert_eq!(time.last().copied(), Some(5249.0));
    assert_rows_match_source(slice.rows(), 3500);
}

#[test]
fn test_consecutive_trials_are_contiguous() {
    let dir = dataset();
    let locator = TrialLocator::new(dir.path());

    let slices: Vec<_> = (1..=3)
        .map(|trial| {
            let d = TrialDescriptor::new(trial as u64, Task::MotorImagery, "S01", "1", trial).unwrap();
            locator.locate(&d).unwrap()
        })
        .collect();

    for pair in slices.windows(2) {
        assert_eq!(pair[1].range().start, pair[0].range().end + 1);
        let last_of_first = pair[0].column("Time").unwrap()[2249];
        let first_of_second = pair[1].column("Time").unwrap()[0];
        assert_eq!(first_of_second, last_of_first + 1.0);
    }
}

#[test]
fn test_locate_is_idempotent() {
    let dir = dataset();
    let locator = TrialLocator::new(dir.path());
    let d = TrialDescriptor::new(2, Task::MotorImagery, "S01", "1", 2).unwrap();

    let a = locator.locate(&d).unwrap();
    let b = locator.locate(&d).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_missing_recording_is_not_found() {
    let dir = dataset();
    let d = TrialDescriptor::new(7, Task::MotorImagery, "S99", "1", 1).unwrap();

    match locate_trial(&d, dir.path()) {
        Err(EegError::NotFound(msg)) => assert!(msg.contains("S99")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_trial_past_end_is_out_of_range() {
    let dir = dataset();
    // The S01 session holds three MI trials
    let d = TrialDescriptor::new(4, Task::MotorImagery, "S01", "1", 4).unwrap();

    match locate_trial(&d, dir.path()) {
        Err(EegError::OutOfRange { start, end, available, .. }) => {
            assert_eq!(start, 6750);
            assert_eq!(end, 8999);
            assert_eq!(available, 6750);
        }
        other => panic!("expected OutOfRange, got {:?}", other),
    }
}

fn write_short_session(base: &Path, rows: usize) -> TrialDescriptor {
    let d = TrialDescriptor::new(9, Task::MotorImagery, "S02", "1", 2).unwrap();
    let mut writer = RecordingWriter::create_for(base, &d, &CHANNELS).unwrap();
    for row in 0..rows {
        let values: Vec<f64> = (0..CHANNELS.len()).map(|ch| sample_value(row, ch)).collect();
        writer.write_row(&values).unwrap();
    }
    writer.finalize().unwrap();
    d
}

#[test]
fn test_short_final_trial() {
    let dir = TempDir::new().unwrap();
    // Second trial would need rows 2250..=4499, only 3000 rows exist
    let d = write_short_session(dir.path(), 3000);

    let strict = TrialLocator::new(dir.path());
    assert!(matches!(
        strict.locate(&d),
        Err(EegError::OutOfRange { available: 3000, .. })
    ));

    let tolerant = TrialLocator::with_config(
        dir.path(),
        LocatorConfig {
            allow_short_trial: true,
            ..LocatorConfig::default()
        },
    );
    let slice = tolerant.locate(&d).unwrap();
    assert_eq!(slice.len(), 750);
    assert!(slice.is_truncated());
    assert_eq!(slice.range().len(), 2250);
    assert_rows_match_source(slice.rows(), 2250);
}

#[test]
fn test_trial_starting_past_end_fails_even_when_tolerant() {
    let dir = TempDir::new().unwrap();
    let d = write_short_session(dir.path(), 2250);

    let tolerant = TrialLocator::with_config(
        dir.path(),
        LocatorConfig {
            allow_short_trial: true,
            ..LocatorConfig::default()
        },
    );
    assert!(matches!(tolerant.locate(&d), Err(EegError::OutOfRange { .. })));
}

#[test]
fn test_non_numeric_cell_inside_trial() {
    let dir = TempDir::new().unwrap();
    let d = TrialDescriptor::new(1, Task::Ssvep, "S05", "1", 1).unwrap();
    let path = TrialLocator::new(dir.path()).eeg_path(&d);
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    let mut text = String::from("Time,C3\n");
    for row in 0..1750 {
        if row == 10 {
            text.push_str("10,oops\n");
        } else {
            text.push_str(&format!("{},0.5\n", row));
        }
    }
    fs::write(&path, text).unwrap();

    match locate_trial(&d, dir.path()) {
        Err(EegError::InvalidFormat(msg)) => assert!(msg.contains("Row 10")),
        other => panic!("expected InvalidFormat, got {:?}", other),
    }
}

#[test]
fn test_malformed_rows_outside_trial_are_skipped() {
    let dir = TempDir::new().unwrap();
    let d = TrialDescriptor::new(1, Task::Ssvep, "S05", "1", 2).unwrap();
    let path = TrialLocator::new(dir.path()).eeg_path(&d);
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    // Garbage in trial 1 does not affect trial 2; empty cells read as NaN
    let mut text = String::from("Time,C3\n");
    for row in 0..3500 {
        match row {
            5 => text.push_str("5,oops\n"),
            1800 => text.push_str("1800,\n"),
            _ => text.push_str(&format!("{},1.0\n", row)),
        }
    }
    fs::write(&path, text).unwrap();

    let slice = locate_trial(&d, dir.path()).unwrap();
    assert_eq!(slice.len(), 1750);
    assert!(slice.rows()[50][1].is_nan());
    assert_eq!(slice.rows()[51][1], 1.0);
}

#[test]
fn test_slice_timing() {
    let dir = dataset();
    let d = TrialDescriptor::new(4849, Task::Ssvep, "S30", "2", 2).unwrap();
    let slice = locate_trial(&d, dir.path()).unwrap();

    assert_eq!(slice.onset().num_milliseconds(), 7_000);
    assert_eq!(slice.duration().num_milliseconds(), 7_000);
}

#[test]
fn test_locator_shared_between_threads() {
    let dir = dataset();
    write_session(
        dir.path(),
        &TrialDescriptor::new(10, Task::MotorImagery, "S03", "1", 1).unwrap(),
        2,
    )
    .unwrap();
    let locator = TrialLocator::new(dir.path());

    let lengths: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = (1..=2)
            .map(|trial| {
                let locator = &locator;
                s.spawn(move || {
                    let d = TrialDescriptor::new(10 + trial as u64, Task::MotorImagery, "S03", "1", trial)
                        .unwrap();
                    locator.locate(&d).unwrap().len()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(lengths, vec![2250, 2250]);
}
