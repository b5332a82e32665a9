//! # eegtrials
//!
//! Locate and slice fixed-length EEG trials out of per-subject CSV recordings.
//!
//! A dataset is a directory holding three metadata tables (`train.csv`,
//! `validation.csv`, `test.csv`) and one recording per session:
//!
//! ```text
//! {base}/{task}/{partition}/{subject_id}/{trial_session}/EEGdata.csv
//! ```
//!
//! Every session file holds all of its trials back to back, sampled at
//! 250 Hz, with no boundary markers. Motor imagery (`MI`) trials are 9 s
//! (2250 rows) long, `SSVEP` trials 7 s (1750 rows). The partition of a trial
//! is derived from its id alone: ids up to 4800 are training trials, ids up
//! to 4900 validation trials, everything above is test data.
//!
//! ## Quick Start
//!
//! ### Loading the first training trial
//!
//! ```rust
//! use eegtrials::{DatasetMetadata, Partition, TrialLocator, Result};
//!
//! fn main() -> Result<()> {
//!     # let base = "lib_doc_dataset";
//!     # eegtrials::doctest_utils::create_simple_dataset(base)?;
//!     // Metadata tables are explicit values, loaded once
//!     let metadata = DatasetMetadata::load(base)?;
//!     let first = metadata.table(Partition::Train).get(0).expect("empty table");
//!
//!     let locator = TrialLocator::new(base);
//!     let trial = locator.locate(first)?;
//!
//!     println!("{}", first);
//!     if let Some(label) = first.label() {
//!         println!("Label: {}", label);
//!     }
//!     println!("Data shape: {:?}", trial.shape());
//!     assert_eq!(trial.len(), 2250);
//!
//!     # std::fs::remove_dir_all(base).ok();
//!     Ok(())
//! }
//! ```
//!
//! ### Building a descriptor by hand
//!
//! ```rust
//! use eegtrials::{locate_trial, EegError, Partition, Task, TrialDescriptor};
//!
//! let d = TrialDescriptor::new(4850, Task::Ssvep, "S30", "2", 3)?;
//! assert_eq!(d.partition(), Partition::Validation);
//!
//! let range = d.row_range()?;
//! assert_eq!((range.start, range.end), (3500, 5249));
//!
//! // Nothing on disk here, so the lookup reports the missing recording
//! match locate_trial(&d, "no_such_dataset") {
//!     Err(EegError::NotFound(path)) => println!("missing: {}", path),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! # Ok::<(), EegError>(())
//! ```
//!
//! ### Tolerating a truncated final trial
//!
//! By default a trial that runs past the end of its recording is an
//! `EegError::OutOfRange`. Set [`LocatorConfig::allow_short_trial`] to get the
//! available rows instead:
//!
//! ```rust
//! use eegtrials::{LocatorConfig, TrialLocator};
//!
//! let locator = TrialLocator::with_config("data", LocatorConfig {
//!     allow_short_trial: true,
//!     ..LocatorConfig::default()
//! });
//! # let _ = locator;
//! ```

pub mod config;
pub mod error;
pub mod metadata;
pub mod reader;
pub mod types;
pub mod utils;
pub mod writer;

#[doc(hidden)]
pub mod doctest_utils; // For internal doctest support

// Re-export main types for convenience
pub use config::LocatorConfig;
pub use error::{EegError, Result};
pub use metadata::{DatasetMetadata, MetadataTable};
pub use reader::{locate_trial, TrialLocator};
pub use types::{Partition, RowRange, Task, TrialDescriptor, TrialSlice};
pub use writer::RecordingWriter;

// Important constants
pub const SAMPLING_RATE_HZ: f64 = 250.0;
pub const MI_SAMPLES_PER_TRIAL: usize = 2250; // 9 s * 250 Hz
pub const SSVEP_SAMPLES_PER_TRIAL: usize = 1750; // 7 s * 250 Hz
pub const TRAIN_MAX_ID: u64 = 4800;
pub const VALIDATION_MAX_ID: u64 = 4900;
pub const EEG_FILE_NAME: &str = "EEGdata.csv";

/// Library version
///
/// Returns the current version of the eegtrials library.
///
/// # Examples
///
/// ```rust
/// let version = eegtrials::version();
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
