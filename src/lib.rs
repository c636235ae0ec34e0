//! tidysort - sort files into rule-based folders
//!
//! This library scans a directory, keeps the files that pass a set of filter
//! rules and copies or moves them into destination folders chosen by
//! extension, modification month or size class. It can also report files with
//! identical content and undo the most recent move using a persisted journal.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod engine;
pub mod error;
pub mod file_category;
pub mod file_metadata;
pub mod file_organizer;
pub mod hasher;
pub mod journal;
pub mod logging;
pub mod output;
pub mod rule_filter;

pub use config::{
    ClassifyMode, ConfigError, ConfigFile, FilterConfig, OperationKind, OrganizerConfig,
    OrganizerConfigBuilder,
};
pub use duplicates::{DuplicateGroup, DuplicateReport};
pub use engine::{ExecuteReport, OperationOutcome, OrganizerEngine, resolve_destination_folder};
pub use error::{OrganizeError, OrganizeResult};
pub use file_category::Category;
pub use file_metadata::{FileMetadata, PreviewEntry, SizeBucket};
pub use file_organizer::{FileOrganizer, PlacementError};
pub use hasher::ContentHash;
pub use journal::{OperationJournal, UndoReport};

pub use cli::{Cli, OrganizeCommand, run_cli};
