//! Command-line interface module for tidysort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing with clap
//! - Layering command-line flags over the configuration file
//! - Driving the engine with progress bars
//! - Rendering reports

use crate::config::{ClassifyMode, ConfigFile, OperationKind, OrganizerConfig};
use crate::engine::{OperationOutcome, OrganizerEngine};
use crate::file_category::Category;
use crate::journal::{JournalLoad, OperationJournal};
use crate::output::OutputFormatter;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Sort files into rule-based folders, find duplicates and undo moves.
#[derive(Debug, Parser)]
#[command(name = "tidysort", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: OrganizeCommand,

    /// Configuration file. Defaults to `.tidysortrc.toml`, then the user config directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// History file used for undo. Defaults to `~/.tidysort_history.json`
    #[arg(long, global = true, value_name = "FILE")]
    pub journal: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Represents a CLI command to execute.
#[derive(Debug, Subcommand)]
pub enum OrganizeCommand {
    /// List the files that match the filters without touching them
    Preview {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Print the preview as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy or move matching files into destination folders
    Organize {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        placement: PlacementArgs,
    },
    /// Report files with identical content
    Duplicates {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Move the files of the last move operation back
    Undo,
    /// Show recorded operations, newest first
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
}

/// Which files a command works on.
#[derive(Debug, Clone, Args)]
pub struct SelectionArgs {
    /// Directory to scan
    pub source: PathBuf,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Only include these extensions (repeatable or comma-separated)
    #[arg(short, long = "ext", value_name = "EXT", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Add every extension of a category preset (repeatable or comma-separated)
    #[arg(long = "category", value_enum, value_name = "CATEGORY", value_delimiter = ',')]
    pub categories: Vec<Category>,

    /// Only include names containing this text (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub name_contains: Option<String>,

    /// Skip names containing this text (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub name_excludes: Option<String>,

    /// Minimum file size in bytes
    #[arg(long, value_name = "BYTES")]
    pub min_size: Option<u64>,

    /// Maximum file size in bytes
    #[arg(long, value_name = "BYTES")]
    pub max_size: Option<u64>,
}

/// Where and how matching files are placed.
#[derive(Debug, Clone, Args)]
pub struct PlacementArgs {
    /// Destination root directory
    #[arg(short, long = "dest", value_name = "DIR")]
    pub destination: PathBuf,

    /// Move files instead of copying them
    #[arg(short, long = "move", conflicts_with = "copy")]
    pub move_files: bool,

    /// Copy files (the default unless the configuration says otherwise)
    #[arg(long)]
    pub copy: bool,

    /// How destination folders are chosen
    #[arg(short = 'b', long = "by", value_enum, value_name = "MODE")]
    pub classify: Option<ClassifyMode>,

    /// Send one extension to a fixed folder, e.g. `pdf=Documents`
    #[arg(long = "map", value_name = "EXT=FOLDER", value_parser = parse_mapping)]
    pub overrides: Vec<(String, String)>,
}

/// Runs the CLI application with the parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use tidysort::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["tidysort", "preview", "/path/to/downloads"]);
/// match run_cli(cli) {
///     Ok(()) => println!("Operation completed successfully"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: Cli) -> Result<(), String> {
    let journal = match &cli.journal {
        Some(path) => OperationJournal::open(path),
        None => OperationJournal::open_default(),
    };
    if let JournalLoad::Reset(reason) = journal.load_status() {
        OutputFormatter::warning(&format!("History was unreadable and has been reset: {}", reason));
    }

    let mut engine = OrganizerEngine::new(journal);
    let config_path = cli.config.as_deref();

    match &cli.command {
        OrganizeCommand::Preview { selection, json } => {
            let config = build_config(config_path, selection, None)?;
            preview(&mut engine, &config, *json)
        }
        OrganizeCommand::Organize {
            selection,
            placement,
        } => {
            let config = build_config(config_path, selection, Some(placement))?;
            organize(&mut engine, &config)
        }
        OrganizeCommand::Duplicates { selection } => {
            let config = build_config(config_path, selection, None)?;
            duplicates(&mut engine, &config)
        }
        OrganizeCommand::Undo => undo(&mut engine),
        OrganizeCommand::History { count } => {
            history(&engine, *count);
            Ok(())
        }
    }
}

/// Loads the configuration file and applies command-line flags on top.
///
/// Flags that were not given leave the file's value in place.
pub fn build_config(
    config_path: Option<&Path>,
    selection: &SelectionArgs,
    placement: Option<&PlacementArgs>,
) -> Result<OrganizerConfig, String> {
    let file = ConfigFile::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;

    let mut builder = file.into_builder().source(selection.source.clone());

    if selection.recursive {
        builder = builder.recursive(true);
    }
    if !selection.extensions.is_empty() {
        builder = builder.extensions(&selection.extensions);
    }
    builder = builder.categories(selection.categories.iter().copied());
    if let Some(pattern) = &selection.name_contains {
        builder = builder.name_contains(pattern);
    }
    if let Some(pattern) = &selection.name_excludes {
        builder = builder.name_excludes(pattern);
    }
    if let Some(min) = selection.min_size {
        builder = builder.min_size(min);
    }
    if selection.max_size.is_some() {
        builder = builder.max_size(selection.max_size);
    }

    if let Some(placement) = placement {
        builder = builder.destination(placement.destination.clone());
        if placement.move_files {
            builder = builder.operation(OperationKind::Move);
        } else if placement.copy {
            builder = builder.operation(OperationKind::Copy);
        }
        if let Some(mode) = placement.classify {
            builder = builder.classify(mode);
        }
        for (ext, folder) in &placement.overrides {
            builder = builder.destination_override(ext, folder);
        }
    }

    Ok(builder.build())
}

fn preview(
    engine: &mut OrganizerEngine,
    config: &OrganizerConfig,
    json: bool,
) -> Result<(), String> {
    let pb = OutputFormatter::create_progress_bar("Scanning");
    let scanned = engine
        .scan(config, OutputFormatter::progress_callback(&pb))
        .map(|files| files.len());
    pb.finish_and_clear();
    let count = scanned.map_err(|e| e.to_string())?;

    let entries = engine.preview();
    if json {
        let rendered = serde_json::to_string_pretty(&entries)
            .map_err(|e| format!("Error rendering preview: {}", e))?;
        OutputFormatter::plain(&rendered);
        return Ok(());
    }

    if entries.is_empty() {
        OutputFormatter::warning("No files match the current filters.");
        return Ok(());
    }

    OutputFormatter::preview_table(&entries);
    OutputFormatter::preview_notice(&format!(
        "{} {} selected. No files were modified.",
        count,
        if count == 1 { "file" } else { "files" }
    ));
    Ok(())
}

fn organize(engine: &mut OrganizerEngine, config: &OrganizerConfig) -> Result<(), String> {
    if let (Some(source), Some(destination)) = (config.source(), config.destination()) {
        OutputFormatter::info(&format!(
            "Organizing {} into {} ({})",
            source.display(),
            destination.display(),
            config.operation()
        ));
    }

    let pb = OutputFormatter::create_progress_bar("Organizing");
    let result = engine.execute(config, OutputFormatter::progress_callback(&pb));
    pb.finish_and_clear();

    if let Ok(report) = &result {
        for (path, reason) in &report.errors {
            OutputFormatter::error(&format!("{}: {}", path.display(), reason));
        }
        if report.any_succeeded() {
            OutputFormatter::summary_table(&report.folder_counts(), report.placed.len());
        }
        if let Some(e) = &report.journal_error {
            OutputFormatter::warning(&format!(
                "Could not save history, undo is unavailable: {}",
                e
            ));
        } else if report.kind == OperationKind::Move && report.any_succeeded() {
            OutputFormatter::info("History saved. Use 'tidysort undo' to revert the move.");
        }
    }

    conclude(result.into())
}

fn duplicates(engine: &mut OrganizerEngine, config: &OrganizerConfig) -> Result<(), String> {
    let pb = OutputFormatter::create_progress_bar("Hashing");
    let result = engine.find_duplicates(config, OutputFormatter::progress_callback(&pb));
    pb.finish_and_clear();

    if let Ok(report) = &result {
        OutputFormatter::duplicate_groups(report);
    }

    conclude(result.into())
}

fn undo(engine: &mut OrganizerEngine) -> Result<(), String> {
    let pb = OutputFormatter::create_progress_bar("Restoring");
    let result = engine.undo(OutputFormatter::progress_callback(&pb));
    pb.finish_and_clear();

    if let Ok(report) = &result {
        for (path, reason) in &report.failed {
            OutputFormatter::error(&format!("{}: {}", path.display(), reason));
        }
        if !report.is_complete_success() {
            OutputFormatter::warning("Some files could not be restored and were left in place.");
        }
        if let Some(e) = &report.journal_error {
            OutputFormatter::warning(&format!("Could not save history after undo: {}", e));
        }
    }

    conclude(result.into())
}

fn history(engine: &OrganizerEngine, count: usize) {
    let batches = engine.history(count);
    if batches.is_empty() {
        OutputFormatter::info("No operations recorded.");
        return;
    }
    OutputFormatter::history(&batches);
}

fn conclude(outcome: OperationOutcome) -> Result<(), String> {
    if outcome.success {
        OutputFormatter::success(&outcome.message);
        Ok(())
    } else {
        Err(outcome.message)
    }
}

/// Parses an `ext=folder` mapping.
fn parse_mapping(value: &str) -> Result<(String, String), String> {
    let (ext, folder) = value
        .split_once('=')
        .ok_or_else(|| format!("expected EXT=FOLDER, got '{}'", value))?;

    let (ext, folder) = (ext.trim(), folder.trim());
    if ext.is_empty() || folder.is_empty() {
        return Err(format!("expected EXT=FOLDER, got '{}'", value));
    }
    Ok((ext.to_string(), folder.to_string()))
}
