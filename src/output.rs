//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and formatted tables.

use crate::duplicates::DuplicateReport;
use crate::file_metadata::{PreviewEntry, format_size};
use crate::journal::Batch;
use chrono::Local;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for operations
/// - Summary tables
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidysort::output::OutputFormatter;
    /// OutputFormatter::success("Processed: 12 files");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar whose length is set by the first progress event.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidysort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar("Scanning");
    /// let mut on_progress = OutputFormatter::progress_callback(&pb);
    /// on_progress(1, 10);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(message: &'static str) -> ProgressBar {
        let pb = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb.set_message(message);
        pb
    }

    /// Adapts a progress bar to the engine's `(completed, total)` callback.
    pub fn progress_callback(pb: &ProgressBar) -> impl FnMut(usize, usize) + '_ {
        move |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        }
    }

    /// Prints the scanned files as a table.
    pub fn preview_table(entries: &[PreviewEntry]) {
        Self::header("PREVIEW");

        let name_width = entries
            .iter()
            .map(|e| e.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(4);

        println!(
            "{:<width$} | {:>10} | {:<10} | {}",
            "Name".bold(),
            "Size".bold(),
            "Modified".bold(),
            "Size class".bold(),
            width = name_width
        );
        println!("{}", "-".repeat(name_width + 50));

        for entry in entries {
            // ISO timestamps start with the date.
            let date = entry.modified.get(..10).unwrap_or(&entry.modified);
            println!(
                "{:<width$} | {:>10} | {:<10} | {}",
                entry.name,
                entry.size,
                date,
                entry.size_bucket,
                width = name_width
            );
        }
    }

    /// Prints a summary table with file counts per destination folder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidysort::output::OutputFormatter;
    /// use std::collections::HashMap;
    ///
    /// let mut counts = HashMap::new();
    /// counts.insert("pdf".to_string(), 15);
    /// counts.insert("jpg".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(folder_counts: &HashMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let mut folders: Vec<_> = folder_counts.iter().collect();
        folders.sort_by_key(|&(name, _)| name);

        let max_folder_len = folders
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(6);

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_folder_len
        );
        println!("{}", "-".repeat(max_folder_len + 10));

        for (folder, count) in &folders {
            let file_word = if **count == 1 { "file" } else { "files" };
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                file_word,
                width = max_folder_len
            );
        }

        println!("{}", "-".repeat(max_folder_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            if total_files == 1 { "file" } else { "files" },
            width = max_folder_len
        );
    }

    /// Prints each duplicate group with its original and copies.
    pub fn duplicate_groups(report: &DuplicateReport) {
        for group in &report.groups {
            Self::header(&format!(
                "{} ({} each)",
                group.hash,
                format_size(group.size)
            ));
            println!("  {} {}", "original".green(), group.original().path.display());
            for dupe in group.duplicates() {
                println!("  {} {}", "duplicate".yellow(), dupe.path.display());
            }
        }

        if !report.groups.is_empty() {
            println!(
                "\n{} {}",
                "Reclaimable space:".bold(),
                format_size(report.wasted_space())
            );
        }
    }

    /// Prints journal batches, newest first.
    pub fn history(batches: &[&Batch]) {
        Self::header("HISTORY");
        for batch in batches {
            let when = batch.timestamp().with_timezone(&Local);
            println!(
                "{}  {:<4}  {} {}",
                when.format("%Y-%m-%d %H:%M:%S"),
                batch.kind().to_string().cyan(),
                batch.operations().len(),
                if batch.operations().len() == 1 { "file" } else { "files" }
            );
        }
    }

    /// Prints a preview-mode notice.
    pub fn preview_notice(message: &str) {
        println!("{}", format!("[PREVIEW] {}", message).yellow());
    }
}
