//! Organizer configuration.
//!
//! An [`OrganizerConfig`] is an immutable value handed to every engine
//! operation. It is assembled through [`OrganizerConfigBuilder`], whose setters
//! normalise their input and never fail: a nonsensical combination (for
//! example a minimum size above the maximum) simply matches no files at scan
//! time.
//!
//! Defaults can also come from a TOML file:
//!
//! ```toml
//! [organize]
//! operation = "move"
//! classify = "date"
//! recursive = true
//!
//! [filters]
//! extensions = ["jpg", "png"]
//! categories = ["videos"]
//! name_contains = "holiday"
//! name_excludes = "draft"
//! min_size = 0
//! max_size = 104857600
//!
//! [destinations]
//! pdf = "Documents"
//! ```

use crate::file_category::Category;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".tidysortrc.toml";

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Whether files are copied or moved into the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    #[default]
    Copy,
    Move,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Copy => f.write_str("copy"),
            OperationKind::Move => f.write_str("move"),
        }
    }
}

/// How a file's destination subfolder is derived when no override applies.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ClassifyMode {
    /// One folder per extension, e.g. `pdf`.
    #[default]
    Extension,
    /// `YYYY/MM` of the last modification.
    Date,
    /// The size bucket label.
    Size,
}

/// Normalises an extension to lowercase with a leading `.`.
///
/// Returns `None` for blank input so that stray separators in user lists are
/// ignored rather than turned into a bare `.` entry.
///
/// ```
/// use tidysort::config::normalize_extension;
///
/// assert_eq!(normalize_extension("JPG"), Some(".jpg".to_string()));
/// assert_eq!(normalize_extension(".Txt"), Some(".txt".to_string()));
/// assert_eq!(normalize_extension("  "), None);
/// ```
pub fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

/// Which scanned files take part in an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    extensions: BTreeSet<String>,
    must_contain: String,
    must_not_contain: String,
    min_size: u64,
    max_size: Option<u64>,
    recursive: bool,
}

impl FilterConfig {
    /// Allowed extensions, normalised. Empty means every extension.
    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    /// Lowercased substring the file name must contain, or empty.
    pub fn must_contain(&self) -> &str {
        &self.must_contain
    }

    /// Lowercased substring the file name must not contain, or empty.
    pub fn must_not_contain(&self) -> &str {
        &self.must_not_contain
    }

    /// Inclusive lower size bound in bytes.
    pub fn min_size(&self) -> u64 {
        self.min_size
    }

    /// Inclusive upper size bound in bytes; `None` is unbounded.
    pub fn max_size(&self) -> Option<u64> {
        self.max_size
    }

    /// Whether the scan descends into subdirectories.
    pub fn recursive(&self) -> bool {
        self.recursive
    }
}

/// Where matched files end up inside the destination directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationPolicy {
    mode: ClassifyMode,
    overrides: BTreeMap<String, String>,
}

impl DestinationPolicy {
    pub fn mode(&self) -> ClassifyMode {
        self.mode
    }

    /// Folder override for a normalised extension, if one is configured.
    pub fn override_for(&self, extension: &str) -> Option<&str> {
        self.overrides.get(extension).map(String::as_str)
    }

    pub fn overrides(&self) -> &BTreeMap<String, String> {
        &self.overrides
    }
}

/// Complete, immutable configuration for one engine operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizerConfig {
    source: Option<PathBuf>,
    destination: Option<PathBuf>,
    operation: OperationKind,
    filter: FilterConfig,
    policy: DestinationPolicy,
}

impl OrganizerConfig {
    pub fn builder() -> OrganizerConfigBuilder {
        OrganizerConfigBuilder::default()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    pub fn policy(&self) -> &DestinationPolicy {
        &self.policy
    }

    /// Returns a builder seeded with this configuration.
    pub fn to_builder(&self) -> OrganizerConfigBuilder {
        OrganizerConfigBuilder {
            config: self.clone(),
        }
    }
}

/// Fluent builder for [`OrganizerConfig`].
///
/// # Examples
///
/// ```
/// use tidysort::config::{ClassifyMode, OperationKind, OrganizerConfig};
///
/// let config = OrganizerConfig::builder()
///     .source("/tmp/in")
///     .destination("/tmp/out")
///     .operation(OperationKind::Move)
///     .classify(ClassifyMode::Date)
///     .extensions(["JPG", ".png"])
///     .destination_override("pdf", "Documents")
///     .build();
///
/// assert!(config.filter().extensions().contains(".jpg"));
/// assert_eq!(config.policy().override_for(".pdf"), Some("Documents"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrganizerConfigBuilder {
    config: OrganizerConfig,
}

impl OrganizerConfigBuilder {
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.source = Some(path.into());
        self
    }

    pub fn destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.destination = Some(path.into());
        self
    }

    pub fn operation(mut self, kind: OperationKind) -> Self {
        self.config.operation = kind;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.filter.recursive = recursive;
        self
    }

    pub fn classify(mut self, mode: ClassifyMode) -> Self {
        self.config.policy.mode = mode;
        self
    }

    /// Replaces the extension allow-list. Blank entries are dropped.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.filter.extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        self
    }

    /// Adds one extension to the allow-list.
    pub fn add_extension(mut self, ext: &str) -> Self {
        if let Some(ext) = normalize_extension(ext) {
            self.config.filter.extensions.insert(ext);
        }
        self
    }

    /// Merges every extension of `category` into the allow-list.
    pub fn category(self, category: Category) -> Self {
        tracing::debug!(%category, "adding category extensions");
        category
            .extensions()
            .iter()
            .fold(self, |builder, ext| builder.add_extension(ext))
    }

    pub fn categories<I>(self, categories: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        categories
            .into_iter()
            .fold(self, |builder, category| builder.category(category))
    }

    pub fn name_contains(mut self, pattern: &str) -> Self {
        self.config.filter.must_contain = pattern.to_lowercase();
        self
    }

    pub fn name_excludes(mut self, pattern: &str) -> Self {
        self.config.filter.must_not_contain = pattern.to_lowercase();
        self
    }

    pub fn min_size(mut self, bytes: u64) -> Self {
        self.config.filter.min_size = bytes;
        self
    }

    pub fn max_size(mut self, bytes: Option<u64>) -> Self {
        self.config.filter.max_size = bytes;
        self
    }

    /// Routes every file with `ext` into `folder`, whatever the classify mode.
    pub fn destination_override(mut self, ext: &str, folder: &str) -> Self {
        let folder = folder.trim();
        if let Some(ext) = normalize_extension(ext)
            && !folder.is_empty()
        {
            self.config.policy.overrides.insert(ext, folder.to_string());
        }
        self
    }

    pub fn build(self) -> OrganizerConfig {
        self.config
    }
}

/// `[organize]` table of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizeSection {
    #[serde(default)]
    pub operation: OperationKind,
    #[serde(default)]
    pub classify: ClassifyMode,
    #[serde(default)]
    pub recursive: bool,
}

/// `[filters]` table of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSection {
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Category presets merged into `extensions`.
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub name_contains: String,
    #[serde(default)]
    pub name_excludes: String,
    #[serde(default)]
    pub min_size: u64,
    #[serde(default)]
    pub max_size: Option<u64>,
}

/// On-disk configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub organize: OrganizeSection,
    #[serde(default)]
    pub filters: FilterSection,
    /// Extension to folder-name overrides.
    #[serde(default)]
    pub destinations: BTreeMap<String, String>,
}

impl ConfigFile {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.tidysortrc.toml` in the current directory
    /// 3. Look for `config.toml` under the user's config directory (`tidysort/`)
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot
    /// be read, or if any discovered file fails to parse.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tidysort").join("config.toml");
            if user_config.exists() {
                return Self::load_from_file(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        tracing::debug!(path = %path.display(), "loaded configuration file");

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Converts the file contents into a builder so that command-line flags can
    /// be layered on top.
    pub fn into_builder(self) -> OrganizerConfigBuilder {
        let mut builder = OrganizerConfig::builder()
            .operation(self.organize.operation)
            .classify(self.organize.classify)
            .recursive(self.organize.recursive)
            .extensions(&self.filters.extensions)
            .categories(self.filters.categories.iter().copied())
            .name_contains(&self.filters.name_contains)
            .name_excludes(&self.filters.name_excludes)
            .min_size(self.filters.min_size)
            .max_size(self.filters.max_size);

        for (ext, folder) in &self.destinations {
            builder = builder.destination_override(ext, folder);
        }
        builder
    }
}
