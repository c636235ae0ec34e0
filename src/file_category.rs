/// Extension presets grouped by broad file category.
///
/// A category expands into a fixed list of extensions that can be merged into
/// the filter's allow-list, so `--category images` selects every common image
/// format without listing them one by one.
///
/// # Examples
///
/// ```
/// use tidysort::file_category::Category;
///
/// assert!(Category::Image.extensions().contains(&".png"));
/// assert_eq!(Category::from_extension(".MP3"), Some(Category::Audio));
/// assert_eq!(Category::from_extension(".xyz"), None);
/// ```
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a broad file category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Image files (JPG, PNG, HEIC, etc.)
    #[serde(rename = "images")]
    #[value(name = "images")]
    Image,
    /// Document files (PDF, DOCX, XLSX, etc.)
    #[serde(rename = "documents")]
    #[value(name = "documents")]
    Document,
    /// Video files (MP4, MKV, MOV, etc.)
    #[serde(rename = "videos")]
    #[value(name = "videos")]
    Video,
    /// Audio files (MP3, FLAC, OGG, etc.)
    Audio,
    /// Archive files (ZIP, 7Z, TAR, etc.)
    #[serde(rename = "archives")]
    #[value(name = "archives")]
    Archive,
    /// Installers and scripts (EXE, DEB, SH, etc.)
    #[serde(rename = "executables")]
    #[value(name = "executables")]
    Executable,
    /// Source code files (Rust, Python, JavaScript, etc.)
    Code,
    /// Font files (TTF, OTF, WOFF, etc.)
    #[serde(rename = "fonts")]
    #[value(name = "fonts")]
    Font,
    /// Design and 3D files (PSD, FIG, BLEND, etc.)
    Design,
    /// E-book files (EPUB, MOBI, DJVU, etc.)
    #[serde(rename = "ebooks")]
    #[value(name = "ebooks")]
    Ebook,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Image,
        Category::Document,
        Category::Video,
        Category::Audio,
        Category::Archive,
        Category::Executable,
        Category::Code,
        Category::Font,
        Category::Design,
        Category::Ebook,
    ];

    /// Name used in configuration files and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Image => "images",
            Category::Document => "documents",
            Category::Video => "videos",
            Category::Audio => "audio",
            Category::Archive => "archives",
            Category::Executable => "executables",
            Category::Code => "code",
            Category::Font => "fonts",
            Category::Design => "design",
            Category::Ebook => "ebooks",
        }
    }

    /// Normalised extensions belonging to this category.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Image => &[
                ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg", ".ico", ".tiff",
                ".raw", ".heic",
            ],
            Category::Document => &[
                ".pdf", ".doc", ".docx", ".txt", ".odt", ".rtf", ".xls", ".xlsx", ".ppt",
                ".pptx", ".csv",
            ],
            Category::Video => &[
                ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v", ".mpeg", ".mpg",
            ],
            Category::Audio => &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".wma", ".m4a", ".opus"],
            Category::Archive => &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz"],
            Category::Executable => &[
                ".exe", ".msi", ".deb", ".rpm", ".appimage", ".sh", ".bat", ".cmd",
            ],
            Category::Code => &[
                ".py", ".js", ".html", ".css", ".java", ".cpp", ".c", ".h", ".php", ".rb", ".go",
                ".rs", ".ts",
            ],
            Category::Font => &[".ttf", ".otf", ".woff", ".woff2", ".eot"],
            Category::Design => &[
                ".psd", ".ai", ".xd", ".fig", ".sketch", ".blend", ".obj", ".fbx",
            ],
            Category::Ebook => &[".epub", ".mobi", ".azw", ".azw3", ".fb2", ".djvu"],
        }
    }

    /// Category owning `extension`, compared case-insensitively.
    pub fn from_extension(extension: &str) -> Option<Category> {
        let extension = extension.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.extensions().contains(&extension.as_str()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
