//! Template sources.
//!
//! A [`TemplateSource`] produces the `(name, content)` registrations an engine
//! compiles at startup. The engine never looks at the file system itself; it
//! only consumes what a source hands over.
//!
//! [`DirectorySource`] walks a directory tree and registers every file whose
//! name ends with one of the configured extensions. The logical template name is
//! the path relative to the root, with `/` separators and the extension removed:
//!
//! ```text
//! templates/
//! ├── layouts/base.html      → "layouts/base"
//! ├── pages/home.html        → "pages/home"
//! └── partials/nav.html      → "partials/nav"
//! ```
//!
//! [`MemorySource`] registers in-memory strings, which is convenient for tests
//! and for binaries that embed their templates.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::InitError;

/// One template registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Logical name the template is registered under
    pub name: String,
    /// File the content came from, when there is one
    pub path: Option<PathBuf>,
    /// Raw template text
    pub content: String,
}

/// Supplier of template registrations.
pub trait TemplateSource: Send + Sync {
    /// Produce every registration.
    ///
    /// Duplicate names are allowed; the later registration wins.
    fn load(&self) -> Result<Vec<TemplateFile>, InitError>;

    /// Short description used in error messages and logs.
    fn describe(&self) -> String;
}

/// Walks a directory tree for template files.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectorySource {
    /// Create a source for `root` recognising the given extensions.
    ///
    /// Extensions are matched against the end of the file name, so multi-part
    /// extensions such as `.html.tera` work. When several match, the longest
    /// one is stripped from the name.
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extensions,
        }
    }

    /// Template root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn matching_extension(&self, file_name: &str) -> Option<&str> {
        self.extensions
            .iter()
            .map(String::as_str)
            .filter(|ext| !ext.is_empty() && file_name.len() > ext.len())
            .filter(|ext| file_name.ends_with(ext))
            .max_by_key(|ext| ext.len())
    }
}

/// Derive the logical template name for `path` under `root`.
///
/// Returns `None` when `path` is not below `root`.
pub fn template_name(root: &Path, path: &Path, extension: &str) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let joined = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    Some(joined.strip_suffix(extension).unwrap_or(&joined).to_string())
}

impl TemplateSource for DirectorySource {
    fn load(&self) -> Result<Vec<TemplateFile>, InitError> {
        if self.root.as_os_str().is_empty() {
            return Err(InitError::NoTemplateDirectory);
        }
        if !self.root.is_dir() {
            return Err(InitError::TemplateDirectoryMissing {
                path: self.root.clone(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|err| InitError::SourceRead {
                path: err.path().map_or_else(|| self.root.clone(), Path::to_path_buf),
                source: Box::new(err),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            let Some(extension) = self.matching_extension(&file_name) else {
                continue;
            };
            let Some(name) = template_name(&self.root, entry.path(), extension) else {
                continue;
            };

            let content =
                std::fs::read_to_string(entry.path()).map_err(|err| InitError::SourceRead {
                    path: entry.path().to_path_buf(),
                    source: Box::new(err),
                })?;

            tracing::trace!("Registered template '{}' from {}", name, entry.path().display());
            files.push(TemplateFile {
                name,
                path: Some(entry.path().to_path_buf()),
                content,
            });
        }

        Ok(files)
    }

    fn describe(&self) -> String {
        format!("{} (extensions: {})", self.root.display(), self.extensions.join(", "))
    }
}

/// In-memory registrations.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: Vec<TemplateFile>,
}

impl MemorySource {
    /// Empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `content` under `name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push(TemplateFile {
            name: name.into(),
            path: None,
            content: content.into(),
        });
        self
    }
}

impl TemplateSource for MemorySource {
    fn load(&self) -> Result<Vec<TemplateFile>, InitError> {
        Ok(self.files.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory source ({} templates)", self.files.len())
    }
}
