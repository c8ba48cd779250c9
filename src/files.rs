//! File selection and download targets.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::error::Result;

/// The file chooser and download sink workflows talk to
pub trait FileGateway {
    /// Ask for a file matching `accept` (e.g. `.json`) and return its text, `None` if the
    /// user picked nothing.
    fn pick_file(&self, accept: &str) -> Result<Option<String>>;

    /// Deliver `content` to the user under `name`.
    fn save_file(&self, name: &str, content: &str) -> Result<()>;
}

/// Replace path separators and control characters so a title is a safe file name.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        "download".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Saves downloads into a directory and picks the file chosen up front, if any.
pub struct DirectoryFiles {
    downloads: PathBuf,
    selection: RefCell<Option<PathBuf>>,
}

impl DirectoryFiles {
    pub fn new(downloads: impl Into<PathBuf>) -> Self {
        Self {
            downloads: downloads.into(),
            selection: RefCell::new(None),
        }
    }

    /// The file the next `pick_file` returns.
    pub fn select(&self, path: impl Into<PathBuf>) {
        *self.selection.borrow_mut() = Some(path.into());
    }

    pub fn downloads(&self) -> &Path {
        &self.downloads
    }
}

impl FileGateway for DirectoryFiles {
    fn pick_file(&self, accept: &str) -> Result<Option<String>> {
        let Some(path) = self.selection.borrow_mut().take() else {
            debug!(accept = %accept, "No file selected");
            return Ok(None);
        };
        debug!(path = %path.display(), "Reading selected file");
        Ok(Some(fs::read_to_string(path)?))
    }

    fn save_file(&self, name: &str, content: &str) -> Result<()> {
        fs::create_dir_all(&self.downloads)?;
        let path = self.downloads.join(sanitize_file_name(name));
        fs::write(&path, content)?;
        debug!(path = %path.display(), bytes = content.len(), "File saved");
        Ok(())
    }
}

#[derive(Default)]
struct MemoryState {
    selection: Option<String>,
    saved: Vec<(String, String)>,
}

/// In-memory gateway. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryFiles {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content the next `pick_file` returns.
    pub fn select(&self, content: impl Into<String>) {
        self.state.borrow_mut().selection = Some(content.into());
    }

    /// Saved files as `(name, content)`, oldest first.
    pub fn saved(&self) -> Vec<(String, String)> {
        self.state.borrow().saved.clone()
    }

    pub fn saved_named(&self, name: &str) -> Option<String> {
        self.state
            .borrow()
            .saved
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, content)| content.clone())
    }
}

impl FileGateway for MemoryFiles {
    fn pick_file(&self, _accept: &str) -> Result<Option<String>> {
        Ok(self.state.borrow_mut().selection.take())
    }

    fn save_file(&self, name: &str, content: &str) -> Result<()> {
        self.state
            .borrow_mut()
            .saved
            .push((sanitize_file_name(name), content.to_string()));
        Ok(())
    }
}
