use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

/// File system abstraction for module resolution
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// Real file system implementation
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory file system for tests and unsaved editor buffers
#[derive(Debug, Default)]
pub struct MockFileSystem {
    files: FxHashSet<PathBuf>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        self.files.insert(path.into());
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }
}
