use crate::ast::FileId;
use std::fmt;
use std::path::PathBuf;

/// Errors that can occur during module resolution
#[derive(Debug, Clone)]
pub enum ModuleError {
    /// Module not found despite searching multiple paths
    NotFound {
        source: String,
        searched_paths: Vec<PathBuf>,
    },

    /// Invalid module path
    InvalidPath { source: String, reason: String },

    /// File exists but no module has been registered for it
    NotRegistered { id: ModuleId },

    /// Originating file is not known to the registry
    UnknownFile { file: FileId },
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleError::NotFound {
                source,
                searched_paths,
            } => {
                writeln!(f, "Cannot find module '{}'", source)?;
                writeln!(f, "Searched paths:")?;
                for path in searched_paths {
                    writeln!(f, "  - {}", path.display())?;
                }
                Ok(())
            }
            ModuleError::InvalidPath { source, reason } => {
                write!(f, "Invalid module path '{}': {}", source, reason)
            }
            ModuleError::NotRegistered { id } => {
                write!(f, "Module '{}' has not been indexed yet", id)
            }
            ModuleError::UnknownFile { file } => {
                write!(f, "File #{} is not registered", file.0)
            }
        }
    }
}

impl std::error::Error for ModuleError {}

/// Unique identifier for a module (normalized absolute path)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId(PathBuf);

impl ModuleId {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &PathBuf {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.to_str().unwrap_or("<invalid utf-8>")
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for ModuleId {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}
