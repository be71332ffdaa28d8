pub mod error;
pub mod registry;

pub use error::{ModuleError, ModuleId};
pub use registry::{ModuleRegistry, RegisteredModule};

use crate::ast::FileId;
use crate::config::InferenceOptions;
use crate::fs::FileSystem;
use crate::services::{ModuleExport, ModuleHandle, ModuleResolver};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Normalize a path by removing . and .. components
fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(last) = components.last() {
                    if !matches!(last, Component::ParentDir) {
                        components.pop();
                    } else {
                        components.push(component);
                    }
                }
            }
            Component::Normal(_) => {
                components.push(component);
            }
        }
    }

    components.iter().collect()
}

/// Configuration for module resolution
#[derive(Debug, Clone)]
pub struct ModuleConfig {
    /// Roots searched for package-style names
    pub roots: Vec<PathBuf>,
    /// Search templates; `?` is replaced by the slash-separated name
    pub templates: Vec<String>,
}

impl ModuleConfig {
    pub fn from_options(options: &InferenceOptions, base_dir: &Path) -> Self {
        Self {
            roots: vec![base_dir.to_path_buf()],
            templates: options.module_paths.clone(),
        }
    }
}

/// Resolves `require` paths against a file system and a module registry
pub struct PathModuleResolver<'a> {
    fs: Arc<dyn FileSystem>,
    config: ModuleConfig,
    base_dir: PathBuf,
    registry: ModuleRegistry<'a>,
}

impl std::fmt::Debug for PathModuleResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathModuleResolver")
            .field("config", &self.config)
            .field("base_dir", &self.base_dir)
            .field("modules", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl<'a> PathModuleResolver<'a> {
    pub fn new(fs: Arc<dyn FileSystem>, config: ModuleConfig, base_dir: PathBuf) -> Self {
        Self {
            fs,
            config,
            base_dir,
            registry: ModuleRegistry::new(),
        }
    }

    pub fn registry(&self) -> &ModuleRegistry<'a> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModuleRegistry<'a> {
        &mut self.registry
    }

    /// Resolve a require path to a module ID
    ///
    /// Supports two resolution strategies:
    /// 1. Relative paths: './file', '../dir/file', from the requiring file
    /// 2. Package paths: 'foo.bar' (Lua-style), under the configured roots
    pub fn resolve_path(&self, source: &str, from: FileId) -> Result<ModuleId, ModuleError> {
        if source.is_empty() {
            return Err(ModuleError::InvalidPath {
                source: source.to_string(),
                reason: "empty module name".to_string(),
            });
        }

        if source.starts_with("./") || source.starts_with("../") {
            self.resolve_relative(source, from)
        } else {
            self.resolve_package(source)
        }
    }

    fn resolve_relative(&self, source: &str, from: FileId) -> Result<ModuleId, ModuleError> {
        let from_path = self.registry.module_of(from)?.path();
        let from_dir = from_path.parent().ok_or_else(|| ModuleError::InvalidPath {
            source: source.to_string(),
            reason: format!("Cannot get parent directory of '{}'", from_path.display()),
        })?;

        let mut searched_paths = Vec::new();
        if let Some(id) = self.try_templates(from_dir, source, &mut searched_paths) {
            return Ok(id);
        }

        Err(ModuleError::NotFound {
            source: source.to_string(),
            searched_paths,
        })
    }

    fn resolve_package(&self, source: &str) -> Result<ModuleId, ModuleError> {
        // "foo.bar" → "foo/bar"
        let name = source.replace('.', "/");
        let mut searched_paths = Vec::new();

        for root in &self.config.roots {
            if let Some(id) = self.try_templates(root, &name, &mut searched_paths) {
                return Ok(id);
            }
        }

        Err(ModuleError::NotFound {
            source: source.to_string(),
            searched_paths,
        })
    }

    fn try_templates(
        &self,
        dir: &Path,
        name: &str,
        searched_paths: &mut Vec<PathBuf>,
    ) -> Option<ModuleId> {
        for template in &self.config.templates {
            let candidate = self.canonicalize(&dir.join(template.replace('?', name)));
            searched_paths.push(candidate.path().clone());
            if self.fs.exists(candidate.path()) {
                return Some(candidate);
            }
        }
        None
    }

    fn canonicalize(&self, path: &Path) -> ModuleId {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        ModuleId::new(normalize_path(&absolute))
    }
}

impl<'a> ModuleResolver<'a> for PathModuleResolver<'a> {
    fn resolve(&self, path: &str, from: FileId) -> Option<ModuleHandle> {
        let resolved = self
            .resolve_path(path, from)
            .and_then(|id| self.registry.handle(&id));
        match resolved {
            Ok(handle) => Some(handle),
            Err(err) => {
                debug!(path, error = %err, "Module resolution failed");
                None
            }
        }
    }

    fn module_export(&self, handle: &ModuleHandle) -> Option<ModuleExport<'a>> {
        self.registry.export(handle)
    }
}
