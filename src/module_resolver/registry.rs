use super::error::{ModuleError, ModuleId};
use crate::ast::{Expression, FileId};
use crate::services::{ModuleExport, ModuleHandle};
use crate::types::Ty;
use rustc_hash::FxHashMap;

/// An indexed program file and what it exports
#[derive(Debug, Clone)]
pub struct RegisteredModule<'a> {
    pub id: ModuleId,
    pub file: FileId,
    pub export: Option<ModuleExport<'a>>,
}

/// Registry of indexed program files
///
/// Built with `&mut self` while indexing; queries only read it.
#[derive(Debug, Default)]
pub struct ModuleRegistry<'a> {
    modules: FxHashMap<ModuleId, RegisteredModule<'a>>,
    files: FxHashMap<FileId, ModuleId>,
}

impl<'a> ModuleRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file without a known export
    pub fn register(&mut self, id: ModuleId, file: FileId) {
        self.files.insert(file, id.clone());
        self.modules.insert(
            id.clone(),
            RegisteredModule {
                id,
                file,
                export: None,
            },
        );
    }

    /// Register a file whose main chunk returns `expr`
    pub fn register_returning(&mut self, id: ModuleId, file: FileId, expr: &'a Expression<'a>) {
        self.register(id.clone(), file);
        self.set_export(&id, ModuleExport::Expression(expr));
    }

    /// Register a file with a declared export type
    pub fn register_typed(&mut self, id: ModuleId, file: FileId, ty: Ty) {
        self.register(id.clone(), file);
        self.set_export(&id, ModuleExport::Type(ty));
    }

    fn set_export(&mut self, id: &ModuleId, export: ModuleExport<'a>) {
        if let Some(module) = self.modules.get_mut(id) {
            module.export = Some(export);
        }
    }

    pub fn get(&self, id: &ModuleId) -> Option<&RegisteredModule<'a>> {
        self.modules.get(id)
    }

    pub fn is_registered(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    pub fn handle(&self, id: &ModuleId) -> Result<ModuleHandle, ModuleError> {
        let module = self
            .modules
            .get(id)
            .ok_or_else(|| ModuleError::NotRegistered { id: id.clone() })?;
        Ok(ModuleHandle {
            id: module.id.clone(),
            file: module.file,
        })
    }

    /// Module id of an indexed file
    pub fn module_of(&self, file: FileId) -> Result<&ModuleId, ModuleError> {
        self.files
            .get(&file)
            .ok_or(ModuleError::UnknownFile { file })
    }

    pub fn export(&self, handle: &ModuleHandle) -> Option<ModuleExport<'a>> {
        self.modules.get(&handle.id)?.export.clone()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
