use crate::ast::NodeId;
use crate::services::DeclaredTypeSource;
use crate::types::Ty;
use rustc_hash::FxHashMap;

/// Declared types collected from doc annotations
///
/// Keys are declaration sites: locals, parameters and fields by their own
/// node, function bodies by the body node (mapping to the return type).
#[derive(Debug, Default, Clone)]
pub struct TypeAnnotations {
    types: FxHashMap<NodeId, Ty>,
}

impl TypeAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a declared type, replacing any earlier annotation
    pub fn annotate(&mut self, site: NodeId, ty: Ty) -> Option<Ty> {
        self.types.insert(site, ty)
    }

    pub fn remove(&mut self, site: NodeId) -> Option<Ty> {
        self.types.remove(&site)
    }

    pub fn get(&self, site: NodeId) -> Option<&Ty> {
        self.types.get(&site)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl DeclaredTypeSource for TypeAnnotations {
    fn declared_type(&self, site: NodeId) -> Option<Ty> {
        self.types.get(&site).cloned()
    }
}
