//! Demand-driven type inference for Lua programs
//!
//! Given any expression node of an indexed program, [`TypeInferrer`]
//! computes its static type by resolving names to declarations, following
//! calls, table fields and `require` boundaries, and combining the results
//! in the [`Ty`] lattice. Cyclic dependencies between declarations are cut
//! by a per-query recursion guard and degrade to `Ty::Unknown`.

pub mod annotations;
pub mod ast;
pub mod config;
pub mod context;
pub mod declaration;
pub mod errors;
pub mod fs;
pub mod guard;
pub mod inference;
pub mod member_index;
pub mod module_resolver;
pub mod services;
pub mod state;
pub mod symbol_table;
pub mod types;

pub use annotations::TypeAnnotations;
pub use ast::{AstBuilder, Expression, ExpressionKind, FileId, NodeId};
pub use config::{InferenceConfig, InferenceOptions, OptionOverrides};
pub use context::{CancellationToken, QueryState, SearchContext};
pub use declaration::{AssignedValues, Declaration, DeclarationKind};
pub use errors::ConfigError;
pub use inference::TypeInferrer;
pub use member_index::ClassMemberIndex;
pub use module_resolver::{ModuleError, ModuleId, ModuleRegistry, PathModuleResolver};
pub use services::{
    ConstructorNamePolicy, DeclaredTypeSource, MemberLookup, ModuleExport, ModuleHandle,
    ModuleResolver, NameResolver,
};
pub use state::{InferenceMetrics, MetricSummary};
pub use symbol_table::{Scope, SymbolTable};
pub use types::{ClassTy, Ty};
