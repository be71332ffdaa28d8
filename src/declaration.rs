use crate::ast::{Expression, FunctionBody, NodeId, Span};
use serde::{Deserialize, Serialize};

/// Kind of name binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKind {
    Local,
    Parameter,
    Global,
    Field,
    Function,
}

/// Right-hand side of the assignment that introduced a declaration
///
/// `index` is the declaration's position among the assignment targets, so
/// `local a, b = x, y` gives `b` the values `[x, y]` at index 1.
#[derive(Debug, Clone, Copy)]
pub struct AssignedValues<'a> {
    pub values: &'a [&'a Expression<'a>],
    pub index: usize,
}

impl<'a> AssignedValues<'a> {
    pub fn new(values: &'a [&'a Expression<'a>], index: usize) -> Self {
        Self { values, index }
    }

    pub fn single(values: &'a [&'a Expression<'a>]) -> Self {
        Self::new(values, 0)
    }
}

/// A place where a name is introduced
#[derive(Debug, Clone, Copy)]
pub struct Declaration<'a> {
    pub id: NodeId,
    pub name: &'a str,
    pub kind: DeclarationKind,
    pub span: Span,
    pub value: Option<AssignedValues<'a>>,
    /// Body of a `function name() ... end` statement
    pub body: Option<&'a FunctionBody<'a>>,
    /// Module namespace the name was declared in, if any
    pub module: Option<&'a str>,
}

impl<'a> Declaration<'a> {
    pub fn new(id: NodeId, name: &'a str, kind: DeclarationKind) -> Self {
        Self {
            id,
            name,
            kind,
            span: Span::default(),
            value: None,
            body: None,
            module: None,
        }
    }

    pub fn local(id: NodeId, name: &'a str) -> Self {
        Self::new(id, name, DeclarationKind::Local)
    }

    pub fn global(id: NodeId, name: &'a str) -> Self {
        Self::new(id, name, DeclarationKind::Global)
    }

    pub fn field(id: NodeId, name: &'a str) -> Self {
        Self::new(id, name, DeclarationKind::Field)
    }

    pub fn parameter(id: NodeId, name: &'a str) -> Self {
        Self::new(id, name, DeclarationKind::Parameter)
    }

    pub fn with_value(mut self, value: AssignedValues<'a>) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_body(mut self, body: &'a FunctionBody<'a>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn in_module(mut self, module: &'a str) -> Self {
        self.module = Some(module);
        self
    }

    pub fn is_global(&self) -> bool {
        self.kind == DeclarationKind::Global
    }
}
