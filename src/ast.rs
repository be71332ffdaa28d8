//! Expression nodes consumed by the inferencer
//!
//! The parser that produces these nodes lives outside this crate. Nodes are
//! allocated in a `bumpalo` arena and refer to their children by reference,
//! so a whole program shares the arena's lifetime `'a`.

use bumpalo::Bump;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;

/// Identifies one program file
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct FileId(pub u32);

/// Identity of a node within the whole program set
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct NodeId {
    pub file: FileId,
    pub index: u32,
}

impl NodeId {
    pub const fn new(file: FileId, index: u32) -> Self {
        Self { file, index }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.0, self.index)
    }
}

/// Source location of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Minus,
    /// `#x`
    Length,
    /// `not x`
    Not,
    /// `~x`
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Concat,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Power,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ShiftLeft,
    ShiftRight,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
        )
    }

    /// Arithmetic and bitwise operators, including `^`
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Subtract
                | BinaryOp::Multiply
                | BinaryOp::Divide
                | BinaryOp::FloorDivide
                | BinaryOp::Modulo
                | BinaryOp::Power
                | BinaryOp::BitwiseAnd
                | BinaryOp::BitwiseOr
                | BinaryOp::BitwiseXor
                | BinaryOp::ShiftLeft
                | BinaryOp::ShiftRight
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Concat => "..",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "~=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::FloorDivide => "//",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => "^",
            BinaryOp::BitwiseAnd => "&",
            BinaryOp::BitwiseOr => "|",
            BinaryOp::BitwiseXor => "~",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'a> {
    Nil,
    Boolean(bool),
    Number(f64),
    String(&'a str),
    /// `...`
    Varargs,
}

/// Key of an index expression
#[derive(Debug, Clone, Copy)]
pub enum IndexKey<'a> {
    /// `obj.name` or `obj:name`
    Field(&'a str),
    /// `obj[expr]`
    Bracket(&'a Expression<'a>),
}

#[derive(Debug, Clone, Copy)]
pub struct IndexExpression<'a> {
    pub object: &'a Expression<'a>,
    pub key: IndexKey<'a>,
}

impl<'a> IndexExpression<'a> {
    pub fn is_bracket(&self) -> bool {
        matches!(self.key, IndexKey::Bracket(_))
    }

    /// Field name, or the value of a string-literal bracket key
    pub fn name(&self) -> Option<&'a str> {
        match self.key {
            IndexKey::Field(name) => Some(name),
            IndexKey::Bracket(expr) => match expr.kind {
                ExpressionKind::Literal(Literal::String(value)) => Some(value),
                _ => None,
            },
        }
    }
}

/// One entry of a table constructor
#[derive(Debug, Clone, Copy)]
pub enum TableField<'a> {
    /// `name = value`
    Named {
        id: NodeId,
        name: &'a str,
        value: &'a Expression<'a>,
    },
    /// `[key] = value`
    Keyed {
        id: NodeId,
        key: &'a Expression<'a>,
        value: &'a Expression<'a>,
    },
    /// Positional array item
    Positional(&'a Expression<'a>),
}

/// Function parameter; its node id is also its declaration site
#[derive(Debug, Clone, Copy)]
pub struct Param<'a> {
    pub id: NodeId,
    pub name: &'a str,
}

/// Signature and return statements of a function body
#[derive(Debug, Clone, Copy)]
pub struct FunctionBody<'a> {
    pub id: NodeId,
    pub params: &'a [Param<'a>],
    /// Value lists of every `return` statement in the body
    pub returns: &'a [&'a [&'a Expression<'a>]],
}

#[derive(Debug, Clone, Copy)]
pub enum ExpressionKind<'a> {
    Unary(UnaryOp, &'a Expression<'a>),
    /// The right operand is absent in incomplete code
    Binary(BinaryOp, &'a Expression<'a>, Option<&'a Expression<'a>>),
    Call(&'a Expression<'a>, &'a [&'a Expression<'a>]),
    Closure(&'a FunctionBody<'a>),
    Table(&'a [TableField<'a>]),
    Paren(Option<&'a Expression<'a>>),
    Name(&'a str),
    Literal(Literal<'a>),
    Index(IndexExpression<'a>),
}

#[derive(Debug, Clone, Copy)]
pub struct Expression<'a> {
    pub id: NodeId,
    pub kind: ExpressionKind<'a>,
    pub span: Span,
}

impl<'a> Expression<'a> {
    pub fn name(&self) -> Option<&'a str> {
        match self.kind {
            ExpressionKind::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self.kind, ExpressionKind::Call(..))
    }

    /// True for expressions that may produce several values
    pub fn is_multi_valued(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::Call(..) | ExpressionKind::Literal(Literal::Varargs)
        )
    }

    /// First argument of a call when it is a string literal
    pub fn first_string_arg(&self) -> Option<&'a str> {
        match self.kind {
            ExpressionKind::Call(_, args) => match args.first()?.kind {
                ExpressionKind::Literal(Literal::String(value)) => Some(value),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Arena-backed node factory that numbers nodes per file
#[derive(Debug)]
pub struct AstBuilder<'a> {
    arena: &'a Bump,
    file: FileId,
    next: Cell<u32>,
}

impl<'a> AstBuilder<'a> {
    pub fn new(arena: &'a Bump, file: FileId) -> Self {
        Self {
            arena,
            file,
            next: Cell::new(0),
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn next_id(&self) -> NodeId {
        let index = self.next.get();
        self.next.set(index + 1);
        NodeId::new(self.file, index)
    }

    pub fn alloc_str(&self, value: &str) -> &'a str {
        self.arena.alloc_str(value)
    }

    pub fn expr(&self, kind: ExpressionKind<'a>) -> &'a Expression<'a> {
        let id = self.next_id();
        self.arena.alloc(Expression {
            id,
            kind,
            span: Span::new(id.index, id.index + 1, 0, 0),
        })
    }

    pub fn list(&self, items: &[&'a Expression<'a>]) -> &'a [&'a Expression<'a>] {
        self.arena.alloc_slice_copy(items)
    }

    pub fn name(&self, name: &str) -> &'a Expression<'a> {
        self.expr(ExpressionKind::Name(self.alloc_str(name)))
    }

    pub fn nil(&self) -> &'a Expression<'a> {
        self.expr(ExpressionKind::Literal(Literal::Nil))
    }

    pub fn boolean(&self, value: bool) -> &'a Expression<'a> {
        self.expr(ExpressionKind::Literal(Literal::Boolean(value)))
    }

    pub fn number(&self, value: f64) -> &'a Expression<'a> {
        self.expr(ExpressionKind::Literal(Literal::Number(value)))
    }

    pub fn string(&self, value: &str) -> &'a Expression<'a> {
        self.expr(ExpressionKind::Literal(Literal::String(self.alloc_str(value))))
    }

    pub fn varargs(&self) -> &'a Expression<'a> {
        self.expr(ExpressionKind::Literal(Literal::Varargs))
    }

    pub fn unary(&self, op: UnaryOp, operand: &'a Expression<'a>) -> &'a Expression<'a> {
        self.expr(ExpressionKind::Unary(op, operand))
    }

    pub fn binary(
        &self,
        op: BinaryOp,
        left: &'a Expression<'a>,
        right: &'a Expression<'a>,
    ) -> &'a Expression<'a> {
        self.expr(ExpressionKind::Binary(op, left, Some(right)))
    }

    pub fn paren(&self, inner: &'a Expression<'a>) -> &'a Expression<'a> {
        self.expr(ExpressionKind::Paren(Some(inner)))
    }

    pub fn call(
        &self,
        callee: &'a Expression<'a>,
        args: &[&'a Expression<'a>],
    ) -> &'a Expression<'a> {
        let args = self.list(args);
        self.expr(ExpressionKind::Call(callee, args))
    }

    pub fn field(&self, object: &'a Expression<'a>, name: &str) -> &'a Expression<'a> {
        let key = IndexKey::Field(self.alloc_str(name));
        self.expr(ExpressionKind::Index(IndexExpression { object, key }))
    }

    pub fn bracket(
        &self,
        object: &'a Expression<'a>,
        key: &'a Expression<'a>,
    ) -> &'a Expression<'a> {
        self.expr(ExpressionKind::Index(IndexExpression {
            object,
            key: IndexKey::Bracket(key),
        }))
    }

    pub fn named_field(&self, name: &str, value: &'a Expression<'a>) -> TableField<'a> {
        TableField::Named {
            id: self.next_id(),
            name: self.alloc_str(name),
            value,
        }
    }

    pub fn table(&self, fields: &[TableField<'a>]) -> &'a Expression<'a> {
        let fields = self.arena.alloc_slice_copy(fields);
        self.expr(ExpressionKind::Table(fields))
    }

    pub fn param(&self, name: &str) -> Param<'a> {
        Param {
            id: self.next_id(),
            name: self.alloc_str(name),
        }
    }

    /// Function body with the given parameters and `return` value lists
    pub fn function_body(
        &self,
        params: &[Param<'a>],
        returns: &[&[&'a Expression<'a>]],
    ) -> &'a FunctionBody<'a> {
        let params = self.arena.alloc_slice_copy(params);
        let returns: Vec<&'a [&'a Expression<'a>]> =
            returns.iter().map(|values| self.list(values)).collect();
        let returns = self.arena.alloc_slice_copy(&returns);
        let id = self.next_id();
        self.arena.alloc(FunctionBody {
            id,
            params,
            returns,
        })
    }

    pub fn closure(&self, body: &'a FunctionBody<'a>) -> &'a Expression<'a> {
        self.expr(ExpressionKind::Closure(body))
    }
}
