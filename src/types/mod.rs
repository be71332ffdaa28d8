//! The type lattice
//!
//! `Ty` is an immutable value with structural equality. `Unknown` and
//! `Invalid` are the bottom of the lattice: they are identities under
//! [`Ty::union`], so a concrete type always wins over them.

mod display;

use crate::ast::NodeId;
use serde::Serialize;
use std::collections::BTreeSet;

/// Kind of class-like type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ClassKind {
    /// Class declared through an annotation
    Declared,
    /// Anonymous table created by a table constructor
    Table(NodeId),
    /// Open record accumulating the members assigned to a global name
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClassTy {
    pub name: String,
    pub kind: ClassKind,
    pub params: Option<Vec<Ty>>,
}

impl ClassTy {
    pub fn declared(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Declared,
            params: None,
        }
    }

    pub fn table(node: NodeId) -> Self {
        Self {
            name: format!("table@{}", node),
            kind: ClassKind::Table(node),
            params: None,
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Global,
            params: None,
        }
    }

    /// Key under which the members of this class are indexed
    ///
    /// The global record of `Foo` is `$Foo`, so it never collides with a
    /// declared class named `Foo`.
    pub fn member_key(&self) -> String {
        match self.kind {
            ClassKind::Global => format!("${}", self.name),
            ClassKind::Declared | ClassKind::Table(_) => self.name.clone(),
        }
    }
}

/// Parameterised container such as `table<K, V>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GenericTy {
    pub base: String,
    pub params: Vec<Ty>,
}

impl GenericTy {
    pub fn param(&self, index: usize) -> Ty {
        self.params.get(index).cloned().unwrap_or(Ty::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Parameter {
    pub name: String,
    pub ty: Ty,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// One call signature; a function may carry several (overloads)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Signature {
    pub params: Vec<Parameter>,
    pub returns: Vec<Ty>,
}

impl Signature {
    pub fn new(params: Vec<Parameter>, returns: Vec<Ty>) -> Self {
        Self { params, returns }
    }

    /// Type of the `index`-th returned value; missing values are nil
    pub fn return_ty_at(&self, index: usize) -> Ty {
        self.returns.get(index).cloned().unwrap_or(Ty::Nil)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FunctionTy {
    pub signatures: Vec<Signature>,
}

/// Flattened, deduplicated set of at least two concrete types
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnionTy {
    members: BTreeSet<Ty>,
}

impl UnionTy {
    pub fn members(&self) -> impl Iterator<Item = &Ty> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Ty {
    Unknown,
    Invalid,
    Nil,
    Boolean,
    Number,
    String,
    Class(ClassTy),
    Array(Box<Ty>),
    Generic(GenericTy),
    Function(FunctionTy),
    Union(UnionTy),
}

impl Ty {
    pub fn class(name: impl Into<String>) -> Ty {
        Ty::Class(ClassTy::declared(name))
    }

    pub fn table(node: NodeId) -> Ty {
        Ty::Class(ClassTy::table(node))
    }

    pub fn global(name: impl Into<String>) -> Ty {
        Ty::Class(ClassTy::global(name))
    }

    pub fn array(element: Ty) -> Ty {
        Ty::Array(Box::new(element))
    }

    pub fn generic(base: impl Into<String>, params: Vec<Ty>) -> Ty {
        Ty::Generic(GenericTy {
            base: base.into(),
            params,
        })
    }

    /// `table<K, V>`
    pub fn map(key: Ty, value: Ty) -> Ty {
        Ty::generic("table", vec![key, value])
    }

    pub fn function(signatures: Vec<Signature>) -> Ty {
        Ty::Function(FunctionTy { signatures })
    }

    /// Function with a single signature
    pub fn simple_function(params: Vec<Parameter>, returns: Vec<Ty>) -> Ty {
        Ty::function(vec![Signature::new(params, returns)])
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Ty::Unknown)
    }

    /// Unknown and Invalid carry no information
    pub fn is_invalid(&self) -> bool {
        matches!(self, Ty::Unknown | Ty::Invalid)
    }

    pub fn as_class(&self) -> Option<&ClassTy> {
        match self {
            Ty::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Least upper bound of two types
    ///
    /// Commutative, associative and idempotent. Invalid operands contribute
    /// nothing when the other side is concrete.
    pub fn union(self, other: Ty) -> Ty {
        match (self.is_invalid(), other.is_invalid()) {
            (true, true) => {
                if self == Ty::Invalid && other == Ty::Invalid {
                    Ty::Invalid
                } else {
                    Ty::Unknown
                }
            }
            (true, false) => other,
            (false, true) => self,
            (false, false) => {
                if self == other {
                    return self;
                }
                let mut members = BTreeSet::new();
                self.flatten_into(&mut members);
                other.flatten_into(&mut members);
                Ty::from_members(members)
            }
        }
    }

    /// Union of every type in `types`; Unknown for an empty sequence
    pub fn union_all(types: impl IntoIterator<Item = Ty>) -> Ty {
        types.into_iter().fold(Ty::Unknown, Ty::union)
    }

    fn flatten_into(self, members: &mut BTreeSet<Ty>) {
        match self {
            Ty::Union(union) => members.extend(union.members),
            other => {
                members.insert(other);
            }
        }
    }

    fn from_members(mut members: BTreeSet<Ty>) -> Ty {
        match members.len() {
            0 => Ty::Unknown,
            1 => members.pop_first().unwrap_or(Ty::Unknown),
            _ => Ty::Union(UnionTy { members }),
        }
    }

    /// Decomposes a union; any other type yields itself
    pub fn members(&self) -> Box<dyn Iterator<Item = &Ty> + '_> {
        match self {
            Ty::Union(union) => Box::new(union.members()),
            other => Box::new(std::iter::once(other)),
        }
    }

    /// True when every member of `other` is a member of `self`
    pub fn contains(&self, other: &Ty) -> bool {
        if other.is_invalid() {
            return self == other;
        }
        other
            .members()
            .all(|wanted| self.members().any(|member| member == wanted))
    }

    /// Keeps the members matching `keep`; Unknown when none remain
    pub fn narrow(&self, keep: impl Fn(&Ty) -> bool) -> Ty {
        Ty::union_all(self.members().filter(|member| keep(member)).cloned())
    }

    pub fn without_nil(&self) -> Ty {
        self.narrow(|member| *member != Ty::Nil)
    }

    /// Element type of the first array member
    pub fn find_array_element(&self) -> Option<&Ty> {
        self.members().find_map(|member| match member {
            Ty::Array(element) => Some(element.as_ref()),
            _ => None,
        })
    }

    pub fn find_generic(&self) -> Option<&GenericTy> {
        self.members().find_map(|member| match member {
            Ty::Generic(generic) => Some(generic),
            _ => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassTy> {
        self.members().filter_map(Ty::as_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FileId;

    fn sample_types() -> Vec<Ty> {
        vec![
            Ty::Unknown,
            Ty::Invalid,
            Ty::Nil,
            Ty::Number,
            Ty::String,
            Ty::class("Foo"),
            Ty::global("Foo"),
            Ty::array(Ty::Number),
            Ty::map(Ty::String, Ty::Boolean),
            Ty::Number.union(Ty::String),
        ]
    }

    #[test]
    fn test_union_is_commutative() {
        for a in sample_types() {
            for b in sample_types() {
                assert_eq!(
                    a.clone().union(b.clone()),
                    b.clone().union(a.clone()),
                    "{} | {}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_union_is_associative() {
        let types = sample_types();
        for a in &types {
            for b in &types {
                for c in &types {
                    let left = a.clone().union(b.clone()).union(c.clone());
                    let right = a.clone().union(b.clone().union(c.clone()));
                    assert_eq!(left, right, "({} | {}) | {}", a, b, c);
                }
            }
        }
    }

    #[test]
    fn test_union_is_idempotent() {
        for a in sample_types() {
            assert_eq!(a.clone().union(a.clone()), a);
        }
    }

    #[test]
    fn test_union_flattens_nested_unions() {
        let inner = Ty::Number.union(Ty::String);
        let outer = inner.union(Ty::Boolean.union(Ty::Number));

        let Ty::Union(union) = &outer else {
            panic!("expected union, got {}", outer);
        };
        assert_eq!(union.len(), 3);
        assert!(union.members().all(|member| !matches!(member, Ty::Union(_))));
    }

    #[test]
    fn test_unknown_contributes_nothing() {
        assert_eq!(Ty::Unknown.union(Ty::Number), Ty::Number);
        assert_eq!(Ty::Number.union(Ty::Unknown), Ty::Number);
        assert_eq!(Ty::Invalid.union(Ty::class("A")), Ty::class("A"));
        assert_eq!(Ty::Unknown.union(Ty::Invalid), Ty::Unknown);
        assert_eq!(Ty::Invalid.union(Ty::Invalid), Ty::Invalid);
    }

    #[test]
    fn test_union_all_of_nothing_is_unknown() {
        assert_eq!(Ty::union_all(Vec::new()), Ty::Unknown);
        assert_eq!(
            Ty::union_all(vec![Ty::Number, Ty::Unknown, Ty::Number]),
            Ty::Number
        );
    }

    #[test]
    fn test_contains() {
        let ty = Ty::Number.union(Ty::String).union(Ty::class("A"));
        assert!(ty.contains(&Ty::Number));
        assert!(ty.contains(&Ty::class("A")));
        assert!(ty.contains(&Ty::Number.union(Ty::String)));
        assert!(!ty.contains(&Ty::Boolean));
        assert!(!ty.contains(&Ty::Unknown));
        assert!(Ty::Unknown.contains(&Ty::Unknown));
    }

    #[test]
    fn test_narrow_and_without_nil() {
        let ty = Ty::Number.union(Ty::Nil);
        assert_eq!(ty.without_nil(), Ty::Number);
        assert_eq!(Ty::Nil.without_nil(), Ty::Unknown);

        let classes = Ty::class("A").union(Ty::Number).union(Ty::class("B"));
        assert_eq!(
            classes.narrow(|member| member.as_class().is_some()),
            Ty::class("A").union(Ty::class("B"))
        );
    }

    #[test]
    fn test_find_container_members() {
        let ty = Ty::array(Ty::String).union(Ty::map(Ty::Number, Ty::Boolean));
        assert_eq!(ty.find_array_element(), Some(&Ty::String));
        assert_eq!(ty.find_generic().map(|g| g.param(1)), Some(Ty::Boolean));
        assert_eq!(Ty::Number.find_array_element(), None);
    }

    #[test]
    fn test_member_keys_are_distinct() {
        let node = NodeId::new(FileId(1), 7);
        assert_eq!(ClassTy::declared("Foo").member_key(), "Foo");
        assert_eq!(ClassTy::global("Foo").member_key(), "$Foo");
        assert_eq!(ClassTy::table(node).member_key(), "table@1:7");
    }

    #[test]
    fn test_return_ty_past_end_is_nil() {
        let sig = Signature::new(Vec::new(), vec![Ty::Number]);
        assert_eq!(sig.return_ty_at(0), Ty::Number);
        assert_eq!(sig.return_ty_at(1), Ty::Nil);
    }
}
