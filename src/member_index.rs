use crate::ast::{Expression, ExpressionKind, Literal, TableField};
use crate::context::SearchContext;
use crate::declaration::{AssignedValues, Declaration};
use crate::services::MemberLookup;
use crate::types::ClassTy;
use indexmap::IndexMap;

/// Members of classes, tables and global records
///
/// Keyed by [`ClassTy::member_key`], then by field name. Declarations keep
/// their insertion order so results are stable across runs.
#[derive(Debug, Default)]
pub struct ClassMemberIndex<'a> {
    classes: IndexMap<String, IndexMap<&'a str, Vec<Declaration<'a>>>>,
}

impl<'a> ClassMemberIndex<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration of `decl.name` as a member of `class`
    pub fn add_member(&mut self, class: &ClassTy, decl: Declaration<'a>) {
        self.classes
            .entry(class.member_key())
            .or_default()
            .entry(decl.name)
            .or_default()
            .push(decl);
    }

    /// Register the named fields of a table constructor as members of its
    /// table type
    ///
    /// Returns the number of fields registered; anything other than a table
    /// constructor registers nothing.
    pub fn index_table_constructor(&mut self, expr: &'a Expression<'a>) -> usize {
        let ExpressionKind::Table(fields) = expr.kind else {
            return 0;
        };
        let class = ClassTy::table(expr.id);

        let mut count = 0;
        for field in fields {
            let (id, name, value) = match field {
                TableField::Named { id, name, value } => (*id, *name, value),
                TableField::Keyed { id, key, value } => match key.kind {
                    ExpressionKind::Literal(Literal::String(name)) => (*id, name, value),
                    _ => continue,
                },
                TableField::Positional(_) => continue,
            };
            let decl = Declaration::field(id, name)
                .with_value(AssignedValues::single(std::slice::from_ref(value)))
                .with_span(value.span);
            self.add_member(&class, decl);
            count += 1;
        }
        count
    }

    pub fn members_of(&self, class: &ClassTy) -> impl Iterator<Item = &'a str> + '_ {
        self.classes
            .get(&class.member_key())
            .into_iter()
            .flat_map(|fields| fields.keys().copied())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl<'a> MemberLookup<'a> for ClassMemberIndex<'a> {
    fn all_declarations_of(
        &self,
        class: &ClassTy,
        field: &str,
        _ctx: &SearchContext<'_>,
    ) -> Vec<Declaration<'a>> {
        self.classes
            .get(&class.member_key())
            .and_then(|fields| fields.get(field))
            .cloned()
            .unwrap_or_default()
    }
}
