//! Editor-facing rendering of types
//!
//! Produces the short names shown in hover and completion:
//! - `Number` → `"number"`
//! - `Array(String)` → `"string[]"`
//! - `Union([Number, String])` → `"number|string"`
//! - `Function(...)` → `"fun(x: number): string"`

use super::{ClassKind, ClassTy, FunctionTy, GenericTy, Signature, Ty};
use std::fmt;

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Unknown => f.write_str("unknown"),
            Ty::Invalid => f.write_str("invalid"),
            Ty::Nil => f.write_str("nil"),
            Ty::Boolean => f.write_str("boolean"),
            Ty::Number => f.write_str("number"),
            Ty::String => f.write_str("string"),
            Ty::Class(class) => write!(f, "{}", class),
            Ty::Array(element) => match element.as_ref() {
                Ty::Union(_) | Ty::Function(_) => write!(f, "({})[]", element),
                _ => write!(f, "{}[]", element),
            },
            Ty::Generic(generic) => write!(f, "{}", generic),
            Ty::Function(function) => write!(f, "{}", function),
            Ty::Union(union) => {
                let formatted: Vec<String> = union.members().map(ToString::to_string).collect();
                f.write_str(&formatted.join("|"))
            }
        }
    }
}

impl fmt::Display for ClassTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ClassKind::Table(_) => f.write_str("table")?,
            ClassKind::Declared | ClassKind::Global => f.write_str(&self.name)?,
        }
        if let Some(params) = &self.params {
            write!(f, "<{}>", join(params))?;
        }
        Ok(())
    }
}

impl fmt::Display for GenericTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.base, join(&self.params))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|param| format!("{}: {}", param.name, param.ty))
            .collect();
        write!(f, "fun({})", params.join(", "))?;
        if !self.returns.is_empty() {
            write!(f, ": {}", join(&self.returns))?;
        }
        Ok(())
    }
}

impl fmt::Display for FunctionTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.signatures.is_empty() {
            return f.write_str("function");
        }
        let formatted: Vec<String> = self.signatures.iter().map(ToString::to_string).collect();
        f.write_str(&formatted.join(" & "))
    }
}

fn join(types: &[Ty]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
