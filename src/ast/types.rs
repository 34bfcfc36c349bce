use crate::ast::{Constant, DeclId, NameRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinType {
    Integer,
    Char,
    Boolean,
}

#[derive(Debug, Clone)]
pub enum TypeExpr {
    Named(NameRef),
    Array {
        index: Box<TypeExpr>,
        element: Box<TypeExpr>,
        line: usize,
    },
    // Literals are `DeclKind::EnumLiteral` declarations numbered from 0
    Enum {
        literals: Vec<DeclId>,
        line: usize,
    },
    Range {
        low: Constant,
        high: Constant,
        line: usize,
    },
    Builtin(BuiltinType),
}

impl TypeExpr {
    /// Enumeration literals introduced anywhere inside this type.
    pub fn enum_literals(&self, found: &mut Vec<DeclId>) {
        match self {
            TypeExpr::Enum { literals, .. } => found.extend(literals.iter().copied()),
            TypeExpr::Array { index, element, .. } => {
                index.enum_literals(found);
                element.enum_literals(found);
            }
            TypeExpr::Named(_) | TypeExpr::Range { .. } | TypeExpr::Builtin(_) => {}
        }
    }
}
