use crate::ast::{Constant, DeclId, DeclKind, Factor, Layout, NameRef, SyntaxTree};
use crate::codegen::CodeGenerator;
use crate::errors::{PascalError, PascalResult};

pub fn resolved(name: &NameRef) -> PascalResult<DeclId> {
    name.decl.ok_or_else(|| {
        PascalError::codegen_error_with_line(format!("Name {} was never resolved", name.name), name.line)
    })
}

pub fn layout_of(tree: &SyntaxTree, id: DeclId) -> PascalResult<&Layout> {
    let decl = tree.decl(id);
    decl.layout().ok_or_else(|| {
        PascalError::codegen_error_with_line(format!("{} {} has no storage", decl.kind_name(), decl.name), decl.line)
    })
}

/// Loads the word stored for `id` into %eax.
pub fn load_variable(gen: &mut CodeGenerator, id: DeclId) -> PascalResult<()> {
    let tree = gen.tree;
    let layout = layout_of(tree, id)?;
    gen.emit("movl", &format!("{},%edx", layout.base_operand))?;
    gen.emitter
        .emit_commented("movl", &format!("{},%eax", layout.slot_operand), &tree.decl(id).name)
}

/// Stores %eax into the word stored for `id`.
pub fn store_variable(gen: &mut CodeGenerator, id: DeclId) -> PascalResult<()> {
    let tree = gen.tree;
    let layout = layout_of(tree, id)?;
    gen.emit("movl", &format!("{},%edx", layout.base_operand))?;
    gen.emitter
        .emit_commented("movl", &format!("%eax,{}", layout.slot_operand), &format!("{} :=", tree.decl(id).name))
}

/// Value of a constant, following named constants to their definition.
pub fn constant_value(tree: &SyntaxTree, constant: &Constant) -> PascalResult<i64> {
    match constant {
        Constant::Number { value, .. } => Ok(*value),
        Constant::Char { value, .. } => Ok(*value as i64),
        Constant::Str { value, .. } => Ok(crate::ast::string_value(value)),
        Constant::Named(name) => decl_value(tree, resolved(name)?),
    }
}

/// Value of a constant or enumeration literal declaration.
pub fn decl_value(tree: &SyntaxTree, id: DeclId) -> PascalResult<i64> {
    let decl = tree.decl(id);
    match &decl.kind {
        DeclKind::Const { value } => constant_value(tree, value),
        DeclKind::EnumLiteral { code } => Ok(*code),
        _ => Err(PascalError::codegen_error_with_line(
            format!("{} {} has no constant value", decl.kind_name(), decl.name),
            decl.line,
        )),
    }
}

// The literal a constant finally denotes
fn underlying_constant<'t>(tree: &'t SyntaxTree, constant: &'t Constant) -> Option<&'t Constant> {
    match constant {
        Constant::Named(name) => match &tree.decl(name.decl?).kind {
            DeclKind::Const { value } => underlying_constant(tree, value),
            _ => None,
        },
        other => Some(other),
    }
}

fn factor_constant<'t>(tree: &'t SyntaxTree, factor: &'t Factor) -> Option<&'t Constant> {
    match factor {
        Factor::Constant(constant) => underlying_constant(tree, constant),
        Factor::Variable(var) if var.index.is_none() => match &tree.decl(var.name.decl?).kind {
            DeclKind::Const { value } => underlying_constant(tree, value),
            _ => None,
        },
        _ => None,
    }
}

/// Character literals, `eol` and named character constants print as characters.
pub fn is_char_valued(tree: &SyntaxTree, factor: &Factor) -> bool {
    matches!(factor_constant(tree, factor), Some(Constant::Char { .. }))
}

pub fn string_text<'t>(tree: &'t SyntaxTree, factor: &'t Factor) -> Option<&'t str> {
    match factor_constant(tree, factor) {
        Some(Constant::Str { value, .. }) => Some(value.as_str()),
        _ => None,
    }
}

/// Quotes `text` for an `.asciz` directive.
pub fn asciz_literal(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asciz_escapes_quotes_and_backslashes() {
        assert_eq!(asciz_literal("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(asciz_literal("a\\b"), "\"a\\\\b\"");
    }
}
