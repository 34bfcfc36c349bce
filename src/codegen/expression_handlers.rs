use crate::ast::{CallExpr, DeclKind, Expression, Factor, FactorOp, PrefixOp, RoutineKind, SimpleExpr, Term, TermOp};
use crate::codegen::symbol_helpers::{constant_value, decl_value, load_variable, resolved};
use crate::codegen::{procedure_handlers, CodeGenerator};
use crate::errors::{PascalError, PascalResult};

// Every handler leaves its value in %eax.

pub fn handle_expression(gen: &mut CodeGenerator, expr: &Expression) -> PascalResult<()> {
    handle_simple_expr(gen, &expr.left)?;
    if let Some((op, right)) = &expr.rel {
        gen.emit("pushl", "%eax")?;
        handle_simple_expr(gen, right)?;
        gen.emit("popl", "%ecx")?;
        gen.emit("cmpl", "%eax,%ecx")?;
        gen.emit("movl", "$0,%eax")?;
        gen.emitter
            .emit_commented(&format!("set{}", op.condition()), "%al", "Test")?;
    }
    Ok(())
}

pub fn handle_simple_expr(gen: &mut CodeGenerator, simple: &SimpleExpr) -> PascalResult<()> {
    handle_term(gen, &simple.first)?;
    if simple.prefix == Some(PrefixOp::Minus) {
        gen.emitter.emit_commented("negl", "%eax", "- (prefix)")?;
    }
    for (op, term) in &simple.rest {
        gen.emit("pushl", "%eax")?;
        handle_term(gen, term)?;
        gen.emit("movl", "%eax,%ecx")?;
        gen.emit("popl", "%eax")?;
        match op {
            TermOp::Add => gen.emitter.emit_commented("addl", "%ecx,%eax", "+")?,
            TermOp::Subtract => gen.emitter.emit_commented("subl", "%ecx,%eax", "-")?,
            TermOp::Or => gen.emitter.emit_commented("orl", "%ecx,%eax", "or")?,
        }
    }
    Ok(())
}

pub fn handle_term(gen: &mut CodeGenerator, term: &Term) -> PascalResult<()> {
    handle_factor(gen, &term.first)?;
    for (op, factor) in &term.rest {
        gen.emit("pushl", "%eax")?;
        handle_factor(gen, factor)?;
        gen.emit("movl", "%eax,%ecx")?;
        gen.emit("popl", "%eax")?;
        match op {
            FactorOp::Multiply => gen.emitter.emit_commented("imull", "%ecx,%eax", "*")?,
            FactorOp::Div => {
                gen.emit("cdq", "")?;
                gen.emitter.emit_commented("idivl", "%ecx", "/")?;
            }
            FactorOp::Mod => {
                gen.emit("cdq", "")?;
                gen.emit("idivl", "%ecx")?;
                gen.emitter.emit_commented("movl", "%edx,%eax", "mod")?;
            }
            FactorOp::And => gen.emitter.emit_commented("andl", "%ecx,%eax", "and")?,
        }
    }
    Ok(())
}

pub fn handle_factor(gen: &mut CodeGenerator, factor: &Factor) -> PascalResult<()> {
    match factor {
        Factor::Constant(constant) => {
            let value = constant_value(gen.tree, constant)?;
            gen.emit("movl", &format!("${},%eax", value))
        }
        Factor::Inner(expr) => handle_expression(gen, expr),
        Factor::Not { operand, .. } => {
            handle_factor(gen, operand)?;
            gen.emitter.emit_commented("xorl", "$1,%eax", "not")
        }
        Factor::Variable(var) => {
            let tree = gen.tree;
            let id = resolved(&var.name)?;
            let decl = tree.decl(id);
            match &decl.kind {
                DeclKind::Var { .. } | DeclKind::Param { .. } => {
                    if let Some(index) = &var.index {
                        handle_expression(gen, index)?;
                    }
                    load_variable(gen, id)
                }
                DeclKind::Const { .. } | DeclKind::EnumLiteral { .. } => {
                    let value = decl_value(tree, id)?;
                    gen.emitter
                        .emit_commented("movl", &format!("${},%eax", value), &decl.name)
                }
                DeclKind::Routine(routine) if matches!(routine.kind, RoutineKind::Function(_)) => {
                    procedure_handlers::handle_call(gen, id, &[])
                }
                _ => Err(PascalError::codegen_error_with_line(
                    format!("{} {} is not a value", decl.kind_name(), decl.name),
                    var.name.line,
                )),
            }
        }
        Factor::Call(call) => handle_call_expr(gen, call),
    }
}

pub fn handle_call_expr(gen: &mut CodeGenerator, call: &CallExpr) -> PascalResult<()> {
    let id = resolved(&call.name)?;
    procedure_handlers::handle_call(gen, id, &call.args)
}
