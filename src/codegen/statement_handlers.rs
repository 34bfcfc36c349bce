use crate::ast::{Expression, Statement, VariableRef};
use crate::codegen::expression_handlers::handle_expression;
use crate::codegen::symbol_helpers::{resolved, store_variable};
use crate::codegen::{procedure_handlers, CodeGenerator};
use crate::errors::PascalResult;

pub fn handle_statements(gen: &mut CodeGenerator, statements: &[Statement]) -> PascalResult<()> {
    statements.iter().try_for_each(|s| handle_statement(gen, s))
}

pub fn handle_statement(gen: &mut CodeGenerator, statement: &Statement) -> PascalResult<()> {
    match statement {
        Statement::Assign { target, value, .. } => handle_assign(gen, target, value),
        Statement::Compound { body, .. } => handle_statements(gen, body),
        Statement::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => handle_if(gen, condition, then_branch, else_branch.as_deref()),
        Statement::While { condition, body, .. } => handle_while(gen, condition, body),
        Statement::Call { name, args, .. } => {
            let id = resolved(name)?;
            procedure_handlers::handle_call(gen, id, args)
        }
        Statement::Empty { .. } => Ok(()),
    }
}

pub fn handle_assign(gen: &mut CodeGenerator, target: &VariableRef, value: &Expression) -> PascalResult<()> {
    handle_expression(gen, value)?;
    if let Some(index) = &target.index {
        // Every variable is a single word; the index is evaluated for its effects
        gen.emit("pushl", "%eax")?;
        handle_expression(gen, index)?;
        gen.emit("popl", "%eax")?;
    }
    store_variable(gen, resolved(&target.name)?)
}

pub fn handle_if(
    gen: &mut CodeGenerator,
    condition: &Expression,
    then_branch: &Statement,
    else_branch: Option<&Statement>,
) -> PascalResult<()> {
    let else_label = else_branch.map(|_| gen.ctx.local_label());
    let end_label = gen.ctx.local_label();

    handle_expression(gen, condition)?;
    gen.emit("cmpl", "$0,%eax")?;
    gen.emit("je", else_label.as_deref().unwrap_or(end_label.as_str()))?;
    handle_statement(gen, then_branch)?;
    if let (Some(else_branch), Some(else_label)) = (else_branch, &else_label) {
        gen.emit("jmp", &end_label)?;
        gen.emitter.emit_label(else_label)?;
        handle_statement(gen, else_branch)?;
    }
    gen.emitter.emit_label(&end_label)
}

pub fn handle_while(gen: &mut CodeGenerator, condition: &Expression, body: &Statement) -> PascalResult<()> {
    let top_label = gen.ctx.local_label();
    let exit_label = gen.ctx.local_label();

    gen.emitter.emit_label(&top_label)?;
    handle_expression(gen, condition)?;
    gen.emit("cmpl", "$0,%eax")?;
    gen.emit("je", &exit_label)?;
    handle_statement(gen, body)?;
    gen.emit("jmp", &top_label)?;
    gen.emitter.emit_label(&exit_label)
}
