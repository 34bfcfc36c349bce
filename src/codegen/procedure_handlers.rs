use crate::ast::{BlockId, DeclId, Expression};
use crate::codegen::expression_handlers::handle_expression;
use crate::codegen::symbol_helpers::{asciz_literal, is_char_valued, layout_of, string_text};
use crate::codegen::{statement_handlers, CodeGenerator};
use crate::config::{assembly, frame, runtime_functions};
use crate::errors::{PascalError, PascalResult};

/// Emits every routine declared in `block`, nested routines before their parents.
pub fn handle_block_routines(gen: &mut CodeGenerator, block: BlockId) -> PascalResult<()> {
    let tree = gen.tree;
    let routines: Vec<DeclId> = tree.block(block).routines().collect();

    // Labels first, so siblings can call each other in any order
    for &id in &routines {
        let decl = tree.decl(id);
        let prefix = match decl.routine() {
            Some(routine) if routine.is_function() => assembly::FUNCTION_PREFIX,
            _ => assembly::PROCEDURE_PREFIX,
        };
        let label = gen.ctx.named_label(prefix, &decl.name);
        gen.routine_labels.insert(id, label);
    }

    for id in routines {
        handle_routine(gen, id)?;
    }
    Ok(())
}

pub fn handle_routine(gen: &mut CodeGenerator, id: DeclId) -> PascalResult<()> {
    let tree = gen.tree;
    let decl = tree.decl(id);
    let routine = decl.routine().ok_or_else(|| {
        PascalError::codegen_error_with_line(format!("{} is not a routine", decl.name), decl.line)
    })?;
    let body_id = routine.body.ok_or_else(|| {
        PascalError::codegen_error_with_line(format!("{} has no body", decl.name), decl.line)
    })?;

    handle_block_routines(gen, body_id)?;

    let label = gen.routine_label(id)?;
    let body = tree.block(body_id);
    if !body.owns_frame(body_id) {
        // Runs in the caller's frame: no enter/leave
        gen.emitter.emit_label(&label)?;
        statement_handlers::handle_statements(gen, &body.statements)?;
        if routine.is_function() {
            let result = layout_of(tree, id)?;
            gen.emit("movl", &format!("{},%edx", result.base_operand))?;
            gen.emitter
                .emit_commented("movl", &format!("{},%eax", result.slot_operand), "Fetch return value")?;
        }
    } else {
        gen.emitter.emit_instr(
            Some(&label),
            "enter",
            &format!("${},${}", frame::frame_size(body.frame_bytes), body.frame_level),
            &format!("Start of {}", decl.name),
        )?;
        statement_handlers::handle_statements(gen, &body.statements)?;
        if routine.is_function() {
            gen.emitter.emit_commented(
                "movl",
                &format!("{}(%ebp),%eax", frame::RETURN_SLOT_OFFSET),
                "Fetch return value",
            )?;
        }
        gen.emit("leave", "")?;
    }
    gen.emitter.emit_commented("ret", "", &format!("End of {}", decl.name))
}

/// Calls a user routine, or expands the library `write`.
pub fn handle_call(gen: &mut CodeGenerator, id: DeclId, args: &[Expression]) -> PascalResult<()> {
    let tree = gen.tree;
    let decl = tree.decl(id);
    let routine = decl.routine().ok_or_else(|| {
        PascalError::codegen_error_with_line(format!("{} can not be called", decl.name), decl.line)
    })?;
    if routine.is_builtin() {
        return handle_write(gen, args);
    }

    for arg in args.iter().rev() {
        handle_expression(gen, arg)?;
        gen.emit("pushl", "%eax")?;
    }
    let label = gen.routine_label(id)?;
    gen.emit("call", &label)?;
    if !args.is_empty() {
        gen.emitter.emit_commented(
            "addl",
            &format!("${},%esp", frame::WORD_SIZE * args.len() as i32),
            "Pop parameters",
        )?;
    }
    Ok(())
}

/// One runtime call per argument, chosen by what the argument is.
pub fn handle_write(gen: &mut CodeGenerator, args: &[Expression]) -> PascalResult<()> {
    let tree = gen.tree;
    for arg in args {
        let factor = arg.as_bare_factor();
        let text = factor.and_then(|f| string_text(tree, f));
        let function = if let Some(text) = text {
            let label = gen.ctx.local_label();
            gen.emitter.emit_directive(assembly::DATA_SECTION)?;
            gen.emitter
                .emit_instr(Some(&label), assembly::STRING_DIRECTIVE, &asciz_literal(text), "")?;
            gen.emitter
                .emit_directive(&format!("{} 2", assembly::ALIGN_DIRECTIVE))?;
            gen.emitter.emit_directive(assembly::TEXT_SECTION)?;
            gen.emitter
                .emit_commented("leal", &format!("{},%eax", label), "Addr(text)")?;
            runtime_functions::WRITE_STR
        } else if factor.is_some_and(|f| is_char_valued(tree, f)) {
            handle_expression(gen, arg)?;
            runtime_functions::WRITE_CHAR
        } else {
            handle_expression(gen, arg)?;
            runtime_functions::WRITE_INT
        };
        gen.emit("pushl", "%eax")?;
        gen.emit("call", function)?;
        gen.emitter
            .emit_commented("addl", &format!("${},%esp", frame::WORD_SIZE), "Pop parameter")?;
    }
    Ok(())
}
