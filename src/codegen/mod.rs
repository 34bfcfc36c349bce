pub mod expression_handlers;
pub mod procedure_handlers;
pub mod statement_handlers;
pub mod symbol_helpers;

use crate::{
    ast::{DeclId, SyntaxTree},
    code_emitter::CodeEmitter,
    config::{assembly, frame, runtime_functions},
    context::CompileContext,
    errors::{PascalError, PascalResult},
};
use std::collections::HashMap;

/// Emits 32-bit AT&T assembly for a checked tree.
pub struct CodeGenerator<'a> {
    pub(crate) tree: &'a SyntaxTree,
    pub(crate) ctx: &'a mut CompileContext,
    pub(crate) emitter: &'a mut dyn CodeEmitter,
    pub(crate) routine_labels: HashMap<DeclId, String>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(tree: &'a SyntaxTree, ctx: &'a mut CompileContext, emitter: &'a mut dyn CodeEmitter) -> Self {
        Self {
            tree,
            ctx,
            emitter,
            routine_labels: HashMap::new(),
        }
    }

    pub fn generate_code(&mut self) -> PascalResult<()> {
        if !self.tree.is_checked() {
            return Err(PascalError::codegen_error("The syntax tree has not been checked"));
        }
        let tree = self.tree;
        let name = self
            .ctx
            .program_name()
            .unwrap_or(tree.program.name.as_str())
            .to_string();
        let program_label = self.ctx.named_label(assembly::PROGRAM_PREFIX, &name);

        self.emit_entry(&program_label)?;
        procedure_handlers::handle_block_routines(self, tree.program.block)?;

        let block = tree.block(tree.program.block);
        self.emitter.emit_instr(
            Some(&program_label),
            "enter",
            &format!("${},${}", frame::frame_size(block.frame_bytes), block.frame_level),
            &format!("Start of {}", name),
        )?;
        statement_handlers::handle_statements(self, &block.statements)?;
        self.emit("leave", "")?;
        self.emitter.emit_commented("ret", "", &format!("End of {}", name))
    }

    // Declares the runtime primitives and the process entry points
    fn emit_entry(&mut self, program_label: &str) -> PascalResult<()> {
        for function in runtime_functions::ALL {
            self.emitter
                .emit_directive(&format!("{} {}", assembly::EXTERN_DIRECTIVE, function))?;
        }
        for entry in assembly::ENTRY_POINTS {
            self.emitter
                .emit_directive(&format!("{} {}", assembly::GLOBAL_DIRECTIVE, entry))?;
        }
        self.emitter.emit_label(assembly::ENTRY_POINTS[0])?;
        self.emitter
            .emit_instr(Some(assembly::ENTRY_POINTS[1]), "call", program_label, "Start program")?;
        self.emitter.emit_commented("movl", "$0,%eax", "Set status 0 and")?;
        self.emitter.emit_commented("ret", "", "terminate the program")
    }

    pub(crate) fn emit(&mut self, opcode: &str, operands: &str) -> PascalResult<()> {
        self.emitter.emit(opcode, operands)
    }

    pub(crate) fn routine_label(&self, id: DeclId) -> PascalResult<String> {
        self.routine_labels.get(&id).cloned().ok_or_else(|| {
            let decl = self.tree.decl(id);
            PascalError::codegen_error_with_line(format!("No label allocated for {}", decl.name), decl.line)
        })
    }
}

/// Generates code for a checked tree into `emitter`.
pub fn generate(tree: &SyntaxTree, ctx: &mut CompileContext, emitter: &mut dyn CodeEmitter) -> PascalResult<()> {
    CodeGenerator::new(tree, ctx, emitter).generate_code()
}
