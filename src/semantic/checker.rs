use crate::ast::{
    BlockId, Constant, DeclId, DeclKind, Expression, Factor, Layout, NameRef, RoutineKind,
    SimpleExpr, Statement, SyntaxTree, Term, TypeExpr, VariableRef,
};
use crate::config::frame::{MAX_FRAME_LEVEL, RETURN_SLOT_OFFSET};
use crate::context::CompileContext;
use crate::errors::{PascalError, PascalResult};
use crate::semantic::library;
use crate::semantic::scope_info::{parameter_offset, ScopeInfo};

/// Resolves every name of a parsed tree and lays out its storage.
pub struct Checker<'a> {
    tree: &'a mut SyntaxTree,
    ctx: &'a mut CompileContext,
    scope: ScopeInfo,
}

impl<'a> Checker<'a> {
    pub fn new(tree: &'a mut SyntaxTree, ctx: &'a mut CompileContext) -> Self {
        Self {
            tree,
            ctx,
            scope: ScopeInfo::new(),
        }
    }

    pub fn check(mut self) -> PascalResult<()> {
        if self.tree.is_checked() {
            self.ctx.log.note("Tree is already checked; layout left unchanged");
            return Ok(());
        }
        library::install(self.tree)?;
        let program = self.tree.program.clone();
        self.check_block(program.block, &program.name, &[], true)?;
        self.tree.mark_checked();
        Ok(())
    }

    fn check_block(&mut self, block: BlockId, owner_name: &str, params: &[DeclId], owns_frame: bool) -> PascalResult<()> {
        self.scope.push_scope(block, owns_frame);
        let level = self.scope.level();
        let frame_level = self.scope.frame_level();
        if frame_level > MAX_FRAME_LEVEL {
            return Err(PascalError::NestingTooDeep {
                name: owner_name.to_string(),
                level: frame_level,
                line: self.tree.block(self.scope.block()).line,
            });
        }
        {
            let b = self.tree.block_mut(block);
            b.level = level;
            b.frame_level = frame_level;
            b.frame_owner = Some(self.scope.frame_owner());
        }

        for (index, &param) in params.iter().enumerate() {
            let decl = self.tree.decl_mut(param);
            decl.assign_level(level)?;
            decl.assign_layout(Layout::new(frame_level, parameter_offset(index)))?;
            self.tree.declare(block, param)?;
        }

        let decls: Vec<DeclId> = self.tree.block(block).declarations().collect();
        for decl in decls {
            self.declare(block, decl)?;
        }

        let routines: Vec<DeclId> = self.tree.block(block).routines().collect();
        for id in routines {
            let decl = self.tree.decl(id);
            let name = decl.name.clone();
            if let Some(routine) = decl.routine().cloned() {
                if let Some(body) = routine.body {
                    self.check_block(body, &name, &routine.params, !routine.is_inline())?;
                }
            }
        }

        let mut statements = std::mem::take(&mut self.tree.block_mut(block).statements);
        let result = statements.iter_mut().try_for_each(|s| self.check_statement(block, s));
        self.tree.block_mut(block).statements = statements;
        result?;

        let summary = self.scope.pop_scope()?;
        let b = self.tree.block_mut(block);
        b.local_bytes = summary.own_bytes;
        if owns_frame {
            b.frame_bytes = summary.frame_bytes;
        }
        Ok(())
    }

    // Registers one declaration of `block`, resolving the names it mentions first.
    fn declare(&mut self, block: BlockId, id: DeclId) -> PascalResult<()> {
        let level = self.scope.level();
        let mut kind = self.tree.decl(id).kind.clone();
        let mut literals = Vec::new();
        match &mut kind {
            DeclKind::Const { value } => self.resolve_constant(block, value)?,
            DeclKind::Type { ty } | DeclKind::Var { ty } => {
                self.resolve_type(block, ty)?;
                ty.enum_literals(&mut literals);
            }
            DeclKind::Routine(routine) => {
                if let RoutineKind::Function(result) = &mut routine.kind {
                    self.resolve_type_name(block, result)?;
                }
                for &param in &routine.params {
                    let mut param_kind = self.tree.decl(param).kind.clone();
                    if let DeclKind::Param { ty } = &mut param_kind {
                        self.resolve_type_name(block, ty)?;
                    }
                    self.tree.decl_mut(param).kind = param_kind;
                }
            }
            DeclKind::Param { .. } | DeclKind::EnumLiteral { .. } => {}
        }

        let layout = match &kind {
            DeclKind::Var { .. } => Some(Layout::new(self.scope.frame_level(), self.scope.allocate_variable())),
            DeclKind::Routine(routine) if routine.is_function() => {
                if routine.is_inline() {
                    Some(Layout::new(self.scope.frame_level(), self.scope.allocate_variable()))
                } else {
                    Some(Layout::new(self.scope.frame_level() + 1, RETURN_SLOT_OFFSET))
                }
            }
            _ => None,
        };

        let decl = self.tree.decl_mut(id);
        decl.kind = kind;
        decl.assign_level(level)?;
        if let Some(layout) = layout {
            decl.assign_layout(layout)?;
        }
        self.tree.declare(block, id)?;

        for literal in literals {
            self.tree.decl_mut(literal).assign_level(level)?;
            self.tree.declare(block, literal)?;
        }
        Ok(())
    }

    fn resolve(&mut self, block: BlockId, name: &mut NameRef) -> PascalResult<DeclId> {
        let id = self.tree.lookup(block, &name.name).ok_or_else(|| PascalError::UndefinedSymbol {
            name: name.name.clone(),
            line: name.line,
        })?;
        name.decl = Some(id);
        let decl_line = self.tree.decl(id).line;
        self.ctx.log.note_binding(&name.name, name.line, decl_line);
        Ok(id)
    }

    fn resolve_type_name(&mut self, block: BlockId, name: &mut NameRef) -> PascalResult<()> {
        let id = self.resolve(block, name)?;
        let decl = self.tree.decl(id);
        match decl.kind {
            DeclKind::Type { .. } => Ok(()),
            _ => Err(PascalError::NotAType {
                name: name.name.clone(),
                kind: decl.kind_name().to_string(),
                line: name.line,
            }),
        }
    }

    fn resolve_type(&mut self, block: BlockId, ty: &mut TypeExpr) -> PascalResult<()> {
        match ty {
            TypeExpr::Named(name) => self.resolve_type_name(block, name),
            TypeExpr::Array { index, element, .. } => {
                self.resolve_type(block, index)?;
                self.resolve_type(block, element)
            }
            TypeExpr::Range { low, high, .. } => {
                self.resolve_constant(block, low)?;
                self.resolve_constant(block, high)
            }
            TypeExpr::Enum { .. } | TypeExpr::Builtin(_) => Ok(()),
        }
    }

    fn resolve_constant(&mut self, block: BlockId, constant: &mut Constant) -> PascalResult<()> {
        let Constant::Named(name) = constant else {
            return Ok(());
        };
        let id = self.resolve(block, name)?;
        let decl = self.tree.decl(id);
        match decl.kind {
            DeclKind::Const { .. } | DeclKind::EnumLiteral { .. } => Ok(()),
            _ => Err(PascalError::NotAConstant {
                name: name.name.clone(),
                kind: decl.kind_name().to_string(),
                line: name.line,
            }),
        }
    }

    fn check_statement(&mut self, block: BlockId, statement: &mut Statement) -> PascalResult<()> {
        match statement {
            Statement::Assign { target, value, .. } => {
                self.check_assign_target(block, target)?;
                self.check_expression(block, value)
            }
            Statement::Compound { body, .. } => body.iter_mut().try_for_each(|s| self.check_statement(block, s)),
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.check_expression(block, condition)?;
                self.check_statement(block, then_branch)?;
                match else_branch {
                    Some(else_branch) => self.check_statement(block, else_branch),
                    None => Ok(()),
                }
            }
            Statement::While { condition, body, .. } => {
                self.check_expression(block, condition)?;
                self.check_statement(block, body)
            }
            Statement::Call { name, args, .. } => {
                self.check_call(block, name, args.len(), RoutineClass::Procedure)?;
                args.iter_mut().try_for_each(|arg| self.check_expression(block, arg))
            }
            Statement::Empty { .. } => Ok(()),
        }
    }

    fn check_assign_target(&mut self, block: BlockId, target: &mut VariableRef) -> PascalResult<()> {
        let id = self.resolve(block, &mut target.name)?;
        let decl = self.tree.decl(id);
        let assignable = match &decl.kind {
            DeclKind::Var { .. } | DeclKind::Param { .. } => true,
            // A function sets its result by assigning to its own name
            DeclKind::Routine(routine) => match (routine.is_function(), routine.body) {
                (true, Some(body)) => self.tree.is_within(block, body),
                _ => false,
            },
            _ => false,
        };
        if !assignable {
            return Err(PascalError::NotAssignable {
                name: target.name.name.clone(),
                kind: decl.kind_name().to_string(),
                line: target.name.line,
            });
        }
        match target.index.as_deref_mut() {
            Some(index) => self.check_expression(block, index),
            None => Ok(()),
        }
    }

    fn check_call(&mut self, block: BlockId, name: &mut NameRef, arg_count: usize, class: RoutineClass) -> PascalResult<()> {
        let id = self.resolve(block, name)?;
        let decl = self.tree.decl(id);
        let Some(routine) = decl.routine() else {
            return Err(PascalError::NotARoutine {
                name: name.name.clone(),
                kind: decl.kind_name().to_string(),
                line: name.line,
            });
        };
        let found = if routine.is_function() { RoutineClass::Function } else { RoutineClass::Procedure };
        if found != class {
            return Err(PascalError::RoutineKindMismatch {
                name: name.name.clone(),
                expected: class.name().to_string(),
                found: found.name().to_string(),
                line: name.line,
            });
        }
        // `write` takes any number of arguments
        if !routine.is_builtin() && routine.params.len() != arg_count {
            return Err(PascalError::ArgumentCountMismatch {
                name: name.name.clone(),
                expected: routine.params.len(),
                found: arg_count,
                line: name.line,
            });
        }
        Ok(())
    }

    fn check_expression(&mut self, block: BlockId, expr: &mut Expression) -> PascalResult<()> {
        self.check_simple_expr(block, &mut expr.left)?;
        match &mut expr.rel {
            Some((_, right)) => self.check_simple_expr(block, right),
            None => Ok(()),
        }
    }

    fn check_simple_expr(&mut self, block: BlockId, simple: &mut SimpleExpr) -> PascalResult<()> {
        self.check_term(block, &mut simple.first)?;
        simple.rest.iter_mut().try_for_each(|(_, term)| self.check_term(block, term))
    }

    fn check_term(&mut self, block: BlockId, term: &mut Term) -> PascalResult<()> {
        self.check_factor(block, &mut term.first)?;
        term.rest.iter_mut().try_for_each(|(_, factor)| self.check_factor(block, factor))
    }

    fn check_factor(&mut self, block: BlockId, factor: &mut Factor) -> PascalResult<()> {
        match factor {
            Factor::Constant(constant) => self.resolve_constant(block, constant),
            Factor::Inner(expr) => self.check_expression(block, expr),
            Factor::Not { operand, .. } => self.check_factor(block, operand),
            Factor::Variable(var) => {
                self.check_value_use(block, &mut var.name)?;
                match var.index.as_deref_mut() {
                    Some(index) => self.check_expression(block, index),
                    None => Ok(()),
                }
            }
            Factor::Call(call) => {
                self.check_call(block, &mut call.name, call.args.len(), RoutineClass::Function)?;
                call.args.iter_mut().try_for_each(|arg| self.check_expression(block, arg))
            }
        }
    }

    // A bare name in an expression must denote a value
    fn check_value_use(&mut self, block: BlockId, name: &mut NameRef) -> PascalResult<()> {
        let id = self.resolve(block, name)?;
        let decl = self.tree.decl(id);
        match &decl.kind {
            DeclKind::Var { .. } | DeclKind::Param { .. } | DeclKind::Const { .. } | DeclKind::EnumLiteral { .. } => Ok(()),
            DeclKind::Type { .. } => Err(PascalError::NotAValue {
                name: name.name.clone(),
                kind: decl.kind_name().to_string(),
                line: name.line,
            }),
            DeclKind::Routine(routine) => match routine.kind {
                RoutineKind::Procedure => Err(PascalError::ProcedureAsValue {
                    name: name.name.clone(),
                    line: name.line,
                }),
                // Parameterless function called without parentheses
                RoutineKind::Function(_) if routine.params.is_empty() => Ok(()),
                RoutineKind::Function(_) => Err(PascalError::ArgumentCountMismatch {
                    name: name.name.clone(),
                    expected: routine.params.len(),
                    found: 0,
                    line: name.line,
                }),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoutineClass {
    Procedure,
    Function,
}

impl RoutineClass {
    fn name(self) -> &'static str {
        match self {
            RoutineClass::Procedure => "procedure",
            RoutineClass::Function => "function",
        }
    }
}

/// Checks `tree` in place. Checking an already checked tree does nothing.
pub fn check(tree: &mut SyntaxTree, ctx: &mut CompileContext) -> PascalResult<()> {
    Checker::new(tree, ctx).check()
}
