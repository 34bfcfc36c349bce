use crate::ast::{BlockId, Constant, DeclId, NameRef, TypeExpr};
use crate::errors::{PascalError, PascalResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutineKind {
    Procedure,
    Function(NameRef),
}

#[derive(Debug, Clone)]
pub struct Routine {
    pub kind: RoutineKind,
    pub params: Vec<DeclId>,
    // `None` only for the library `write`
    pub body: Option<BlockId>,
}

impl Routine {
    pub fn is_function(&self) -> bool {
        matches!(self.kind, RoutineKind::Function(_))
    }

    /// Routines without parameters run inside the caller's frame.
    pub fn is_inline(&self) -> bool {
        self.params.is_empty()
    }

    pub fn is_builtin(&self) -> bool {
        self.body.is_none()
    }
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    Const { value: Constant },
    Type { ty: TypeExpr },
    Var { ty: TypeExpr },
    Param { ty: NameRef },
    EnumLiteral { code: i64 },
    Routine(Routine),
}

/// Where a variable, parameter or function result lives at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub frame_level: usize,
    pub offset: i32,
    // Loads the frame pointer into %edx
    pub base_operand: String,
    // Addresses the word through %edx
    pub slot_operand: String,
}

impl Layout {
    pub fn new(frame_level: usize, offset: i32) -> Self {
        Self {
            frame_level,
            offset,
            base_operand: crate::config::frame::display_operand(frame_level),
            slot_operand: format!("{}({})", offset, crate::config::assembly::SCRATCH_REG),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Decl {
    pub name: String,
    pub line: usize,
    pub kind: DeclKind,
    level: Option<usize>,
    layout: Option<Layout>,
}

impl Decl {
    pub fn new(name: impl Into<String>, line: usize, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            line,
            kind,
            level: None,
            layout: None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            DeclKind::Const { .. } => "constant",
            DeclKind::Type { .. } => "type",
            DeclKind::Var { .. } => "variable",
            DeclKind::Param { .. } => "parameter",
            DeclKind::EnumLiteral { .. } => "enumeration literal",
            DeclKind::Routine(routine) => match routine.kind {
                RoutineKind::Procedure => "procedure",
                RoutineKind::Function(_) => "function",
            },
        }
    }

    pub fn routine(&self) -> Option<&Routine> {
        match &self.kind {
            DeclKind::Routine(routine) => Some(routine),
            _ => None,
        }
    }

    pub fn level(&self) -> Option<usize> {
        self.level
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn assign_level(&mut self, level: usize) -> PascalResult<()> {
        if self.level.is_some() {
            return Err(self.already_assigned());
        }
        self.level = Some(level);
        Ok(())
    }

    pub fn assign_layout(&mut self, layout: Layout) -> PascalResult<()> {
        if self.layout.is_some() {
            return Err(self.already_assigned());
        }
        self.layout = Some(layout);
        Ok(())
    }

    fn already_assigned(&self) -> PascalError {
        PascalError::LayoutAlreadyAssigned {
            name: self.name.clone(),
            line: self.line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_write_once() {
        let mut decl = Decl::new("x", 3, DeclKind::EnumLiteral { code: 0 });
        assert!(decl.assign_layout(Layout::new(1, -36)).is_ok());
        let err = decl.assign_layout(Layout::new(1, -40)).unwrap_err();
        assert!(matches!(err, PascalError::LayoutAlreadyAssigned { line: 3, .. }));
        assert_eq!(decl.layout().map(|l| l.offset), Some(-36));
    }

    #[test]
    fn layout_operands() {
        let layout = Layout::new(2, 12);
        assert_eq!(layout.base_operand, "-8(%ebp)");
        assert_eq!(layout.slot_operand, "12(%edx)");
    }
}
