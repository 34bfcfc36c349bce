use crate::ast::{Constant, DeclId};

/// A use of a name. The checker stores the declaration it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRef {
    pub name: String,
    pub line: usize,
    pub decl: Option<DeclId>,
}

impl NameRef {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            decl: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl RelOp {
    /// Condition suffix for `setX`.
    pub fn condition(self) -> &'static str {
        match self {
            RelOp::Equal => "e",
            RelOp::NotEqual => "ne",
            RelOp::Less => "l",
            RelOp::LessEqual => "le",
            RelOp::Greater => "g",
            RelOp::GreaterEqual => "ge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermOp {
    Add,
    Subtract,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorOp {
    Multiply,
    Div,
    Mod,
    And,
}

#[derive(Debug, Clone)]
pub struct Expression {
    pub left: SimpleExpr,
    pub rel: Option<(RelOp, SimpleExpr)>,
    pub line: usize,
}

impl Expression {
    /// The single factor this expression consists of, if it is that simple.
    pub fn as_bare_factor(&self) -> Option<&Factor> {
        if self.rel.is_some() || self.left.prefix.is_some() || !self.left.rest.is_empty() {
            return None;
        }
        let term = &self.left.first;
        if term.rest.is_empty() {
            Some(&term.first)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimpleExpr {
    pub prefix: Option<PrefixOp>,
    pub first: Term,
    pub rest: Vec<(TermOp, Term)>,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct Term {
    pub first: Factor,
    pub rest: Vec<(FactorOp, Factor)>,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct VariableRef {
    pub name: NameRef,
    pub index: Option<Box<Expression>>,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub name: NameRef,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone)]
pub enum Factor {
    // Literal constants only; named constants parse as variable references
    Constant(Constant),
    Inner(Box<Expression>),
    Not { operand: Box<Factor>, line: usize },
    Variable(VariableRef),
    Call(CallExpr),
}

impl Factor {
    pub fn line(&self) -> usize {
        match self {
            Factor::Constant(constant) => constant.line(),
            Factor::Inner(expr) => expr.line,
            Factor::Not { line, .. } => *line,
            Factor::Variable(var) => var.name.line,
            Factor::Call(call) => call.name.line,
        }
    }
}
