use crate::ast::{Expression, NameRef, VariableRef};

#[derive(Debug, Clone)]
pub enum Statement {
    Assign {
        target: VariableRef,
        value: Expression,
        line: usize,
    },
    Compound {
        body: Vec<Statement>,
        line: usize,
    },
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
        line: usize,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
        line: usize,
    },
    Call {
        name: NameRef,
        args: Vec<Expression>,
        line: usize,
    },
    Empty {
        line: usize,
    },
}

impl Statement {
    pub fn line(&self) -> usize {
        match self {
            Statement::Assign { line, .. }
            | Statement::Compound { line, .. }
            | Statement::If { line, .. }
            | Statement::While { line, .. }
            | Statement::Call { line, .. }
            | Statement::Empty { line } => *line,
        }
    }
}
