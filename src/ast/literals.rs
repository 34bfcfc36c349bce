use crate::ast::NameRef;

#[derive(Debug, Clone)]
pub enum Constant {
    Number { value: i64, line: usize },
    Char { value: char, line: usize },
    Str { value: String, line: usize },
    Named(NameRef),
}

impl Constant {
    /// A one-character string token is a character literal.
    pub fn from_string_token(value: String, line: usize) -> Self {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Constant::Char { value: ch, line },
            _ => Constant::Str { value, line },
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Constant::Number { line, .. } | Constant::Char { line, .. } | Constant::Str { line, .. } => *line,
            Constant::Named(name) => name.line,
        }
    }
}

// Placeholder value for a string used as a number
pub fn string_value(s: &str) -> i64 {
    s.chars().map(|c| c as i64).sum()
}
