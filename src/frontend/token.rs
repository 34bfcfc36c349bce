use std::mem;

#[derive(Debug, Clone)]
pub enum Token {
    Name(String),
    IntVal(i64),
    StringVal(String),
    // Reserved words
    And,
    Array,
    Begin,
    Const,
    Div,
    Do,
    Else,
    End,
    Function,
    If,
    Mod,
    Not,
    Of,
    Or,
    Procedure,
    Program,
    Then,
    Type,
    Var,
    While,
    // Operators and delimiters
    Add,
    Subtract,
    Multiply,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Assign,
    Colon,
    Semicolon,
    Comma,
    Dot,
    Range,
    LeftPar,
    RightPar,
    LeftBracket,
    RightBracket,
    Eof,
}

impl Token {
    pub fn is_rel_opr(&self) -> bool {
        matches!(
            self,
            Token::Equal
                | Token::NotEqual
                | Token::Less
                | Token::LessEqual
                | Token::Greater
                | Token::GreaterEqual
        )
    }

    pub fn is_prefix_opr(&self) -> bool {
        matches!(self, Token::Add | Token::Subtract)
    }

    pub fn is_term_opr(&self) -> bool {
        matches!(self, Token::Add | Token::Subtract | Token::Or)
    }

    pub fn is_factor_opr(&self) -> bool {
        matches!(self, Token::Multiply | Token::Div | Token::Mod | Token::And)
    }

    /// Name of the token kind, as used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Name(_) => "name",
            Token::IntVal(_) => "number",
            Token::StringVal(_) => "text string",
            Token::And => "and",
            Token::Array => "array",
            Token::Begin => "begin",
            Token::Const => "const",
            Token::Div => "div",
            Token::Do => "do",
            Token::Else => "else",
            Token::End => "end",
            Token::Function => "function",
            Token::If => "if",
            Token::Mod => "mod",
            Token::Not => "not",
            Token::Of => "of",
            Token::Or => "or",
            Token::Procedure => "procedure",
            Token::Program => "program",
            Token::Then => "then",
            Token::Type => "type",
            Token::Var => "var",
            Token::While => "while",
            Token::Add => "+",
            Token::Subtract => "-",
            Token::Multiply => "*",
            Token::Equal => "=",
            Token::NotEqual => "<>",
            Token::Less => "<",
            Token::LessEqual => "<=",
            Token::Greater => ">",
            Token::GreaterEqual => ">=",
            Token::Assign => ":=",
            Token::Colon => ":",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Range => "..",
            Token::LeftPar => "(",
            Token::RightPar => ")",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::Eof => "e-o-f",
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        //This can be used to compare enums that carry data, while disregarding the actual data:
        mem::discriminant(self) == mem::discriminant(other)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Name(id) => write!(f, "name '{}'", id),
            Token::IntVal(n) => write!(f, "number {}", n),
            Token::StringVal(s) => write!(f, "text string '{}'", s),
            other => write!(f, "{}", other.kind_name()),
        }
    }
}
