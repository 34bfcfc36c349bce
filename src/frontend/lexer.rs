use crate::errors::{PascalError, PascalResult};
use crate::frontend::token::Token;
use crate::LineNumber;
use std::{iter::Peekable, str::Chars};

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    state: &'a mut LineNumber,
}

impl<'a> Lexer<'a> {
    pub fn new(file_content: &'a str, state: &'a mut LineNumber) -> Self {
        Self {
            chars: file_content.chars().peekable(),
            state,
        }
    }

    /// Scans the whole input. The returned stream always ends with `Token::Eof`.
    pub fn scan(mut self) -> PascalResult<Vec<(Token, usize)>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments()?;
            let line = self.state.line;
            match self.scan_token()? {
                Some(token) => tokens.push((token, line)),
                None => {
                    tokens.push((Token::Eof, line));
                    break;
                }
            }
        }
        Ok(tokens)
    }

    fn skip_whitespace_and_comments(&mut self) -> PascalResult<()> {
        loop {
            match self.chars.peek().copied() {
                Some('{') => self.scan_brace_comment()?,
                Some('/') if self.starts_block_comment() => self.scan_block_comment()?,
                Some(ch) if ch.is_whitespace() => self.scan_whitespace(),
                _ => break,
            }
        }
        Ok(())
    }

    fn starts_block_comment(&self) -> bool {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.peek() == Some(&'*')
    }

    fn scan_token(&mut self) -> PascalResult<Option<Token>> {
        match self.chars.peek().copied() {
            None => Ok(None),
            Some(ch) if ch.is_ascii_alphabetic() => Ok(Some(self.scan_name())),
            Some(ch) if ch.is_ascii_digit() => Ok(Some(self.scan_number()?)),
            Some('\'') => Ok(Some(self.scan_string_literal()?)),
            Some(':') => Ok(Some(self.scan_colon())),
            Some('.') => Ok(Some(self.scan_dot())),
            Some('<') => Ok(Some(self.scan_less_than())),
            Some('>') => Ok(Some(self.scan_greater_than())),
            Some(ch) => Ok(Some(self.scan_single_char_token(ch)?)),
        }
    }

    fn scan_brace_comment(&mut self) -> PascalResult<()> {
        self.chars.next(); // Consume '{'
        let start_line = self.state.line;
        while let Some(ch) = self.chars.next() {
            if ch == '\n' {
                self.state.line += 1;
            } else if ch == '}' {
                return Ok(());
            }
        }
        Err(PascalError::UnterminatedComment { line: start_line })
    }

    fn scan_block_comment(&mut self) -> PascalResult<()> {
        self.chars.next(); // Consume '/'
        self.chars.next(); // Consume '*'
        let start_line = self.state.line;
        while let Some(ch) = self.chars.next() {
            match ch {
                '\n' => self.state.line += 1,
                '*' if self.chars.peek() == Some(&'/') => {
                    self.chars.next();
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(PascalError::UnterminatedComment { line: start_line })
    }

    fn scan_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                if ch == '\n' {
                    self.state.line += 1;
                }
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn scan_name(&mut self) -> Token {
        let mut name = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                name.push(ch.to_ascii_lowercase());
                self.chars.next();
            } else {
                break;
            }
        }
        keyword_or_name(name)
    }

    fn scan_number(&mut self) -> PascalResult<Token> {
        let mut number_str = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() {
                number_str.push(ch);
                self.chars.next();
            } else {
                break;
            }
        }
        // Values must fit a 32-bit immediate
        number_str
            .parse::<i32>()
            .map(|value| Token::IntVal(i64::from(value)))
            .map_err(|_| PascalError::InvalidNumber { number: number_str, line: self.state.line })
    }

    // Pascal strings are quoted with ' and a doubled '' stands for one quote.
    fn scan_string_literal(&mut self) -> PascalResult<Token> {
        self.chars.next(); // Consume opening quote
        let mut literal = String::new();
        loop {
            match self.chars.next() {
                Some('\'') => {
                    if self.chars.peek() == Some(&'\'') {
                        self.chars.next();
                        literal.push('\'');
                    } else {
                        break;
                    }
                }
                Some('\n') | None => {
                    return Err(PascalError::UnterminatedString { line: self.state.line });
                }
                Some(ch) => literal.push(ch),
            }
        }
        Ok(Token::StringVal(literal))
    }

    fn scan_colon(&mut self) -> Token {
        self.chars.next(); // Consume ':'
        if self.chars.peek() == Some(&'=') {
            self.chars.next();
            Token::Assign
        } else {
            Token::Colon
        }
    }

    fn scan_dot(&mut self) -> Token {
        self.chars.next(); // Consume '.'
        if self.chars.peek() == Some(&'.') {
            self.chars.next();
            Token::Range
        } else {
            Token::Dot
        }
    }

    fn scan_less_than(&mut self) -> Token {
        self.chars.next(); // Consume '<'
        match self.chars.peek() {
            Some(&'=') => {
                self.chars.next();
                Token::LessEqual
            }
            Some(&'>') => {
                self.chars.next();
                Token::NotEqual
            }
            _ => Token::Less,
        }
    }

    fn scan_greater_than(&mut self) -> Token {
        self.chars.next(); // Consume '>'
        if self.chars.peek() == Some(&'=') {
            self.chars.next();
            Token::GreaterEqual
        } else {
            Token::Greater
        }
    }

    fn scan_single_char_token(&mut self, ch: char) -> PascalResult<Token> {
        self.chars.next(); // Consume the character
        let token = match ch {
            '+' => Token::Add,
            '-' => Token::Subtract,
            '*' => Token::Multiply,
            '=' => Token::Equal,
            ';' => Token::Semicolon,
            ',' => Token::Comma,
            '(' => Token::LeftPar,
            ')' => Token::RightPar,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            _ => return Err(PascalError::IllegalCharacter { character: ch, line: self.state.line }),
        };
        Ok(token)
    }
}

fn keyword_or_name(name: String) -> Token {
    match name.as_str() {
        "and" => Token::And,
        "array" => Token::Array,
        "begin" => Token::Begin,
        "const" => Token::Const,
        "div" => Token::Div,
        "do" => Token::Do,
        "else" => Token::Else,
        "end" => Token::End,
        "function" => Token::Function,
        "if" => Token::If,
        "mod" => Token::Mod,
        "not" => Token::Not,
        "of" => Token::Of,
        "or" => Token::Or,
        "procedure" => Token::Procedure,
        "program" => Token::Program,
        "then" => Token::Then,
        "type" => Token::Type,
        "var" => Token::Var,
        "while" => Token::While,
        _ => Token::Name(name),
    }
}

// Scans `file_content` in one call
pub fn scan(state: &mut LineNumber, file_content: &str) -> PascalResult<Vec<(Token, usize)>> {
    let lexer = Lexer::new(file_content, state);
    lexer.scan()
}
