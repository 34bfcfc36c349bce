use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PascalError {
    // File and I/O errors
    FileReadError(String),
    FileWriteError(String),
    IoError(io::Error),

    // Lexical analysis errors
    IllegalCharacter {
        character: char,
        line: usize,
    },
    UnterminatedComment {
        line: usize,
    },
    UnterminatedString {
        line: usize,
    },
    InvalidNumber {
        number: String,
        line: usize,
    },

    // Parsing errors
    SyntaxError {
        expected: String,
        found: String,
        line: usize,
    },

    // Semantic analysis errors
    DuplicateDeclaration {
        name: String,
        line: usize,
    },
    UndefinedSymbol {
        name: String,
        line: usize,
    },
    NotAssignable {
        name: String,
        kind: String,
        line: usize,
    },
    NotARoutine {
        name: String,
        kind: String,
        line: usize,
    },
    RoutineKindMismatch {
        name: String,
        expected: String,
        found: String,
        line: usize,
    },
    ProcedureAsValue {
        name: String,
        line: usize,
    },
    NotAValue {
        name: String,
        kind: String,
        line: usize,
    },
    NotAType {
        name: String,
        kind: String,
        line: usize,
    },
    NotAConstant {
        name: String,
        kind: String,
        line: usize,
    },
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
        line: usize,
    },
    NestingTooDeep {
        name: String,
        level: usize,
        line: usize,
    },
    LayoutAlreadyAssigned {
        name: String,
        line: usize,
    },

    // Code generation errors
    CodeGenError {
        message: String,
        line: Option<usize>,
    },

    // Compilation pipeline errors
    CompilationError {
        stage: String,
        message: String,
    },
}

impl PascalError {
    /// Create a syntax error
    pub fn syntax_error(expected: impl Into<String>, found: impl Into<String>, line: usize) -> Self {
        PascalError::SyntaxError {
            expected: expected.into(),
            found: found.into(),
            line,
        }
    }

    /// Create a code generation error
    pub fn codegen_error(message: impl Into<String>) -> Self {
        PascalError::CodeGenError {
            message: message.into(),
            line: None,
        }
    }

    /// Create a code generation error with line information
    pub fn codegen_error_with_line(message: impl Into<String>, line: usize) -> Self {
        PascalError::CodeGenError {
            message: message.into(),
            line: Some(line),
        }
    }

    /// Create a compilation error for a specific stage
    pub fn compilation_error(stage: impl Into<String>, message: impl Into<String>) -> Self {
        PascalError::CompilationError {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Source line the diagnostic points at, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            PascalError::IllegalCharacter { line, .. }
            | PascalError::UnterminatedComment { line }
            | PascalError::UnterminatedString { line }
            | PascalError::InvalidNumber { line, .. }
            | PascalError::SyntaxError { line, .. }
            | PascalError::DuplicateDeclaration { line, .. }
            | PascalError::UndefinedSymbol { line, .. }
            | PascalError::NotAssignable { line, .. }
            | PascalError::NotARoutine { line, .. }
            | PascalError::RoutineKindMismatch { line, .. }
            | PascalError::ProcedureAsValue { line, .. }
            | PascalError::NotAValue { line, .. }
            | PascalError::NotAType { line, .. }
            | PascalError::NotAConstant { line, .. }
            | PascalError::ArgumentCountMismatch { line, .. }
            | PascalError::NestingTooDeep { line, .. }
            | PascalError::LayoutAlreadyAssigned { line, .. } => Some(*line),
            PascalError::CodeGenError { line, .. } => *line,
            PascalError::FileReadError(_)
            | PascalError::FileWriteError(_)
            | PascalError::IoError(_)
            | PascalError::CompilationError { .. } => None,
        }
    }
}

impl fmt::Display for PascalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PascalError::FileReadError(msg) => write!(f, "File read error: {}", msg),
            PascalError::FileWriteError(msg) => write!(f, "File write error: {}", msg),
            PascalError::IoError(err) => write!(f, "I/O error: {}", err),

            PascalError::IllegalCharacter { character, line } => {
                write!(f, "Scanner error on line {}: Illegal character: '{}'!", line, character)
            }
            PascalError::UnterminatedComment { line } => {
                write!(f, "Scanner error on line {}: No end for comment!", line)
            }
            PascalError::UnterminatedString { line } => {
                write!(f, "Scanner error on line {}: Text string without end!", line)
            }
            PascalError::InvalidNumber { number, line } => {
                write!(f, "Scanner error on line {}: Invalid number '{}'", line, number)
            }

            PascalError::SyntaxError { expected, found, line } => {
                write!(f, "Error at line {}: Expected a {} but found a {}!", line, expected, found)
            }

            PascalError::DuplicateDeclaration { name, line } => {
                write!(f, "Error at line {}: {} declared twice in same block!", line, name)
            }
            PascalError::UndefinedSymbol { name, line } => {
                write!(f, "Error at line {}: Name {} is unknown!", line, name)
            }
            PascalError::NotAssignable { name, kind, line } => {
                write!(f, "Error at line {}: {} {} can not be assigned to!", line, kind, name)
            }
            PascalError::NotARoutine { name, kind, line } => {
                write!(f, "Error at line {}: {} {} can not be called!", line, kind, name)
            }
            PascalError::RoutineKindMismatch { name, expected, found, line } => {
                write!(f, "Error at line {}: {} is a {}, expected a {}!", line, name, found, expected)
            }
            PascalError::ProcedureAsValue { name, line } => {
                write!(f, "Error at line {}: Procedure {} can not be used as a value!", line, name)
            }
            PascalError::NotAValue { name, kind, line } => {
                write!(f, "Error at line {}: {} {} can not be used as a value!", line, kind, name)
            }
            PascalError::NotAType { name, kind, line } => {
                write!(f, "Error at line {}: {} is a {}, not a type!", line, name, kind)
            }
            PascalError::NotAConstant { name, kind, line } => {
                write!(f, "Error at line {}: {} is a {}, not a constant!", line, name, kind)
            }
            PascalError::ArgumentCountMismatch { name, expected, found, line } => {
                write!(
                    f,
                    "Error at line {}: {} expects {} argument(s) but was given {}!",
                    line, name, expected, found
                )
            }
            PascalError::NestingTooDeep { name, level, line } => {
                write!(f, "Error at line {}: {} is nested too deeply (frame level {})!", line, name, level)
            }
            PascalError::LayoutAlreadyAssigned { name, line } => {
                write!(f, "Error at line {}: storage for {} was already laid out!", line, name)
            }

            PascalError::CodeGenError { message, line } => {
                if let Some(l) = line {
                    write!(f, "Code generation error at line {}: {}", l, message)
                } else {
                    write!(f, "Code generation error: {}", message)
                }
            }

            PascalError::CompilationError { stage, message } => {
                write!(f, "Compilation error in {}: {}", stage, message)
            }
        }
    }
}

impl std::error::Error for PascalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PascalError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PascalError {
    fn from(err: io::Error) -> Self {
        PascalError::IoError(err)
    }
}

// Type alias for Result with PascalError
pub type PascalResult<T> = Result<T, PascalError>;
