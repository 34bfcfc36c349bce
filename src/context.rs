use crate::config::{assembly, labels};

/// Optional trace of the parser and the name binder.
#[derive(Debug, Default, Clone)]
pub struct CompileLog {
    pub parser: bool,
    pub binding: bool,
    lines: Vec<String>,
    depth: usize,
}

impl CompileLog {
    pub fn new(parser: bool, binding: bool) -> Self {
        Self {
            parser,
            binding,
            ..Self::default()
        }
    }

    pub fn enter_parser(&mut self, production: &str) {
        if self.parser {
            self.lines.push(format!("{}<{}>", "  ".repeat(self.depth), production));
            self.depth += 1;
        }
    }

    pub fn leave_parser(&mut self, production: &str) {
        if self.parser {
            self.depth = self.depth.saturating_sub(1);
            self.lines.push(format!("{}</{}>", "  ".repeat(self.depth), production));
        }
    }

    pub fn note_binding(&mut self, name: &str, use_line: usize, decl_line: usize) {
        if self.binding {
            let place = if decl_line == crate::ast::LIBRARY_LINE {
                "in the library".to_string()
            } else {
                format!("on line {}", decl_line)
            };
            self.lines.push(format!("Binding on line {}: {} was declared {}", use_line, name, place));
        }
    }

    pub fn note(&mut self, message: impl Into<String>) {
        if self.parser || self.binding {
            self.lines.push(message.into());
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

/// State shared by parse, check and generate for one compilation.
#[derive(Debug, Default)]
pub struct CompileContext {
    label_counter: u32,
    program_name: Option<String>,
    pub log: CompileLog,
}

impl CompileContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: CompileLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// A fresh branch or data label: `.L0001`, `.L0002`, ...
    pub fn local_label(&mut self) -> String {
        self.label_counter += 1;
        format!("{}{:04}", assembly::LOCAL_LABEL_PREFIX, self.label_counter)
    }

    /// A unique label derived from a source name, e.g. `proc$q_3`.
    pub fn named_label(&mut self, prefix: &str, name: &str) -> String {
        self.label_counter += 1;
        format!("{}{}_{}", prefix, labels::sanitize(name), self.label_counter)
    }

    pub fn labels_used(&self) -> u32 {
        self.label_counter
    }

    // Replaces the name left by an earlier compilation
    pub fn set_program_name(&mut self, name: &str) {
        self.program_name = Some(name.to_string());
    }

    pub fn program_name(&self) -> Option<&str> {
        self.program_name.as_deref()
    }
}
