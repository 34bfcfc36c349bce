// src/code_emitter.rs
use crate::config::assembly::{COMMENT_PREFIX, INSTRUCTION_INDENT, OPCODE_WIDTH, OPERAND_WIDTH};
use crate::errors::PascalResult;

pub trait CodeEmitter {
    fn emit_instr(&mut self, label: Option<&str>, opcode: &str, operands: &str, comment: &str) -> PascalResult<()>;
    fn emit_label(&mut self, label: &str) -> PascalResult<()>;
    fn emit_directive(&mut self, directive: &str) -> PascalResult<()>;

    fn emit(&mut self, opcode: &str, operands: &str) -> PascalResult<()> {
        self.emit_instr(None, opcode, operands, "")
    }

    fn emit_commented(&mut self, opcode: &str, operands: &str, comment: &str) -> PascalResult<()> {
        self.emit_instr(None, opcode, operands, comment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmLine {
    Directive(String),
    Label(String),
    Instr {
        label: Option<String>,
        opcode: String,
        operands: String,
        comment: String,
    },
}

/// Records the instruction stream so it can be inspected and rendered.
#[derive(Debug, Default, Clone)]
pub struct AsmListing {
    lines: Vec<AsmLine>,
}

impl AsmListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[AsmLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn instruction_count(&self) -> usize {
        self.lines.iter().filter(|l| matches!(l, AsmLine::Instr { .. })).count()
    }

    /// `(opcode, operands)` of every instruction, in order.
    pub fn instructions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            AsmLine::Instr { opcode, operands, .. } => Some((opcode.as_str(), operands.as_str())),
            _ => None,
        })
    }

    /// Every label in order, whether on its own line or attached to an instruction.
    pub fn labels(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                AsmLine::Label(label) => Some(label.as_str()),
                AsmLine::Instr { label: Some(label), .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, opcode: &str, operands: &str) -> usize {
        self.instructions().filter(|(o, a)| *o == opcode && *a == operands).count()
    }

    pub fn render(&self) -> String {
        let mut output = String::with_capacity(self.lines.len() * 48);
        for line in &self.lines {
            match line {
                AsmLine::Directive(text) => {
                    output.push_str(text);
                    output.push('\n');
                }
                AsmLine::Label(label) => {
                    output.push_str(label);
                    output.push_str(":\n");
                }
                AsmLine::Instr { label, opcode, operands, comment } => {
                    output.push_str(&render_label_column(label.as_deref()));
                    let mut text = format!("{:<ow$} {:<aw$}", opcode, operands, ow = OPCODE_WIDTH, aw = OPERAND_WIDTH);
                    if !comment.is_empty() {
                        text.push(' ');
                        text.push_str(COMMENT_PREFIX);
                        text.push_str(comment);
                    }
                    output.push_str(text.trim_end());
                    output.push('\n');
                }
            }
        }
        output
    }
}

// Short labels share the line with their instruction, long ones get a line of their own
fn render_label_column(label: Option<&str>) -> String {
    match label {
        None => INSTRUCTION_INDENT.to_string(),
        Some(label) if label.len() < INSTRUCTION_INDENT.len() => {
            format!("{:<width$}", format!("{}:", label), width = INSTRUCTION_INDENT.len())
        }
        Some(label) => format!("{}:\n{}", label, INSTRUCTION_INDENT),
    }
}

impl CodeEmitter for AsmListing {
    fn emit_instr(&mut self, label: Option<&str>, opcode: &str, operands: &str, comment: &str) -> PascalResult<()> {
        self.lines.push(AsmLine::Instr {
            label: label.map(str::to_string),
            opcode: opcode.to_string(),
            operands: operands.to_string(),
            comment: comment.to_string(),
        });
        Ok(())
    }

    fn emit_label(&mut self, label: &str) -> PascalResult<()> {
        self.lines.push(AsmLine::Label(label.to_string()));
        Ok(())
    }

    fn emit_directive(&mut self, directive: &str) -> PascalResult<()> {
        self.lines.push(AsmLine::Directive(directive.to_string()));
        Ok(())
    }
}
