use std::{
    fs::{self, File},
    io::Read,
    path::Path,
};

pub mod ast;
pub mod code_emitter;
pub mod codegen;
pub mod config;
pub mod context;
pub mod errors;
pub mod frontend;
pub mod semantic;

use crate::code_emitter::AsmListing;
use crate::context::CompileContext;
use crate::errors::{PascalError, PascalResult};

pub const VERSION: &str = "0.1.0";

pub struct LineNumber {
    pub line: usize,
}

impl Default for LineNumber {
    fn default() -> Self {
        Self { line: 1 }
    }
}

pub fn read(filename: &Path) -> PascalResult<String> {
    match filename.extension() {
        Some(ext) if ext == "pas" => {}
        _ => {
            return Err(PascalError::FileReadError("File must have a .pas extension".to_string()));
        }
    }
    let mut file = File::open(filename)
        .map_err(|e| PascalError::FileReadError(format!("{}: {}", filename.display(), e)))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Writes the rendered assembly to `path`.
pub fn write_output(path: &Path, assembly: &str) -> PascalResult<()> {
    fs::write(path, assembly).map_err(|e| PascalError::FileWriteError(format!("{}: {}", path.display(), e)))
}

/// Runs scan, parse, check and generate over `source`.
pub fn compile(source: &str, ctx: &mut CompileContext) -> PascalResult<AsmListing> {
    let mut state = LineNumber::default();
    let tokens = frontend::lexer::scan(&mut state, source)?;
    let mut tree = frontend::parser::parse(&tokens, ctx)?;
    semantic::check(&mut tree, ctx)?;
    let mut listing = AsmListing::new();
    codegen::generate(&tree, ctx, &mut listing)?;
    Ok(listing)
}
