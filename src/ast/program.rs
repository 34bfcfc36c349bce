use crate::ast::{Block, BlockId, Decl, DeclId, LIBRARY};
use crate::errors::{PascalError, PascalResult};

#[derive(Debug, Clone)]
pub struct Program {
    pub name: String,
    pub line: usize,
    pub block: BlockId,
}

/// Owns every block and declaration of one compilation.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub program: Program,
    pub blocks: Vec<Block>,
    pub decls: Vec<Decl>,
    checked: bool,
}

impl SyntaxTree {
    pub fn new(program: Program, blocks: Vec<Block>, decls: Vec<Decl>) -> Self {
        Self {
            program,
            blocks,
            decls,
            checked: false,
        }
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.0]
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.0]
    }

    pub fn add_decl(&mut self, decl: Decl) -> DeclId {
        self.decls.push(decl);
        DeclId(self.decls.len() - 1)
    }

    pub fn library(&self) -> &Block {
        self.block(LIBRARY)
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub(crate) fn mark_checked(&mut self) {
        self.checked = true;
    }

    /// Inserts `decl` into the table of `block`. A name may be declared once per block.
    pub fn declare(&mut self, block: BlockId, decl: DeclId) -> PascalResult<()> {
        let name = self.decl(decl).name.clone();
        if self.block(block).table.contains_key(&name) {
            return Err(PascalError::DuplicateDeclaration {
                name,
                line: self.decl(decl).line,
            });
        }
        self.block_mut(block).table.insert(name, decl);
        Ok(())
    }

    /// Searches `block` and then its enclosing blocks out to the library.
    pub fn lookup(&self, block: BlockId, name: &str) -> Option<DeclId> {
        let mut current = Some(block);
        while let Some(id) = current {
            let b = self.block(id);
            if let Some(decl) = b.table.get(name) {
                return Some(*decl);
            }
            current = b.enclosing;
        }
        None
    }

    /// True when `inner` is `outer` or nested somewhere inside it.
    pub fn is_within(&self, inner: BlockId, outer: BlockId) -> bool {
        let mut current = Some(inner);
        while let Some(id) = current {
            if id == outer {
                return true;
            }
            current = self.block(id).enclosing;
        }
        false
    }
}
