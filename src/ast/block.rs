use crate::ast::{BlockId, DeclId, Statement, LIBRARY_LINE};
use std::collections::HashMap;

/// One declaration section, kept in source order.
#[derive(Debug, Clone)]
pub enum DeclPart {
    Consts(Vec<DeclId>),
    Types(Vec<DeclId>),
    Vars(Vec<DeclId>),
    Routine(DeclId),
}

#[derive(Debug, Clone)]
pub struct Block {
    pub line: usize,
    pub parts: Vec<DeclPart>,
    pub statements: Vec<Statement>,
    // Filled by the checker
    pub table: HashMap<String, DeclId>,
    pub enclosing: Option<BlockId>,
    pub level: usize,
    pub frame_level: usize,
    // Block whose frame stores this block's variables
    pub frame_owner: Option<BlockId>,
    // Bytes of this block's own variables
    pub local_bytes: i32,
    // Bytes reserved by `enter` for a frame-owning block, inline descendants included
    pub frame_bytes: i32,
}

impl Block {
    pub fn new(enclosing: Option<BlockId>, line: usize) -> Self {
        Self {
            line,
            parts: Vec::new(),
            statements: Vec::new(),
            table: HashMap::new(),
            enclosing,
            level: 0,
            frame_level: 0,
            frame_owner: None,
            local_bytes: 0,
            frame_bytes: 0,
        }
    }

    pub fn library() -> Self {
        Self::new(None, LIBRARY_LINE)
    }

    pub fn owns_frame(&self, id: BlockId) -> bool {
        self.frame_owner == Some(id)
    }

    /// Every declaration of the block in source order, routines included.
    pub fn declarations(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.parts.iter().flat_map(|part| match part {
            DeclPart::Consts(ids) | DeclPart::Types(ids) | DeclPart::Vars(ids) => ids.as_slice(),
            DeclPart::Routine(id) => std::slice::from_ref(id),
        })
        .copied()
    }

    pub fn routines(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.parts.iter().filter_map(|part| match part {
            DeclPart::Routine(id) => Some(*id),
            _ => None,
        })
    }
}
