use crate::ast::{BlockId, LIBRARY};
use crate::config::frame::{FIRST_LOCAL_OFFSET, FIRST_PARAM_OFFSET, WORD_SIZE};
use crate::errors::{PascalError, PascalResult};

/// Storage totals of a block, reported when its scope is popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSummary {
    pub own_bytes: i32,
    pub frame_bytes: i32,
}

/// Nesting and frame-offset state of the block being checked.
///
/// A block either owns a frame (the program block and routines with
/// parameters) or shares the frame of its enclosing block, in which case its
/// variables continue the owner's decreasing offsets.
#[derive(Debug, Clone)]
pub struct ScopeInfo {
    block: BlockId,
    current_level: usize,
    frame_level: usize,
    frame_owner: BlockId,
    owns_frame: bool,
    local_var_offset: i32,
    own_bytes: i32,
    parent: Option<Box<ScopeInfo>>,
}

impl Default for ScopeInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeInfo {
    /// The library scope at level 0.
    pub fn new() -> Self {
        ScopeInfo {
            block: LIBRARY,
            current_level: 0,
            frame_level: 0,
            frame_owner: LIBRARY,
            owns_frame: true,
            local_var_offset: FIRST_LOCAL_OFFSET,
            own_bytes: 0,
            parent: None,
        }
    }

    pub fn push_scope(&mut self, block: BlockId, owns_frame: bool) {
        let child = ScopeInfo {
            block,
            current_level: self.current_level + 1,
            frame_level: if owns_frame { self.frame_level + 1 } else { self.frame_level },
            frame_owner: if owns_frame { block } else { self.frame_owner },
            owns_frame,
            local_var_offset: if owns_frame {
                FIRST_LOCAL_OFFSET
            } else {
                self.local_var_offset
            },
            own_bytes: 0,
            parent: None,
        };
        let parent = std::mem::replace(self, child);
        self.parent = Some(Box::new(parent));
    }

    pub fn pop_scope(&mut self) -> PascalResult<FrameSummary> {
        let parent = self
            .parent
            .take()
            .ok_or_else(|| PascalError::compilation_error("checking", "Cannot pop the library scope"))?;
        let finished = std::mem::replace(self, *parent);
        if !finished.owns_frame {
            // The shared frame keeps growing
            self.local_var_offset = finished.local_var_offset;
        }
        Ok(FrameSummary {
            own_bytes: finished.own_bytes,
            frame_bytes: FIRST_LOCAL_OFFSET - finished.local_var_offset,
        })
    }

    pub fn allocate_variable(&mut self) -> i32 {
        let offset = self.local_var_offset;
        self.local_var_offset -= WORD_SIZE;
        self.own_bytes += WORD_SIZE;
        offset
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn level(&self) -> usize {
        self.current_level
    }

    pub fn frame_level(&self) -> usize {
        self.frame_level
    }

    pub fn frame_owner(&self) -> BlockId {
        self.frame_owner
    }

    pub fn owns_frame(&self) -> bool {
        self.owns_frame
    }
}

/// Offset of the parameter at `index`; parameters grow upwards from the return address.
pub fn parameter_offset(index: usize) -> i32 {
    FIRST_PARAM_OFFSET + WORD_SIZE * index as i32
}
