// Abstract syntax tree for the Pascal subset.
// Blocks and declarations live in one arena (`SyntaxTree`) and refer to each
// other through `BlockId` / `DeclId` handles.

mod block;
mod declarations;
mod expressions;
mod literals;
mod program;
mod statements;
mod types;

pub use block::{Block, DeclPart};
pub use declarations::{Decl, DeclKind, Layout, Routine, RoutineKind};
pub use expressions::{
    CallExpr, Expression, Factor, FactorOp, NameRef, PrefixOp, RelOp, SimpleExpr, Term, TermOp,
    VariableRef,
};
pub use literals::{string_value, Constant};
pub use program::{Program, SyntaxTree};
pub use statements::Statement;
pub use types::{BuiltinType, TypeExpr};

/// Line number carried by nodes synthesized for the library.
pub const LIBRARY_LINE: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub usize);

/// The library block is always the first block of a tree.
pub const LIBRARY: BlockId = BlockId(0);
