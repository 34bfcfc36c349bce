// Predeclared names visible to every program.

use crate::ast::{
    BuiltinType, Constant, Decl, DeclKind, Routine, RoutineKind, SyntaxTree, TypeExpr, LIBRARY,
    LIBRARY_LINE,
};
use crate::errors::PascalResult;

pub const WRITE: &str = "write";
pub const EOL: &str = "eol";

fn library_decls() -> Vec<Decl> {
    let builtin = |name: &str, ty: BuiltinType| {
        Decl::new(name, LIBRARY_LINE, DeclKind::Type { ty: TypeExpr::Builtin(ty) })
    };
    vec![
        builtin("boolean", BuiltinType::Boolean),
        builtin("char", BuiltinType::Char),
        Decl::new(
            EOL,
            LIBRARY_LINE,
            DeclKind::Const {
                value: Constant::Char { value: '\n', line: LIBRARY_LINE },
            },
        ),
        Decl::new("false", LIBRARY_LINE, DeclKind::EnumLiteral { code: 0 }),
        builtin("integer", BuiltinType::Integer),
        Decl::new("true", LIBRARY_LINE, DeclKind::EnumLiteral { code: 1 }),
        Decl::new(
            WRITE,
            LIBRARY_LINE,
            DeclKind::Routine(Routine {
                kind: RoutineKind::Procedure,
                params: Vec::new(),
                body: None,
            }),
        ),
    ]
}

/// Adds the library declarations to the first block of `tree`.
pub fn install(tree: &mut SyntaxTree) -> PascalResult<()> {
    for decl in library_decls() {
        let id = tree.add_decl(decl);
        tree.decl_mut(id).assign_level(0)?;
        tree.declare(LIBRARY, id)?;
    }
    Ok(())
}
