use pasc::ast::{
    Constant, DeclKind, DeclPart, Factor, FactorOp, RoutineKind, Statement, SyntaxTree, TermOp,
    TypeExpr, LIBRARY,
};
use pasc::context::{CompileContext, CompileLog};
use pasc::errors::{PascalError, PascalResult};
use pasc::frontend::lexer::scan;
use pasc::frontend::parser::parse;
use pasc::LineNumber;

// Helper function to scan and parse a program
fn parse_source(source: &str) -> PascalResult<SyntaxTree> {
    let mut ctx = CompileContext::new();
    let mut state = LineNumber::default();
    let tokens = scan(&mut state, source)?;
    parse(&tokens, &mut ctx)
}

fn program_statements(tree: &SyntaxTree) -> &[Statement] {
    &tree.block(tree.program.block).statements
}

// Test the smallest program
// Purpose: Ensure the program node, library block and program block are created
#[test]
fn test_empty_program() -> PascalResult<()> {
    let tree = parse_source("program Empty; begin end.")?;
    assert_eq!(tree.program.name, "empty");
    assert_eq!(tree.program.line, 1);
    assert_eq!(tree.blocks.len(), 2, "Library block plus program block");
    let block = tree.block(tree.program.block);
    assert_eq!(block.enclosing, Some(LIBRARY));
    assert!(matches!(block.statements.as_slice(), [Statement::Empty { .. }]));
    assert!(!tree.is_checked());
    Ok(())
}

// Test declaration parts in any order
// Purpose: Ensure repeated parts are kept in source order
#[test]
fn test_declaration_parts_keep_source_order() -> PascalResult<()> {
    let source = "
    program P;
    const a = 1;
    var x: integer;
    const b = 'b'; s = 'text';
    begin end.
    ";
    let tree = parse_source(source)?;
    let block = tree.block(tree.program.block);
    assert!(matches!(
        block.parts.as_slice(),
        [DeclPart::Consts(first), DeclPart::Vars(_), DeclPart::Consts(second)] if first.len() == 1 && second.len() == 2
    ));
    let names: Vec<&str> = block.declarations().map(|id| tree.decl(id).name.as_str()).collect();
    assert_eq!(names, vec!["a", "x", "b", "s"]);

    let b = block.declarations().nth(2).map(|id| tree.decl(id));
    assert!(matches!(b.map(|d| &d.kind), Some(DeclKind::Const { value: Constant::Char { value: 'b', .. } })));
    let s = block.declarations().nth(3).map(|id| tree.decl(id));
    assert!(matches!(s.map(|d| &d.kind), Some(DeclKind::Const { value: Constant::Str { .. } })));
    Ok(())
}

// Test routine declarations
// Purpose: Ensure parameters, result type and nested body are recorded
#[test]
fn test_function_declaration() -> PascalResult<()> {
    let source = "
    program P;
    function max(a: integer; b: integer): integer;
    begin
        if a > b then max := a else max := b
    end;
    procedure nothing;
    begin end;
    begin end.
    ";
    let tree = parse_source(source)?;
    let block = tree.block(tree.program.block);
    let routines: Vec<_> = block.routines().map(|id| tree.decl(id)).collect();
    assert_eq!(routines.len(), 2);

    let max = routines[0].routine().expect("max is a routine");
    assert_eq!(routines[0].line, 3);
    assert!(matches!(&max.kind, RoutineKind::Function(result) if result.name == "integer"));
    let params: Vec<&str> = max.params.iter().map(|id| tree.decl(*id).name.as_str()).collect();
    assert_eq!(params, vec!["a", "b"]);
    let body = max.body.expect("max has a body");
    assert_eq!(tree.block(body).enclosing, Some(tree.program.block));

    let nothing = routines[1].routine().expect("nothing is a routine");
    assert_eq!(nothing.kind, RoutineKind::Procedure);
    assert!(nothing.params.is_empty());
    Ok(())
}

// Test statement disambiguation
// Purpose: Ensure a leading name is an assignment before := or [ and a call otherwise
#[test]
fn test_assignment_versus_call() -> PascalResult<()> {
    let source = "program P; begin x := 1; q; q(1, 2); a[1] := 3; write end.";
    let tree = parse_source(source)?;
    let statements = program_statements(&tree);
    assert_eq!(statements.len(), 5);
    assert!(matches!(&statements[0], Statement::Assign { target, .. } if target.index.is_none()));
    assert!(matches!(&statements[1], Statement::Call { name, args, .. } if name.name == "q" && args.is_empty()));
    assert!(matches!(&statements[2], Statement::Call { args, .. } if args.len() == 2));
    assert!(matches!(&statements[3], Statement::Assign { target, .. } if target.index.is_some()));
    assert!(matches!(&statements[4], Statement::Call { name, .. } if name.name == "write"));
    Ok(())
}

// Test control-flow statements
// Purpose: Ensure if/else, while and compound statements nest correctly
#[test]
fn test_control_flow() -> PascalResult<()> {
    let source = "
    program P;
    begin
        while x < 10 do
            begin
                if x = 5 then x := 0;
                x := x + 1
            end;
        if c then x := 1 else x := 2
    end.
    ";
    let tree = parse_source(source)?;
    let statements = program_statements(&tree);
    let Statement::While { body, line, .. } = &statements[0] else {
        panic!("Expected a while statement, got {:?}", statements[0]);
    };
    assert_eq!(*line, 4);
    let Statement::Compound { body: inner, .. } = body.as_ref() else {
        panic!("Expected a compound body");
    };
    assert!(matches!(&inner[0], Statement::If { else_branch: None, .. }));
    assert!(matches!(&statements[1], Statement::If { else_branch: Some(_), line: 9, .. }));
    Ok(())
}

// Test operator precedence
// Purpose: Ensure multiplication binds tighter than addition
#[test]
fn test_expression_structure() -> PascalResult<()> {
    let tree = parse_source("program P; begin x := -a + b * c mod d end.")?;
    let Statement::Assign { value, .. } = &program_statements(&tree)[0] else {
        panic!("Expected an assignment");
    };
    assert!(value.rel.is_none());
    assert!(value.left.prefix.is_some());
    assert_eq!(value.left.rest.len(), 1);
    let (op, term) = &value.left.rest[0];
    assert_eq!(*op, TermOp::Add);
    let ops: Vec<FactorOp> = term.rest.iter().map(|(op, _)| *op).collect();
    assert_eq!(ops, vec![FactorOp::Multiply, FactorOp::Mod]);
    Ok(())
}

// Test factor forms
// Purpose: Ensure calls, indexing, negation and literals are told apart
#[test]
fn test_factor_forms() -> PascalResult<()> {
    let tree = parse_source("program P; begin x := f(1) + a[i] + not b + (c) + 'z' + 'zz' + 7 end.")?;
    let Statement::Assign { value, .. } = &program_statements(&tree)[0] else {
        panic!("Expected an assignment");
    };
    let mut factors = vec![&value.left.first.first];
    factors.extend(value.left.rest.iter().map(|(_, term)| &term.first));
    assert!(matches!(factors[0], Factor::Call(call) if call.name.name == "f" && call.args.len() == 1));
    assert!(matches!(factors[1], Factor::Variable(var) if var.index.is_some()));
    assert!(matches!(factors[2], Factor::Not { .. }));
    assert!(matches!(factors[3], Factor::Inner(_)));
    assert!(matches!(factors[4], Factor::Constant(Constant::Char { value: 'z', .. })));
    assert!(matches!(factors[5], Factor::Constant(Constant::Str { .. })));
    assert!(matches!(factors[6], Factor::Constant(Constant::Number { value: 7, .. })));
    Ok(())
}

// Test type expressions
// Purpose: Ensure enumerations, ranges and arrays are parsed and enum codes start at 0
#[test]
fn test_type_expressions() -> PascalResult<()> {
    let source = "
    program P;
    type color = (red, green, blue);
         size = (small, large);
         digit = 0..9;
         span = lo..hi;
    var table: array [digit] of color;
    begin end.
    ";
    let tree = parse_source(source)?;
    let block = tree.block(tree.program.block);
    let decls: Vec<_> = block.declarations().map(|id| tree.decl(id)).collect();

    let DeclKind::Type { ty: TypeExpr::Enum { literals, .. } } = &decls[0].kind else {
        panic!("color should be an enumeration");
    };
    let codes: Vec<i64> = literals
        .iter()
        .map(|id| match tree.decl(*id).kind {
            DeclKind::EnumLiteral { code } => code,
            _ => -1,
        })
        .collect();
    assert_eq!(codes, vec![0, 1, 2]);

    let DeclKind::Type { ty: TypeExpr::Enum { literals, .. } } = &decls[1].kind else {
        panic!("size should be an enumeration");
    };
    assert!(matches!(tree.decl(literals[0]).kind, DeclKind::EnumLiteral { code: 0 }), "Codes restart per enumeration");

    assert!(matches!(&decls[2].kind, DeclKind::Type { ty: TypeExpr::Range { low: Constant::Number { value: 0, .. }, .. } }));
    assert!(matches!(&decls[3].kind, DeclKind::Type { ty: TypeExpr::Range { low: Constant::Named(_), .. } }));
    assert!(matches!(&decls[4].kind, DeclKind::Var { ty: TypeExpr::Array { .. } }));
    Ok(())
}

// Test syntax errors
// Purpose: Ensure the first mismatch is reported with expected/found kinds and line
#[test]
fn test_missing_semicolon() {
    let err = parse_source("program P\nbegin end.").unwrap_err();
    match err {
        PascalError::SyntaxError { expected, found, line } => {
            assert_eq!(expected, ";");
            assert_eq!(found, "begin");
            assert_eq!(line, 2);
        }
        other => panic!("Expected a syntax error, got {:?}", other),
    }
}

#[test]
fn test_text_after_final_dot() {
    let err = parse_source("program P; begin end. x").unwrap_err();
    assert!(matches!(err, PascalError::SyntaxError { ref expected, .. } if expected == "e-o-f"));
}

#[test]
fn test_bad_factor() {
    let err = parse_source("program P; begin x := * end.").unwrap_err();
    assert!(matches!(err, PascalError::SyntaxError { ref expected, line: 1, .. } if expected == "factor"));
    assert_eq!(err.to_string(), "Error at line 1: Expected a factor but found a *!");
}

#[test]
fn test_function_call_needs_arguments() {
    assert!(parse_source("program P; begin x := f() end.").is_err());
}

// Test parser logging
// Purpose: Ensure enter/leave lines are recorded only when enabled
#[test]
fn test_parser_log() -> PascalResult<()> {
    let mut ctx = CompileContext::with_log(CompileLog::new(true, false));
    let mut state = LineNumber::default();
    let tokens = scan(&mut state, "program P; begin end.")?;
    parse(&tokens, &mut ctx)?;
    let lines = ctx.log.lines();
    assert_eq!(lines.first().map(String::as_str), Some("<program>"));
    assert_eq!(lines.last().map(String::as_str), Some("</program>"));
    assert!(lines.iter().any(|l| l.trim() == "<statm-list>"));
    assert_eq!(ctx.program_name(), Some("p"));
    Ok(())
}
