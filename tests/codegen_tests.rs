use pasc::code_emitter::{AsmLine, AsmListing};
use pasc::codegen::generate;
use pasc::compile;
use pasc::context::CompileContext;
use pasc::errors::{PascalError, PascalResult};
use pasc::frontend::lexer::scan;
use pasc::frontend::parser::parse;
use pasc::semantic::check;
use pasc::LineNumber;

// Helper function to compile a program into a listing
fn listing_of(source: &str) -> PascalResult<AsmListing> {
    let mut ctx = CompileContext::new();
    compile(source, &mut ctx)
}

// One string per line: directives as written, labels as "x:", instructions as "[label: ]opcode operands"
fn flatten(listing: &AsmListing) -> Vec<String> {
    listing
        .lines()
        .iter()
        .map(|line| match line {
            AsmLine::Directive(text) => text.clone(),
            AsmLine::Label(label) => format!("{}:", label),
            AsmLine::Instr { label, opcode, operands, .. } => {
                let text = format!("{} {}", opcode, operands).trim_end().to_string();
                match label {
                    Some(label) => format!("{}: {}", label, text),
                    None => text,
                }
            }
        })
        .collect()
}

// Asserts that `expected` occur in `lines` in this order, as consecutive runs or not
fn assert_in_order(lines: &[String], expected: &[&str]) {
    let mut from = 0;
    for want in expected {
        match lines[from..].iter().position(|line| line == want) {
            Some(found) => from += found + 1,
            None => panic!("Expected {:?} after line {} in:\n{}", want, from, lines.join("\n")),
        }
    }
}

fn position(lines: &[String], want: &str) -> usize {
    lines
        .iter()
        .position(|line| line == want)
        .unwrap_or_else(|| panic!("{:?} not found in:\n{}", want, lines.join("\n")))
}

// Test the program prelude
// Purpose: Ensure the runtime is declared and main calls the program label
#[test]
fn test_entry_prelude() -> PascalResult<()> {
    let listing = listing_of("program P; begin end.")?;
    let lines = flatten(&listing);
    assert_eq!(
        &lines[..9],
        [
            ".extern write_char",
            ".extern write_int",
            ".extern write_string",
            ".globl _main",
            ".globl main",
            "_main:",
            "main: call prog$p_1",
            "movl $0,%eax",
            "ret",
        ]
    );
    assert_eq!(&lines[9..], ["prog$p_1: enter $32,$1", "leave", "ret"]);
    Ok(())
}

#[test]
fn test_render_layout() -> PascalResult<()> {
    let text = listing_of("program P; begin end.")?.render();
    assert!(text.contains("main:   call    prog$p_1"), "Short labels share the instruction line:\n{}", text);
    assert!(text.contains("prog$p_1:\n        enter   $32,$1"), "Long labels get a line of their own:\n{}", text);
    assert!(text.starts_with(".extern write_char\n"));
    Ok(())
}

// Test constant output
// Purpose: Ensure a named integer constant is written as an integer
#[test]
fn test_write_integer_constant() -> PascalResult<()> {
    let listing = listing_of("program P; const c = 5; begin write(c) end.")?;
    let lines = flatten(&listing);
    assert_eq!(listing.count("call", "write_int"), 1);
    let at = position(&lines, "movl $5,%eax");
    assert_eq!(&lines[at + 1..at + 3], ["pushl %eax", "call write_int"]);
    assert_eq!(lines[at + 3], "addl $4,%esp");
    Ok(())
}

// Test loops
// Purpose: Ensure a while loop has one top label, one exit label and both jumps
#[test]
fn test_while_loop() -> PascalResult<()> {
    let listing = listing_of("program P; var x: integer; begin x := 1; while x <= 3 do x := x + 1 end.")?;
    let lines = flatten(&listing);
    assert_in_order(
        &lines,
        &[
            "prog$p_1: enter $36,$1",
            "movl $1,%eax",
            "movl -4(%ebp),%edx",
            "movl %eax,-36(%edx)",
            ".L0002:",
            "movl -36(%edx),%eax",
            "setle %al",
            "cmpl $0,%eax",
            "je .L0003",
            "addl %ecx,%eax",
            "movl %eax,-36(%edx)",
            "jmp .L0002",
            ".L0003:",
            "leave",
        ],
    );
    assert_eq!(listing.labels().iter().filter(|l| **l == ".L0002").count(), 1);
    assert_eq!(listing.labels().iter().filter(|l| **l == ".L0003").count(), 1);
    assert_eq!(listing.count("je", ".L0003"), 1);
    assert_eq!(listing.count("jmp", ".L0002"), 1);
    Ok(())
}

// Test inline procedures
// Purpose: Ensure a zero-parameter procedure gets no prologue or epilogue
#[test]
fn test_inline_procedure() -> PascalResult<()> {
    let listing = listing_of("program P; procedure Q; begin write('a') end; begin Q end.")?;
    let lines = flatten(&listing);
    assert_in_order(
        &lines,
        &[
            "proc$q_2:",
            "movl $97,%eax",
            "pushl %eax",
            "call write_char",
            "addl $4,%esp",
            "ret",
            "prog$p_1: enter $32,$1",
            "call proc$q_2",
            "leave",
        ],
    );
    assert_eq!(listing.instructions().filter(|(op, _)| *op == "enter").count(), 1);
    assert_eq!(listing.instructions().filter(|(op, _)| *op == "leave").count(), 1);
    assert_eq!(listing.count("call", "write_char"), 1);
    assert_eq!(listing.count("call", "write_string"), 0);
    Ok(())
}

// Test failing programs
// Purpose: Ensure no code is produced once checking has failed
#[test]
fn test_no_code_after_check_error() {
    let err = listing_of("program P; var a: integer; var a: integer; begin end.").unwrap_err();
    assert!(matches!(err, PascalError::DuplicateDeclaration { .. }));
}

#[test]
fn test_generate_requires_checked_tree() -> PascalResult<()> {
    let mut ctx = CompileContext::new();
    let mut state = LineNumber::default();
    let tokens = scan(&mut state, "program P; var a: integer; var a: integer; begin end.")?;
    let mut tree = parse(&tokens, &mut ctx)?;
    assert!(check(&mut tree, &mut ctx).is_err());

    let mut listing = AsmListing::new();
    let err = generate(&tree, &mut ctx, &mut listing).unwrap_err();
    assert!(matches!(err, PascalError::CodeGenError { .. }));
    assert!(listing.is_empty());
    Ok(())
}

// Test conditionals
// Purpose: Ensure if/else evaluates, tests, jumps and places both labels in order
#[test]
fn test_if_else() -> PascalResult<()> {
    let listing = listing_of("program P; var c: boolean; x: integer; begin if c then x := 1 else x := 2 end.")?;
    let lines = flatten(&listing);
    let start = position(&lines, "prog$p_1: enter $40,$1");
    assert_eq!(
        &lines[start + 1..],
        [
            "movl -4(%ebp),%edx",
            "movl -36(%edx),%eax",
            "cmpl $0,%eax",
            "je .L0002",
            "movl $1,%eax",
            "movl -4(%ebp),%edx",
            "movl %eax,-40(%edx)",
            "jmp .L0003",
            ".L0002:",
            "movl $2,%eax",
            "movl -4(%ebp),%edx",
            "movl %eax,-40(%edx)",
            ".L0003:",
            "leave",
            "ret",
        ]
    );
    Ok(())
}

#[test]
fn test_if_without_else() -> PascalResult<()> {
    let listing = listing_of("program P; var x: integer; begin if x = 0 then x := 1 end.")?;
    let lines = flatten(&listing);
    assert_in_order(&lines, &["sete %al", "cmpl $0,%eax", "je .L0002", "movl $1,%eax", ".L0002:"]);
    assert_eq!(listing.instructions().filter(|(op, _)| *op == "jmp").count(), 0);
    Ok(())
}

// Test framed functions
// Purpose: Ensure parameters, result slot and call-site cleanup agree
#[test]
fn test_function_with_parameters() -> PascalResult<()> {
    let source = "
    program P;
    var r: integer;
    function add(a: integer; b: integer): integer;
    begin add := a + b end;
    begin r := add(1, 2) end.
    ";
    let listing = listing_of(source)?;
    let lines = flatten(&listing);
    assert_in_order(
        &lines,
        &[
            "func$add_2: enter $32,$2",
            "movl -8(%ebp),%edx",
            "movl 8(%edx),%eax",
            "pushl %eax",
            "movl 12(%edx),%eax",
            "movl %eax,%ecx",
            "popl %eax",
            "addl %ecx,%eax",
            "movl %eax,-32(%edx)",
            "movl -32(%ebp),%eax",
            "leave",
            "ret",
            "prog$p_1: enter $36,$1",
            "movl $2,%eax",
            "pushl %eax",
            "movl $1,%eax",
            "pushl %eax",
            "call func$add_2",
            "addl $8,%esp",
            "movl -4(%ebp),%edx",
            "movl %eax,-36(%edx)",
        ],
    );
    assert!(position(&lines, "func$add_2: enter $32,$2") < position(&lines, "prog$p_1: enter $36,$1"));
    Ok(())
}

#[test]
fn test_inline_function() -> PascalResult<()> {
    let source = "
    program P;
    var x: integer;
    function seven: integer;
    begin seven := 7 end;
    begin x := seven end.
    ";
    let listing = listing_of(source)?;
    let lines = flatten(&listing);
    assert_in_order(
        &lines,
        &[
            "func$seven_2:",
            "movl $7,%eax",
            "movl %eax,-40(%edx)",
            "movl -40(%edx),%eax",
            "ret",
            "prog$p_1: enter $40,$1",
            "call func$seven_2",
            "movl %eax,-36(%edx)",
        ],
    );
    assert_eq!(listing.count("addl", "$0,%esp"), 0, "No arguments to pop");
    Ok(())
}

// Test nested frames
// Purpose: Ensure each frame level is reached through its own display slot
#[test]
fn test_nested_display_access() -> PascalResult<()> {
    let source = "
    program P;
    procedure outer(a: integer);
    var v: integer;
        procedure inner(b: integer);
        begin v := b; write(a) end;
    begin inner(a) end;
    begin outer(1) end.
    ";
    let listing = listing_of(source)?;
    let lines = flatten(&listing);
    assert_in_order(
        &lines,
        &[
            "proc$inner_3: enter $32,$3",
            "movl -12(%ebp),%edx",
            "movl 8(%edx),%eax",
            "movl -8(%ebp),%edx",
            "movl %eax,-36(%edx)",
            "movl -8(%ebp),%edx",
            "movl 8(%edx),%eax",
            "call write_int",
            "leave",
            "ret",
            "proc$outer_2: enter $36,$2",
            "call proc$inner_3",
            "addl $4,%esp",
            "prog$p_1: enter $32,$1",
            "call proc$outer_2",
        ],
    );
    Ok(())
}

// Test operators
// Purpose: Ensure each operator maps to its instruction
#[test]
fn test_arithmetic_and_logic() -> PascalResult<()> {
    let source = "
    program P;
    var a: integer; b: boolean;
    begin
        a := -a * 2 div 3 mod 4 - 1;
        b := not (a < 1) or (a <> 2) and (a >= 3) or (a > 4)
    end.
    ";
    let listing = listing_of(source)?;
    let lines = flatten(&listing);
    assert_in_order(
        &lines,
        &[
            "imull %ecx,%eax",
            "cdq",
            "idivl %ecx",
            "cdq",
            "idivl %ecx",
            "movl %edx,%eax",
            "negl %eax",
            "subl %ecx,%eax",
        ],
    );
    assert_in_order(
        &lines,
        &["setl %al", "xorl $1,%eax", "setne %al", "setge %al", "andl %ecx,%eax", "orl %ecx,%eax", "setg %al", "orl %ecx,%eax"],
    );
    Ok(())
}

#[test]
fn test_constants_and_enumerations() -> PascalResult<()> {
    let source = "
    program P;
    const limit = 9; initial = 'q';
    type color = (red, green, blue);
    var c: color; x: integer;
    begin c := blue; x := limit; x := initial; x := true end.
    ";
    let lines = flatten(&listing_of(source)?);
    assert_in_order(&lines, &["movl $2,%eax", "movl $9,%eax", "movl $113,%eax", "movl $1,%eax"]);
    Ok(())
}

// Test text output
// Purpose: Ensure strings go to the data section and characters to write_char
#[test]
fn test_write_string_and_eol() -> PascalResult<()> {
    let listing = listing_of("program P; begin write('hello', eol) end.")?;
    let lines = flatten(&listing);
    assert_in_order(
        &lines,
        &[
            ".data",
            ".L0002: .asciz \"hello\"",
            ".align 2",
            ".text",
            "leal .L0002,%eax",
            "pushl %eax",
            "call write_string",
            "addl $4,%esp",
            "movl $10,%eax",
            "pushl %eax",
            "call write_char",
            "addl $4,%esp",
        ],
    );
    Ok(())
}

#[test]
fn test_write_named_string_constant() -> PascalResult<()> {
    let source = "program P; const greeting = 'hi there'; begin write(greeting); write(greeting) end.";
    let listing = listing_of(source)?;
    let lines = flatten(&listing);
    assert_in_order(&lines, &[".L0002: .asciz \"hi there\"", "call write_string", ".L0003: .asciz \"hi there\""]);
    assert_eq!(listing.count("call", "write_string"), 2);
    Ok(())
}

#[test]
fn test_write_expression_is_integer() -> PascalResult<()> {
    let listing = listing_of("program P; var x: integer; begin write(x + 1, 'a') end.")?;
    assert_eq!(listing.count("call", "write_int"), 1);
    assert_eq!(listing.count("call", "write_char"), 1);
    Ok(())
}

// Test label allocation
// Purpose: Ensure one counter serves program, routine and branch labels
#[test]
fn test_labels_are_unique() -> PascalResult<()> {
    let source = "
    program P;
    var x: integer;
    procedure a; begin if x = 1 then x := 2 end;
    procedure b(n: integer); begin while n > 0 do n := n - 1 end;
    begin a; b(3); if x = 2 then write('done') end.
    ";
    let listing = listing_of(source)?;
    let labels = listing.labels();
    let mut unique = labels.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), labels.len(), "Duplicate labels in {:?}", labels);
    assert!(labels.contains(&"proc$a_2"));
    assert!(labels.contains(&"proc$b_3"));
    Ok(())
}
