use pasc::errors::{PascalError, PascalResult};
use pasc::frontend::lexer::scan;
use pasc::frontend::token::Token;
use pasc::LineNumber;

fn tokens_of(source: &str) -> PascalResult<Vec<(Token, usize)>> {
    let mut state = LineNumber::default();
    scan(&mut state, source)
}

#[test]
fn test_program_header() -> PascalResult<()> {
    let tokens = tokens_of("program P; begin end.")?;
    let expected = vec![
        (Token::Program, 1),
        (Token::Name("p".to_string()), 1),
        (Token::Semicolon, 1),
        (Token::Begin, 1),
        (Token::End, 1),
        (Token::Dot, 1),
        (Token::Eof, 1),
    ];
    assert_eq!(tokens, expected);
    Ok(())
}

#[test]
fn test_names_and_keywords_are_case_insensitive() -> PascalResult<()> {
    let tokens = tokens_of("PROGRAM MyProg; VAR Count: Integer;")?;
    assert_eq!(tokens[0].0, Token::Program);
    assert!(matches!(&tokens[1].0, Token::Name(n) if n == "myprog"));
    assert_eq!(tokens[3].0, Token::Var);
    assert!(matches!(&tokens[4].0, Token::Name(n) if n == "count"));
    assert!(matches!(&tokens[6].0, Token::Name(n) if n == "integer"));
    Ok(())
}

#[test]
fn test_compound_symbols() -> PascalResult<()> {
    let tokens = tokens_of(":= : <> <= >= < > = .. . [ ] ( ) , ; + - *")?;
    let expected = vec![
        Token::Assign,
        Token::Colon,
        Token::NotEqual,
        Token::LessEqual,
        Token::GreaterEqual,
        Token::Less,
        Token::Greater,
        Token::Equal,
        Token::Range,
        Token::Dot,
        Token::LeftBracket,
        Token::RightBracket,
        Token::LeftPar,
        Token::RightPar,
        Token::Comma,
        Token::Semicolon,
        Token::Add,
        Token::Subtract,
        Token::Multiply,
        Token::Eof,
    ];
    let kinds: Vec<Token> = tokens.into_iter().map(|(t, _)| t).collect();
    assert_eq!(kinds, expected);
    Ok(())
}

#[test]
fn test_range_after_number() -> PascalResult<()> {
    let tokens = tokens_of("1..10")?;
    assert!(matches!(tokens[0].0, Token::IntVal(1)));
    assert_eq!(tokens[1].0, Token::Range);
    assert!(matches!(tokens[2].0, Token::IntVal(10)));
    Ok(())
}

#[test]
fn test_comments_and_line_numbers() -> PascalResult<()> {
    let source = "{ brace comment }\nvar x: integer;\n/* block\n comment */\nbegin x := 1 end.";
    let tokens = tokens_of(source)?;
    assert_eq!(tokens[0], (Token::Var, 2));
    let begin = tokens.iter().find(|(t, _)| *t == Token::Begin).map(|(_, line)| *line);
    assert_eq!(begin, Some(5), "Line counting should continue through comments");
    Ok(())
}

#[test]
fn test_string_literals() -> PascalResult<()> {
    let tokens = tokens_of("'a' 'Hello' 'it''s' ''")?;
    assert!(matches!(&tokens[0].0, Token::StringVal(s) if s == "a"));
    assert!(matches!(&tokens[1].0, Token::StringVal(s) if s == "Hello"), "Strings keep their case");
    assert!(matches!(&tokens[2].0, Token::StringVal(s) if s == "it's"));
    assert!(matches!(&tokens[3].0, Token::StringVal(s) if s.is_empty()));
    Ok(())
}

#[test]
fn test_slash_alone_is_illegal() {
    let err = tokens_of("x / y").unwrap_err();
    assert!(matches!(err, PascalError::IllegalCharacter { character: '/', line: 1 }));
}

#[test]
fn test_illegal_character() {
    let err = tokens_of("begin\n x # 1 end").unwrap_err();
    assert!(matches!(err, PascalError::IllegalCharacter { character: '#', line: 2 }));
    assert_eq!(err.to_string(), "Scanner error on line 2: Illegal character: '#'!");
}

#[test]
fn test_unterminated_string() {
    let err = tokens_of("write('abc\n)").unwrap_err();
    assert!(matches!(err, PascalError::UnterminatedString { line: 1 }));
}

#[test]
fn test_unterminated_comments() {
    assert!(matches!(tokens_of("{ never closed").unwrap_err(), PascalError::UnterminatedComment { line: 1 }));
    assert!(matches!(
        tokens_of("\n/* never\n closed").unwrap_err(),
        PascalError::UnterminatedComment { line: 2 }
    ));
}

#[test]
fn test_number_too_large() {
    let err = tokens_of("99999999999999999999999").unwrap_err();
    assert!(matches!(err, PascalError::InvalidNumber { line: 1, .. }));
}

// Test the integer range
// Purpose: Ensure literals that do not fit a 32-bit word are rejected
#[test]
fn test_number_outside_32_bits() -> PascalResult<()> {
    let tokens = tokens_of("2147483647")?;
    assert!(matches!(tokens[0].0, Token::IntVal(2147483647)));

    let err = tokens_of("x := 2147483648").unwrap_err();
    assert!(matches!(err, PascalError::InvalidNumber { ref number, line: 1 } if number == "2147483648"));
    assert!(tokens_of("4294967296").is_err(), "Values above 2^32 must not wrap");
    Ok(())
}

// Test comments between tokens
// Purpose: Ensure a block comment directly after a token is skipped and '/' alone is still illegal
#[test]
fn test_block_comment_between_tokens() -> PascalResult<()> {
    let tokens = tokens_of("a/* one */b {two}c")?;
    let names: Vec<&str> = tokens
        .iter()
        .filter_map(|(t, _)| match t {
            Token::Name(n) => Some(n.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert!(matches!(tokens_of("a/b").unwrap_err(), PascalError::IllegalCharacter { character: '/', .. }));
    Ok(())
}

#[test]
fn test_empty_input_yields_eof() -> PascalResult<()> {
    let tokens = tokens_of("   \n\t ")?;
    assert_eq!(tokens, vec![(Token::Eof, 2)]);
    Ok(())
}
