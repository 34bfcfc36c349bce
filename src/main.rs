use clap::Parser;
use pasc::{
    self,
    ast::SyntaxTree,
    code_emitter::AsmListing,
    codegen,
    context::{CompileContext, CompileLog},
    errors::{PascalError, PascalResult},
    frontend::{lexer::scan, parser, token::Token},
    read, semantic, write_output,
};
use std::{path::PathBuf, process::Command, time::Instant};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Pascal-subset compiler that generates 32-bit x86 assembly",
    long_about = "Pascal-subset compiler that generates 32-bit x86 assembly.\n\
                 The compiler scans and parses the source, resolves every name through\n\
                 the nested scopes, lays out the stack frames and emits AT&T assembly.\n\
                 \n\
                 Example usage:\n\
                 pasc prog.pas                      # Compile to prog.s\n\
                 pasc prog.pas -o out.s             # Specify output file\n\
                 pasc prog.pas --print-asm          # Print the generated assembly\n\
                 pasc prog.pas --log-binding        # Show how every name was bound\n\
                 pasc prog.pas --link --runtime rt.o  # Build an executable with gcc -m32"
)]
struct Cli {
    // The path to the file to compile
    path: PathBuf,

    // Output file path (defaults to input file with .s extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    // Print assembly code
    #[arg(short = 'a', long)]
    print_asm: bool,

    // Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    // Show compilation timing
    #[arg(short, long)]
    timing: bool,

    // Show AST after checking
    #[arg(long)]
    show_ast: bool,

    // Log every parser production entered and left
    #[arg(long)]
    log_parser: bool,

    // Log every name binding made by the checker
    #[arg(long)]
    log_binding: bool,

    // Assemble and link the output with gcc -m32
    #[arg(long)]
    link: bool,

    // Object file or source providing write_char, write_int and write_string
    #[arg(long, requires = "link")]
    runtime: Option<PathBuf>,
}

// Compilation statistics for performance analysis
#[derive(Debug, Default)]
struct CompilationStats {
    lexer_time: f64,
    parser_time: f64,
    checker_time: f64,
    codegen_time: f64,
    linking_time: f64,
    total_time: f64,
    token_count: usize,
    block_count: usize,
    decl_count: usize,
    assembly_instructions: usize,
}

// Print error message and exit with error code
fn fatal(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

// Generate output file path from input path if not specified
fn determine_output_path(input_path: &PathBuf, output: &Option<PathBuf>) -> PathBuf {
    match output {
        Some(path) => path.clone(),
        None => input_path.with_extension("s"),
    }
}

fn flush_log(ctx: &mut CompileContext) {
    for line in ctx.log.take_lines() {
        eprintln!("{}", line);
    }
}

// Perform lexical analysis phase
fn lexical_analysis(source: &str, stats: &mut CompilationStats, verbose: bool) -> PascalResult<Vec<(Token, usize)>> {
    let lexer_start = Instant::now();
    let mut state = pasc::LineNumber::default();
    let tokens = scan(&mut state, source)?;
    stats.lexer_time = lexer_start.elapsed().as_secs_f64();
    stats.token_count = tokens.len();

    if verbose {
        println!("Lexical analysis completed in {:.3}s", stats.lexer_time);
        println!("  Generated {} tokens", stats.token_count);
    }
    Ok(tokens)
}

// Perform parsing phase
fn parsing_phase(
    tokens: &[(Token, usize)],
    ctx: &mut CompileContext,
    stats: &mut CompilationStats,
    verbose: bool,
) -> PascalResult<SyntaxTree> {
    let parser_start = Instant::now();
    let result = parser::parse(tokens, ctx);
    flush_log(ctx);
    let tree = result?;
    stats.parser_time = parser_start.elapsed().as_secs_f64();
    stats.block_count = tree.blocks.len();

    if verbose {
        println!("Parsing completed in {:.3}s", stats.parser_time);
        println!("  Built {} blocks", stats.block_count);
    }
    Ok(tree)
}

// Perform name resolution and storage layout
fn checking_phase(
    tree: &mut SyntaxTree,
    ctx: &mut CompileContext,
    stats: &mut CompilationStats,
    verbose: bool,
) -> PascalResult<()> {
    let checker_start = Instant::now();
    let result = semantic::check(tree, ctx);
    flush_log(ctx);
    result?;
    stats.checker_time = checker_start.elapsed().as_secs_f64();
    stats.decl_count = tree.decls.len();

    if verbose {
        println!("Checking completed in {:.3}s", stats.checker_time);
        println!("  Resolved {} declarations", stats.decl_count);
    }
    Ok(())
}

// Perform code generation phase
fn code_generation_phase(
    tree: &SyntaxTree,
    ctx: &mut CompileContext,
    stats: &mut CompilationStats,
    verbose: bool,
) -> PascalResult<AsmListing> {
    let codegen_start = Instant::now();
    let mut listing = AsmListing::new();
    codegen::generate(tree, ctx, &mut listing)?;
    stats.codegen_time = codegen_start.elapsed().as_secs_f64();
    stats.assembly_instructions = listing.instruction_count();

    if verbose {
        println!("Code generation completed in {:.3}s", stats.codegen_time);
        println!("  Generated {} instructions", stats.assembly_instructions);
        println!("  Allocated {} labels", ctx.labels_used());
    }
    Ok(listing)
}

// Main compilation function
fn compile(input_path: &PathBuf, args: &Cli) -> PascalResult<(String, CompilationStats)> {
    let start_time = Instant::now();
    let mut stats = CompilationStats::default();
    let mut ctx = CompileContext::with_log(CompileLog::new(args.log_parser, args.log_binding));

    if args.verbose {
        println!("Starting compilation of: {}", input_path.display());
    }

    let source = read(input_path)?;
    if args.verbose {
        println!("Read {} bytes from input file", source.len());
    }

    let tokens = lexical_analysis(&source, &mut stats, args.verbose)?;
    let mut tree = parsing_phase(&tokens, &mut ctx, &mut stats, args.verbose)?;
    checking_phase(&mut tree, &mut ctx, &mut stats, args.verbose)?;

    if args.show_ast {
        println!("\nAbstract Syntax Tree:");
        println!("{:#?}", tree);
    }

    let listing = code_generation_phase(&tree, &mut ctx, &mut stats, args.verbose)?;
    let assembly_output = listing.render();

    if args.print_asm {
        println!("\nGenerated Assembly:");
        println!("{}", assembly_output);
    }

    stats.total_time = start_time.elapsed().as_secs_f64();
    if args.verbose {
        println!("Compilation completed in {:.3}s", stats.total_time);
    }
    Ok((assembly_output, stats))
}

// Assemble and link a 32-bit executable
fn assemble_and_link(asm_file: &PathBuf, runtime: &Option<PathBuf>, exe_file: &PathBuf, verbose: bool) -> PascalResult<f64> {
    let start_time = Instant::now();
    if verbose {
        println!("Assembling and linking {}", asm_file.display());
    }

    let mut command = Command::new("gcc");
    command.arg("-m32").arg("-o").arg(exe_file).arg(asm_file);
    if let Some(runtime) = runtime {
        command.arg(runtime);
    }
    let output = command
        .output()
        .map_err(|e| PascalError::compilation_error("linking", format!("Failed to invoke gcc: {}", e)))?;
    if !output.status.success() {
        return Err(PascalError::compilation_error(
            "linking",
            format!("gcc failed: {}", String::from_utf8_lossy(&output.stderr)),
        ));
    }

    let linking_time = start_time.elapsed().as_secs_f64();
    if verbose {
        println!("Assembly and linking completed in {:.3}s", linking_time);
    }
    Ok(linking_time)
}

// Print detailed compilation statistics
fn print_stats(stats: &CompilationStats) {
    println!("\nCompilation Statistics:");
    println!("+---------------------+-----------+");
    println!("| Phase               | Time (s)  |");
    println!("+---------------------+-----------+");
    println!("| Lexical Analysis    | {:>9.3} |", stats.lexer_time);
    println!("| Parsing             | {:>9.3} |", stats.parser_time);
    println!("| Checking            | {:>9.3} |", stats.checker_time);
    println!("| Code Generation     | {:>9.3} |", stats.codegen_time);
    println!("| Linking             | {:>9.3} |", stats.linking_time);
    println!("+---------------------+-----------+");
    println!("| Total Time          | {:>9.3} |", stats.total_time);
    println!("+---------------------+-----------+");

    println!("\nCode Metrics:");
    println!("  Tokens:             {}", stats.token_count);
    println!("  Blocks:             {}", stats.block_count);
    println!("  Declarations:       {}", stats.decl_count);
    println!("  Instructions:       {}", stats.assembly_instructions);
}

fn main() {
    let args = Cli::parse();

    match compile(&args.path, &args) {
        Ok((output, mut stats)) => {
            let output_path = determine_output_path(&args.path, &args.output);

            if let Err(e) = write_output(&output_path, &output) {
                fatal(&e.to_string());
            }

            if args.verbose {
                println!("Assembly written to: {}", output_path.display());
            }

            if args.link {
                let exe_file = output_path.with_extension("");
                match assemble_and_link(&output_path, &args.runtime, &exe_file, args.verbose) {
                    Ok(linking_time) => {
                        stats.linking_time = linking_time;
                        stats.total_time += linking_time;
                        if args.verbose {
                            println!("Executable created: {}", exe_file.display());
                        }
                    }
                    Err(e) => fatal(&format!("Assembly/linking failed: {}", e)),
                }
            }

            if args.timing {
                print_stats(&stats);
            }

            if args.verbose {
                println!("Compilation successful!");
            }
        }
        Err(e) => fatal(&e.to_string()),
    }
}
