// Stack frame layout for the 32-bit target
pub mod frame {
    // Every variable, parameter and intermediate occupies one word
    pub const WORD_SIZE: i32 = 4;

    // Bytes reserved at the top of each frame: the display built by `enter`
    // plus the function return slot
    pub const FRAME_HEADER_BYTES: i32 = 32;

    // A function stores its result here, relative to its own frame base
    pub const RETURN_SLOT_OFFSET: i32 = -32;

    // First parameter sits above the saved %ebp and the return address
    pub const FIRST_PARAM_OFFSET: i32 = 8;

    // First local variable sits just below the frame header
    pub const FIRST_LOCAL_OFFSET: i32 = -(FRAME_HEADER_BYTES + WORD_SIZE);

    // Display slots -4(%ebp) .. -28(%ebp) fit in the header
    pub const MAX_FRAME_LEVEL: usize = 7;

    // Operand holding the frame pointer for a given display level
    pub fn display_operand(level: usize) -> String {
        format!("{}(%ebp)", -(WORD_SIZE * level as i32))
    }

    pub fn frame_size(local_bytes: i32) -> i32 {
        FRAME_HEADER_BYTES + local_bytes
    }
}

// Runtime function names
pub mod runtime_functions {
    pub const WRITE_CHAR: &str = "write_char";
    pub const WRITE_INT: &str = "write_int";
    pub const WRITE_STR: &str = "write_string";

    pub const ALL: [&str; 3] = [WRITE_CHAR, WRITE_INT, WRITE_STR];
}

// Assembly generation constants
pub mod assembly {
    // Instruction layout: indent, opcode column, operand column
    pub const INSTRUCTION_INDENT: &str = "        ";
    pub const OPCODE_WIDTH: usize = 7;
    pub const OPERAND_WIDTH: usize = 23;
    pub const COMMENT_PREFIX: &str = "# ";

    // Section and symbol directives
    pub const DATA_SECTION: &str = ".data";
    pub const TEXT_SECTION: &str = ".text";
    pub const ALIGN_DIRECTIVE: &str = ".align";
    pub const STRING_DIRECTIVE: &str = ".asciz";
    pub const EXTERN_DIRECTIVE: &str = ".extern";
    pub const GLOBAL_DIRECTIVE: &str = ".globl";

    // Process entry points
    pub const ENTRY_POINTS: [&str; 2] = ["_main", "main"];

    // Label prefixes for callable units
    pub const PROGRAM_PREFIX: &str = "prog$";
    pub const PROCEDURE_PREFIX: &str = "proc$";
    pub const FUNCTION_PREFIX: &str = "func$";
    pub const LOCAL_LABEL_PREFIX: &str = ".L";

    // Holds the frame pointer of the frame being addressed
    pub const SCRATCH_REG: &str = "%edx";
}

// Label helpers
pub mod labels {
    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        static ref UNSAFE_LABEL_CHARS: Regex = Regex::new(r"[^a-z0-9_]").unwrap();
    }

    // Assemblers accept only a small alphabet in symbol names
    pub fn sanitize(name: &str) -> String {
        let lowered = name.to_lowercase();
        UNSAFE_LABEL_CHARS.replace_all(&lowered, "_").into_owned()
    }
}
