use crate::ast::{
    Block, BlockId, CallExpr, Constant, Decl, DeclId, DeclKind, DeclPart, Expression, Factor,
    FactorOp, NameRef, PrefixOp, Program, RelOp, Routine, RoutineKind, SimpleExpr, Statement,
    SyntaxTree, Term, TermOp, TypeExpr, VariableRef, LIBRARY,
};
use crate::context::CompileContext;
use crate::errors::{PascalError, PascalResult};
use crate::frontend::token::Token;

pub struct Parser<'t, 'c> {
    tokens: &'t [(Token, usize)],
    position: usize,
    current_token: Token,
    line_number: usize,
    ctx: &'c mut CompileContext,
    blocks: Vec<Block>,
    decls: Vec<Decl>,
}

impl<'t, 'c> Parser<'t, 'c> {
    pub fn new(tokens: &'t [(Token, usize)], ctx: &'c mut CompileContext) -> Self {
        let (current_token, line_number) = tokens.first().cloned().unwrap_or((Token::Eof, 1));
        Self {
            tokens,
            position: 0,
            current_token,
            line_number,
            ctx,
            blocks: vec![Block::library()],
            decls: Vec::new(),
        }
    }

    fn next(&mut self) {
        self.position += 1;
        if let Some((element, line)) = self.tokens.get(self.position) {
            self.current_token = element.clone();
            self.line_number = *line;
        } else {
            self.current_token = Token::Eof;
        }
    }

    // Tests the kind of the token after the current one
    fn peek_is(&self, kind: Token) -> bool {
        match self.tokens.get(self.position + 1) {
            Some((token, _)) => *token == kind,
            None => kind == Token::Eof,
        }
    }

    fn expect(&mut self, expected: Token) -> PascalResult<()> {
        if expected != self.current_token {
            return Err(self.unexpected(expected.kind_name()));
        }
        self.next();
        Ok(())
    }

    fn expect_name(&mut self) -> PascalResult<String> {
        match &self.current_token {
            Token::Name(name) => {
                let name = name.clone();
                self.next();
                Ok(name)
            }
            _ => Err(self.unexpected("name")),
        }
    }

    fn unexpected(&self, expected: &str) -> PascalError {
        PascalError::syntax_error(expected, self.current_token.to_string(), self.line_number)
    }

    fn enter(&mut self, production: &str) {
        self.ctx.log.enter_parser(production);
    }

    fn leave(&mut self, production: &str) {
        self.ctx.log.leave_parser(production);
    }

    fn add_decl(&mut self, decl: Decl) -> DeclId {
        self.decls.push(decl);
        DeclId(self.decls.len() - 1)
    }

    /**
     * program = "program" name ";" block "." .
     */
    pub fn parse(mut self) -> PascalResult<SyntaxTree> {
        self.enter("program");
        let line = self.line_number;
        self.expect(Token::Program)?;
        let name = self.expect_name()?;
        self.ctx.set_program_name(&name);
        self.expect(Token::Semicolon)?;
        let block = self.parse_block(LIBRARY)?;
        self.expect(Token::Dot)?;
        if self.current_token != Token::Eof {
            return Err(self.unexpected(Token::Eof.kind_name()));
        }
        self.leave("program");
        Ok(SyntaxTree::new(Program { name, line, block }, self.blocks, self.decls))
    }

    /**
     * block = { const-part | type-part | var-part | func-decl | proc-decl }
     *         "begin" statm-list "end" .
     */
    fn parse_block(&mut self, enclosing: BlockId) -> PascalResult<BlockId> {
        self.enter("block");
        self.blocks.push(Block::new(Some(enclosing), self.line_number));
        let id = BlockId(self.blocks.len() - 1);

        let mut parts = Vec::new();
        loop {
            let part = match self.current_token {
                Token::Const => DeclPart::Consts(self.parse_const_part()?),
                Token::Type => DeclPart::Types(self.parse_type_part()?),
                Token::Var => DeclPart::Vars(self.parse_var_part()?),
                Token::Procedure | Token::Function => DeclPart::Routine(self.parse_routine(id)?),
                _ => break,
            };
            parts.push(part);
        }

        self.expect(Token::Begin)?;
        let statements = self.parse_statm_list()?;
        self.expect(Token::End)?;

        let block = &mut self.blocks[id.0];
        block.parts = parts;
        block.statements = statements;
        self.leave("block");
        Ok(id)
    }

    /**
     * const-part = "const" const-decl { const-decl } .
     * const-decl = name "=" constant ";" .
     */
    fn parse_const_part(&mut self) -> PascalResult<Vec<DeclId>> {
        self.enter("const-decl-part");
        self.expect(Token::Const)?;
        let mut ids = Vec::new();
        loop {
            self.enter("const-decl");
            let line = self.line_number;
            let name = self.expect_name()?;
            self.expect(Token::Equal)?;
            let value = self.parse_constant()?;
            self.expect(Token::Semicolon)?;
            ids.push(self.add_decl(Decl::new(name, line, DeclKind::Const { value })));
            self.leave("const-decl");
            if !matches!(self.current_token, Token::Name(_)) {
                break;
            }
        }
        self.leave("const-decl-part");
        Ok(ids)
    }

    /**
     * type-part = "type" type-decl { type-decl } .
     * type-decl = name "=" type ";" .
     */
    fn parse_type_part(&mut self) -> PascalResult<Vec<DeclId>> {
        self.enter("type-decl-part");
        self.expect(Token::Type)?;
        let mut ids = Vec::new();
        loop {
            self.enter("type-decl");
            let line = self.line_number;
            let name = self.expect_name()?;
            self.expect(Token::Equal)?;
            let ty = self.parse_type()?;
            self.expect(Token::Semicolon)?;
            ids.push(self.add_decl(Decl::new(name, line, DeclKind::Type { ty })));
            self.leave("type-decl");
            if !matches!(self.current_token, Token::Name(_)) {
                break;
            }
        }
        self.leave("type-decl-part");
        Ok(ids)
    }

    /**
     * var-part = "var" var-decl { var-decl } .
     * var-decl = name ":" type ";" .
     */
    fn parse_var_part(&mut self) -> PascalResult<Vec<DeclId>> {
        self.enter("var-decl-part");
        self.expect(Token::Var)?;
        let mut ids = Vec::new();
        loop {
            self.enter("var-decl");
            let line = self.line_number;
            let name = self.expect_name()?;
            self.expect(Token::Colon)?;
            let ty = self.parse_type()?;
            self.expect(Token::Semicolon)?;
            ids.push(self.add_decl(Decl::new(name, line, DeclKind::Var { ty })));
            self.leave("var-decl");
            if !matches!(self.current_token, Token::Name(_)) {
                break;
            }
        }
        self.leave("var-decl-part");
        Ok(ids)
    }

    /**
     * proc-decl = "procedure" name [ param-list ] ";" block ";" .
     * func-decl = "function" name [ param-list ] ":" type-name ";" block ";" .
     */
    fn parse_routine(&mut self, enclosing: BlockId) -> PascalResult<DeclId> {
        let is_function = self.current_token == Token::Function;
        let production = if is_function { "func-decl" } else { "proc-decl" };
        self.enter(production);
        let line = self.line_number;
        self.next(); // Consume 'procedure' or 'function'
        let name = self.expect_name()?;

        let params = if self.current_token == Token::LeftPar {
            self.parse_param_list()?
        } else {
            Vec::new()
        };

        let kind = if is_function {
            self.expect(Token::Colon)?;
            RoutineKind::Function(self.parse_type_name()?)
        } else {
            RoutineKind::Procedure
        };

        self.expect(Token::Semicolon)?;
        let body = self.parse_block(enclosing)?;
        self.expect(Token::Semicolon)?;

        let routine = Routine { kind, params, body: Some(body) };
        let id = self.add_decl(Decl::new(name, line, DeclKind::Routine(routine)));
        self.leave(production);
        Ok(id)
    }

    /**
     * param-list = "(" param-decl { ";" param-decl } ")" .
     * param-decl = name ":" type-name .
     */
    fn parse_param_list(&mut self) -> PascalResult<Vec<DeclId>> {
        self.enter("param-decl-list");
        self.expect(Token::LeftPar)?;
        let mut params = Vec::new();
        loop {
            self.enter("param-decl");
            let line = self.line_number;
            let name = self.expect_name()?;
            self.expect(Token::Colon)?;
            let ty = self.parse_type_name()?;
            params.push(self.add_decl(Decl::new(name, line, DeclKind::Param { ty })));
            self.leave("param-decl");
            if self.current_token != Token::Semicolon {
                break;
            }
            self.expect(Token::Semicolon)?;
        }
        self.expect(Token::RightPar)?;
        self.leave("param-decl-list");
        Ok(params)
    }

    /**
     * type = type-name | array-type | enum-type | range-type .
     */
    fn parse_type(&mut self) -> PascalResult<TypeExpr> {
        self.enter("type");
        let ty = match self.current_token {
            Token::Array => self.parse_array_type()?,
            Token::LeftPar => self.parse_enum_type()?,
            Token::Name(_) if self.peek_is(Token::Range) => self.parse_range_type()?,
            Token::Name(_) => TypeExpr::Named(self.parse_type_name()?),
            Token::IntVal(_) | Token::StringVal(_) => self.parse_range_type()?,
            _ => return Err(self.unexpected("type")),
        };
        self.leave("type");
        Ok(ty)
    }

    fn parse_type_name(&mut self) -> PascalResult<NameRef> {
        self.enter("type-name");
        let line = self.line_number;
        let name = self.expect_name()?;
        self.leave("type-name");
        Ok(NameRef::new(name, line))
    }

    /**
     * array-type = "array" "[" type "]" "of" type .
     */
    fn parse_array_type(&mut self) -> PascalResult<TypeExpr> {
        self.enter("arr-type");
        let line = self.line_number;
        self.expect(Token::Array)?;
        self.expect(Token::LeftBracket)?;
        let index = self.parse_type()?;
        self.expect(Token::RightBracket)?;
        self.expect(Token::Of)?;
        let element = self.parse_type()?;
        self.leave("arr-type");
        Ok(TypeExpr::Array {
            index: Box::new(index),
            element: Box::new(element),
            line,
        })
    }

    /**
     * enum-type = "(" name { "," name } ")" .
     */
    fn parse_enum_type(&mut self) -> PascalResult<TypeExpr> {
        self.enter("enum-type");
        let line = self.line_number;
        self.expect(Token::LeftPar)?;
        let mut literals = Vec::new();
        loop {
            let literal_line = self.line_number;
            let name = self.expect_name()?;
            let code = literals.len() as i64;
            literals.push(self.add_decl(Decl::new(name, literal_line, DeclKind::EnumLiteral { code })));
            if self.current_token != Token::Comma {
                break;
            }
            self.expect(Token::Comma)?;
        }
        self.expect(Token::RightPar)?;
        self.leave("enum-type");
        Ok(TypeExpr::Enum { literals, line })
    }

    /**
     * range-type = constant ".." constant .
     */
    fn parse_range_type(&mut self) -> PascalResult<TypeExpr> {
        self.enter("range-type");
        let line = self.line_number;
        let low = self.parse_constant()?;
        self.expect(Token::Range)?;
        let high = self.parse_constant()?;
        self.leave("range-type");
        Ok(TypeExpr::Range { low, high, line })
    }

    /**
     * constant = number | string | name .
     */
    fn parse_constant(&mut self) -> PascalResult<Constant> {
        self.enter("constant");
        let line = self.line_number;
        let constant = match &self.current_token {
            Token::IntVal(value) => Constant::Number { value: *value, line },
            Token::StringVal(value) => Constant::from_string_token(value.clone(), line),
            Token::Name(name) => Constant::Named(NameRef::new(name.clone(), line)),
            _ => return Err(self.unexpected("constant")),
        };
        self.next();
        self.leave("constant");
        Ok(constant)
    }

    /**
     * statm-list = statement { ";" statement } .
     */
    fn parse_statm_list(&mut self) -> PascalResult<Vec<Statement>> {
        self.enter("statm-list");
        let mut statements = vec![self.parse_statement()?];
        while self.current_token == Token::Semicolon {
            self.expect(Token::Semicolon)?;
            statements.push(self.parse_statement()?);
        }
        self.leave("statm-list");
        Ok(statements)
    }

    /**
     * statement = assign | compound | if | while | proc-call | empty .
     */
    fn parse_statement(&mut self) -> PascalResult<Statement> {
        self.enter("statement");
        let statement = match self.current_token {
            Token::Name(_) if self.peek_is(Token::Assign) || self.peek_is(Token::LeftBracket) => {
                self.parse_assignment()?
            }
            Token::Name(_) => self.parse_proc_call()?,
            Token::Begin => self.parse_compound()?,
            Token::If => self.parse_if()?,
            Token::While => self.parse_while()?,
            _ => Statement::Empty { line: self.line_number },
        };
        self.leave("statement");
        Ok(statement)
    }

    /**
     * assign = variable ":=" expression .
     */
    fn parse_assignment(&mut self) -> PascalResult<Statement> {
        self.enter("assign-statm");
        let line = self.line_number;
        let target = self.parse_variable()?;
        self.expect(Token::Assign)?;
        let value = self.parse_expression()?;
        self.leave("assign-statm");
        Ok(Statement::Assign { target, value, line })
    }

    /**
     * compound = "begin" statm-list "end" .
     */
    fn parse_compound(&mut self) -> PascalResult<Statement> {
        self.enter("compound-statm");
        let line = self.line_number;
        self.expect(Token::Begin)?;
        let body = self.parse_statm_list()?;
        self.expect(Token::End)?;
        self.leave("compound-statm");
        Ok(Statement::Compound { body, line })
    }

    /**
     * if = "if" expression "then" statement [ "else" statement ] .
     */
    fn parse_if(&mut self) -> PascalResult<Statement> {
        self.enter("if-statm");
        let line = self.line_number;
        self.expect(Token::If)?;
        let condition = self.parse_expression()?;
        self.expect(Token::Then)?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.current_token == Token::Else {
            self.expect(Token::Else)?;
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        self.leave("if-statm");
        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            line,
        })
    }

    /**
     * while = "while" expression "do" statement .
     */
    fn parse_while(&mut self) -> PascalResult<Statement> {
        self.enter("while-statm");
        let line = self.line_number;
        self.expect(Token::While)?;
        let condition = self.parse_expression()?;
        self.expect(Token::Do)?;
        let body = Box::new(self.parse_statement()?);
        self.leave("while-statm");
        Ok(Statement::While { condition, body, line })
    }

    /**
     * proc-call = name [ "(" expression { "," expression } ")" ] .
     */
    fn parse_proc_call(&mut self) -> PascalResult<Statement> {
        self.enter("proc-call");
        let line = self.line_number;
        let name = NameRef::new(self.expect_name()?, line);
        let args = if self.current_token == Token::LeftPar {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        self.leave("proc-call");
        Ok(Statement::Call { name, args, line })
    }

    fn parse_arguments(&mut self) -> PascalResult<Vec<Expression>> {
        self.expect(Token::LeftPar)?;
        let mut args = vec![self.parse_expression()?];
        while self.current_token == Token::Comma {
            self.expect(Token::Comma)?;
            args.push(self.parse_expression()?);
        }
        self.expect(Token::RightPar)?;
        Ok(args)
    }

    /**
     * variable = name [ "[" expression "]" ] .
     */
    fn parse_variable(&mut self) -> PascalResult<VariableRef> {
        self.enter("variable");
        let line = self.line_number;
        let name = NameRef::new(self.expect_name()?, line);
        let index = if self.current_token == Token::LeftBracket {
            self.expect(Token::LeftBracket)?;
            let index = self.parse_expression()?;
            self.expect(Token::RightBracket)?;
            Some(Box::new(index))
        } else {
            None
        };
        self.leave("variable");
        Ok(VariableRef { name, index })
    }

    /**
     * expression = simple-expr [ rel-opr simple-expr ] .
     */
    fn parse_expression(&mut self) -> PascalResult<Expression> {
        self.enter("expression");
        let line = self.line_number;
        let left = self.parse_simple_expr()?;
        let rel = if self.current_token.is_rel_opr() {
            let op = match self.current_token {
                Token::Equal => RelOp::Equal,
                Token::NotEqual => RelOp::NotEqual,
                Token::Less => RelOp::Less,
                Token::LessEqual => RelOp::LessEqual,
                Token::Greater => RelOp::Greater,
                _ => RelOp::GreaterEqual,
            };
            self.next();
            Some((op, self.parse_simple_expr()?))
        } else {
            None
        };
        self.leave("expression");
        Ok(Expression { left, rel, line })
    }

    /**
     * simple-expr = [ "+" | "-" ] term { ( "+" | "-" | "or" ) term } .
     */
    fn parse_simple_expr(&mut self) -> PascalResult<SimpleExpr> {
        self.enter("simple-expr");
        let line = self.line_number;
        let prefix = if self.current_token.is_prefix_opr() {
            let op = if self.current_token == Token::Subtract { PrefixOp::Minus } else { PrefixOp::Plus };
            self.next();
            Some(op)
        } else {
            None
        };
        let first = self.parse_term()?;
        let mut rest = Vec::new();
        while self.current_token.is_term_opr() {
            let op = match self.current_token {
                Token::Add => TermOp::Add,
                Token::Subtract => TermOp::Subtract,
                _ => TermOp::Or,
            };
            self.next();
            rest.push((op, self.parse_term()?));
        }
        self.leave("simple-expr");
        Ok(SimpleExpr { prefix, first, rest, line })
    }

    /**
     * term = factor { ( "*" | "div" | "mod" | "and" ) factor } .
     */
    fn parse_term(&mut self) -> PascalResult<Term> {
        self.enter("term");
        let line = self.line_number;
        let first = self.parse_factor()?;
        let mut rest = Vec::new();
        while self.current_token.is_factor_opr() {
            let op = match self.current_token {
                Token::Multiply => FactorOp::Multiply,
                Token::Div => FactorOp::Div,
                Token::Mod => FactorOp::Mod,
                _ => FactorOp::And,
            };
            self.next();
            rest.push((op, self.parse_factor()?));
        }
        self.leave("term");
        Ok(Term { first, rest, line })
    }

    /**
     * factor = constant | variable | func-call | "(" expression ")" | "not" factor .
     */
    fn parse_factor(&mut self) -> PascalResult<Factor> {
        self.enter("factor");
        let line = self.line_number;
        let factor = match self.current_token {
            Token::IntVal(_) | Token::StringVal(_) => Factor::Constant(self.parse_constant()?),
            Token::Name(_) if self.peek_is(Token::LeftPar) => Factor::Call(self.parse_func_call()?),
            Token::Name(_) => Factor::Variable(self.parse_variable()?),
            Token::LeftPar => {
                self.expect(Token::LeftPar)?;
                let inner = self.parse_expression()?;
                self.expect(Token::RightPar)?;
                Factor::Inner(Box::new(inner))
            }
            Token::Not => {
                self.expect(Token::Not)?;
                let operand = Box::new(self.parse_factor()?);
                Factor::Not { operand, line }
            }
            _ => return Err(self.unexpected("factor")),
        };
        self.leave("factor");
        Ok(factor)
    }

    /**
     * func-call = name "(" expression { "," expression } ")" .
     */
    fn parse_func_call(&mut self) -> PascalResult<CallExpr> {
        self.enter("func-call");
        let line = self.line_number;
        let name = NameRef::new(self.expect_name()?, line);
        let args = self.parse_arguments()?;
        self.leave("func-call");
        Ok(CallExpr { name, args })
    }
}

// Convenience function mirroring `lexer::scan`
pub fn parse(tokens: &[(Token, usize)], ctx: &mut CompileContext) -> PascalResult<SyntaxTree> {
    Parser::new(tokens, ctx).parse()
}
