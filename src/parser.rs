//! Recursive-descent statement parser with a Pratt (precedence-climbing)
//! expression core (spec §4.2).
//!
//! Statements are parsed top-down by keyword lookahead. Expressions are
//! parsed by `parse_expr`, which climbs a fixed precedence ladder:
//! `or` < `and` < unary `not` < comparison chain < additive < multiplicative
//! < exponent (right-associative) < unary minus < primary/postfix
//! (`.`, `?.`, `[`, `?[`, call).

use crate::ast::{BinaryOperator, Expr, FunctionDef, ImportStatement, NumberLiteral, Program, Stmt, UnaryOperator};
use crate::error::ParseError;
use crate::token::{NumberKind, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let mut imports = Vec::new();
        let mut functions = Vec::new();

        self.skip_newlines();
        while !self.check(&TokenKind::Eof) {
            if self.check(&TokenKind::Import) {
                imports.push(self.parse_import()?);
            } else if self.check(&TokenKind::Def) {
                functions.push(self.parse_function_def()?);
            } else {
                let found = self.describe_current();
                return Err(ParseError::new("'def' or 'import'", found, self.line(), self.column()));
            }
            self.skip_newlines();
        }

        if !functions.iter().any(|f| f.name == "transform" && f.params.len() == 1) {
            return Err(ParseError::new(
                "a function named 'transform' with exactly one parameter",
                "no matching function",
                self.line(),
                self.column(),
            ));
        }

        Ok(Program { imports, functions })
    }

    // --- statements ------------------------------------------------------

    fn parse_import(&mut self) -> Result<ImportStatement, ParseError> {
        let line = self.line();
        self.expect(&TokenKind::Import)?;
        let module = self.expect_identifier()?;
        self.expect_stmt_end()?;
        Ok(ImportStatement { module, line })
    }

    fn parse_function_def(&mut self) -> Result<FunctionDef, ParseError> {
        let line = self.line();
        self.expect(&TokenKind::Def)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            params.push(self.expect_identifier()?);
            while self.matches(&TokenKind::Comma) {
                params.push(self.expect_identifier()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Colon)?;
        let body = self.parse_block()?;
        Ok(FunctionDef { name, params, body, line })
    }

    /// Parses an indented block: `NEWLINE INDENT stmt+ DEDENT`. Tolerates a
    /// missing `NEWLINE` (single-statement bodies written inline are not
    /// otherwise legal per spec, but a stray blank-line discrepancy from the
    /// lexer should not abort an otherwise valid program).
    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.matches(&TokenKind::Newline);
        self.skip_newlines();
        self.expect(&TokenKind::Indent)?;
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.check(&TokenKind::Dedent) && !self.check(&TokenKind::Eof) {
            stmts.push(self.parse_statement()?);
            self.skip_newlines();
        }
        self.expect(&TokenKind::Dedent)?;
        Ok(stmts)
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current_kind() {
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => {
                let line = self.line();
                self.advance();
                self.expect_stmt_end()?;
                Ok(Stmt::Break { line })
            }
            TokenKind::Continue => {
                let line = self.line();
                self.advance();
                self.expect_stmt_end()?;
                Ok(Stmt::Continue { line })
            }
            TokenKind::Import => {
                let stmt = self.parse_import()?;
                Ok(Stmt::Import { module: stmt.module, line: stmt.line })
            }
            _ => self.parse_assignment_or_expr(),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let line = self.line();
        self.expect(&TokenKind::If)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        let then_body = self.parse_block()?;

        let mut elifs = Vec::new();
        loop {
            self.skip_newlines_before_clause();
            if self.check(&TokenKind::Elif) {
                self.advance();
                let elif_cond = self.parse_expr()?;
                self.expect(&TokenKind::Colon)?;
                let elif_body = self.parse_block()?;
                elifs.push((elif_cond, elif_body));
            } else {
                break;
            }
        }

        let mut else_body = None;
        self.skip_newlines_before_clause();
        if self.check(&TokenKind::Else) {
            self.advance();
            self.expect(&TokenKind::Colon)?;
            else_body = Some(self.parse_block()?);
        }

        Ok(Stmt::If { cond, then_body, elifs, else_body, line })
    }

    /// `elif`/`else` sit at the same indentation as the `if` they belong to,
    /// so a `DEDENT` (closing the prior block) may precede them without
    /// closing the enclosing block too. Peek past it without consuming it
    /// unless the clause keyword is actually there.
    fn skip_newlines_before_clause(&mut self) {
        let mut lookahead = self.pos;
        while matches!(self.tokens.get(lookahead).map(|t| &t.kind), Some(TokenKind::Newline)) {
            lookahead += 1;
        }
        if matches!(self.tokens.get(lookahead).map(|t| &t.kind), Some(TokenKind::Dedent)) {
            let mut after_dedent = lookahead;
            while matches!(self.tokens.get(after_dedent).map(|t| &t.kind), Some(TokenKind::Dedent)) {
                after_dedent += 1;
            }
            if matches!(
                self.tokens.get(after_dedent).map(|t| &t.kind),
                Some(TokenKind::Elif | TokenKind::Else)
            ) {
                self.pos = after_dedent;
                return;
            }
        }
        self.pos = lookahead;
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let line = self.line();
        self.expect(&TokenKind::For)?;
        let var = self.expect_identifier()?;
        self.expect(&TokenKind::In)?;
        let iterable = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        let body = self.parse_block()?;
        Ok(Stmt::For { var, iterable, body, line })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let line = self.line();
        self.expect(&TokenKind::Return)?;
        let value = if self.check(&TokenKind::Newline) || self.check(&TokenKind::Eof) || self.check(&TokenKind::Dedent) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_stmt_end()?;
        Ok(Stmt::Return { value, line })
    }

    fn parse_assignment_or_expr(&mut self) -> Result<Stmt, ParseError> {
        let line = self.line();
        let expr = self.parse_expr()?;
        if self.matches(&TokenKind::Assign) {
            if !expr.is_lvalue() {
                return Err(ParseError::new("an assignable target", "a non-assignable expression", line, self.column()));
            }
            let value = self.parse_expr()?;
            self.expect_stmt_end()?;
            Ok(Stmt::Assignment { target: expr, value, line })
        } else {
            self.expect_stmt_end()?;
            Ok(Stmt::Expression { expr, line })
        }
    }

    fn expect_stmt_end(&mut self) -> Result<(), ParseError> {
        if self.check(&TokenKind::Newline) {
            self.advance();
        } else if !self.check(&TokenKind::Eof) && !self.check(&TokenKind::Dedent) {
            let found = self.describe_current();
            return Err(ParseError::new("end of statement", found, self.line(), self.column()));
        }
        Ok(())
    }

    // --- expressions: Pratt core ------------------------------------------

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::Or) {
            let line = self.line();
            self.advance();
            let right = self.parse_and()?;
            left = Expr::BinaryOp { left: Box::new(left), op: BinaryOperator::Or, right: Box::new(right), line };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;
        while self.check(&TokenKind::And) {
            let line = self.line();
            self.advance();
            let right = self.parse_not()?;
            left = Expr::BinaryOp { left: Box::new(left), op: BinaryOperator::And, right: Box::new(right), line };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Not) {
            let line = self.line();
            self.advance();
            let operand = self.parse_not()?;
            return Ok(Expr::UnaryOp { op: UnaryOperator::Not, operand: Box::new(operand), line });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Eq => BinaryOperator::Eq,
                TokenKind::NotEq => BinaryOperator::NotEq,
                TokenKind::Lt => BinaryOperator::Lt,
                TokenKind::Gt => BinaryOperator::Gt,
                TokenKind::LtEq => BinaryOperator::LtEq,
                TokenKind::GtEq => BinaryOperator::GtEq,
                TokenKind::In => BinaryOperator::In,
                TokenKind::Not if self.peek_kind(1) == Some(TokenKind::In) => {
                    let line = self.line();
                    self.advance();
                    self.advance();
                    let right = self.parse_additive()?;
                    left = Expr::BinaryOp { left: Box::new(left), op: BinaryOperator::NotIn, right: Box::new(right), line };
                    continue;
                }
                _ => break,
            };
            let line = self.line();
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right), line };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Sub,
                _ => break,
            };
            let line = self.line();
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right), line };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary_minus()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinaryOperator::Mul,
                TokenKind::Slash => BinaryOperator::Div,
                TokenKind::DoubleSlash => BinaryOperator::FloorDiv,
                TokenKind::Percent => BinaryOperator::Mod,
                _ => break,
            };
            let line = self.line();
            self.advance();
            let right = self.parse_unary_minus()?;
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right), line };
        }
        Ok(left)
    }

    /// Unary minus binds tighter than the binary arithmetic operators above
    /// it but looser than `**`, so `-2 ** 2` parses as `-(2 ** 2)`.
    fn parse_unary_minus(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Minus) {
            let line = self.line();
            self.advance();
            let operand = self.parse_unary_minus()?;
            return Ok(Expr::UnaryOp { op: UnaryOperator::Neg, operand: Box::new(operand), line });
        }
        self.parse_power()
    }

    /// Right-associative: `2 ** 3 ** 2` is `2 ** (3 ** 2)`.
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;
        if self.check(&TokenKind::DoubleStar) {
            let line = self.line();
            self.advance();
            let exponent = self.parse_unary_minus()?;
            return Ok(Expr::BinaryOp { left: Box::new(base), op: BinaryOperator::Pow, right: Box::new(exponent), line });
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            expr = match self.current_kind() {
                TokenKind::Dot | TokenKind::SafeDot => {
                    let safe = self.check(&TokenKind::SafeDot);
                    let line = self.line();
                    self.advance();
                    let name = self.expect_identifier()?;
                    if self.check(&TokenKind::LParen) {
                        self.advance();
                        let args = self.parse_call_args()?;
                        self.expect(&TokenKind::RParen)?;
                        Expr::MethodCall { object: Box::new(expr), name, args, line }
                    } else {
                        Expr::AttrAccess { object: Box::new(expr), attr: name, safe, line }
                    }
                }
                TokenKind::LBracket | TokenKind::SafeBracket => {
                    let safe = self.check(&TokenKind::SafeBracket);
                    let line = self.line();
                    self.advance();
                    let key = self.parse_expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    Expr::DictAccess { object: Box::new(expr), key: Box::new(key), safe, line }
                }
                _ => break,
            };
        }
        Ok(expr)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.matches(&TokenKind::Comma) {
                args.push(self.parse_expr()?);
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let line = self.line();
        match self.current_kind() {
            TokenKind::Number(kind) => {
                let text = self.current_lexeme();
                self.advance();
                let value = match kind {
                    NumberKind::Integer => NumberLiteral::Integer(
                        text.parse()
                            .map_err(|_| ParseError::new("a valid integer literal", text.clone(), line, self.column()))?,
                    ),
                    NumberKind::Double => NumberLiteral::Double(
                        text.parse()
                            .map_err(|_| ParseError::new("a valid number literal", text.clone(), line, self.column()))?,
                    ),
                };
                Ok(Expr::NumberLiteral { value, line })
            }
            TokenKind::String => {
                let value = self.current_lexeme();
                self.advance();
                Ok(Expr::StringLiteral { value, line })
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::BooleanLiteral { value: true, line })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::BooleanLiteral { value: false, line })
            }
            TokenKind::None => {
                self.advance();
                Ok(Expr::NullLiteral { line })
            }
            TokenKind::Identifier => {
                let name = self.current_lexeme();
                self.advance();
                if self.check(&TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_call_args()?;
                    self.expect(&TokenKind::RParen)?;
                    Ok(Expr::FunctionCallExpression { name, args, line })
                } else {
                    Ok(Expr::Identifier { name, line })
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    elements.push(self.parse_expr()?);
                    while self.matches(&TokenKind::Comma) {
                        if self.check(&TokenKind::RBracket) {
                            break;
                        }
                        elements.push(self.parse_expr()?);
                    }
                }
                self.expect(&TokenKind::RBracket)?;
                Ok(Expr::ListLiteral { elements, line })
            }
            TokenKind::LBrace => {
                self.advance();
                let mut entries = Vec::new();
                if !self.check(&TokenKind::RBrace) {
                    entries.push(self.parse_dict_entry()?);
                    while self.matches(&TokenKind::Comma) {
                        if self.check(&TokenKind::RBrace) {
                            break;
                        }
                        entries.push(self.parse_dict_entry()?);
                    }
                }
                self.expect(&TokenKind::RBrace)?;
                Ok(Expr::DictLiteral { entries, line })
            }
            _ => {
                let found = self.describe_current();
                Err(ParseError::new("an expression", found, line, self.column()))
            }
        }
    }

    fn parse_dict_entry(&mut self) -> Result<(Expr, Expr), ParseError> {
        let key = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        let value = self.parse_expr()?;
        Ok((key, value))
    }

    // --- token-stream primitives ------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn current_lexeme(&self) -> String {
        self.current().lexeme.clone()
    }

    fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| t.kind)
    }

    fn line(&self) -> u32 {
        self.current().line
    }

    fn column(&self) -> u32 {
        self.current().column
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current_kind() == kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            let found = self.describe_current();
            Err(ParseError::new(format!("{kind:?}"), found, self.line(), self.column()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if self.check(&TokenKind::Identifier) {
            let name = self.current_lexeme();
            self.advance();
            Ok(name)
        } else {
            let found = self.describe_current();
            Err(ParseError::new("an identifier", found, self.line(), self.column()))
        }
    }

    fn describe_current(&self) -> String {
        self.current().to_string()
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> Result<Program, ParseError> {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens).parse_program()
    }

    #[test]
    fn parses_minimal_transform() {
        let program = parse("def transform(INPUT):\n    return INPUT\n").unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].name, "transform");
        assert_eq!(program.functions[0].params, vec!["INPUT".to_string()]);
    }

    #[test]
    fn missing_transform_is_an_error() {
        let err = parse("def helper(x):\n    return x\n").unwrap_err();
        assert!(err.expected.contains("transform"));
    }

    /// `while` is a reserved keyword token (spec §3's token list) but is not
    /// part of the statement grammar (spec §4.2's grammar has no `while`
    /// production), so it can be tokenized but never parsed as a statement
    /// or used as an identifier.
    #[test]
    fn while_is_reserved_but_not_a_statement() {
        assert!(parse("def transform(INPUT):\n    while True:\n        break\n    return INPUT\n").is_err());
        assert!(parse("def transform(INPUT):\n    while = 1\n    return INPUT\n").is_err());
    }

    #[test]
    fn exponent_is_right_associative() {
        let program = parse("def transform(INPUT):\n    return 2 ** 3 ** 2\n").unwrap();
        let Stmt::Return { value: Some(Expr::BinaryOp { op: BinaryOperator::Pow, right, .. }), .. } =
            &program.functions[0].body[0]
        else {
            panic!("expected a Pow expression");
        };
        assert!(matches!(**right, Expr::BinaryOp { op: BinaryOperator::Pow, .. }));
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        let program = parse("def transform(INPUT):\n    return -2 ** 2\n").unwrap();
        let Stmt::Return { value: Some(Expr::UnaryOp { op: UnaryOperator::Neg, operand, .. }), .. } =
            &program.functions[0].body[0]
        else {
            panic!("expected unary neg at the top");
        };
        assert!(matches!(**operand, Expr::BinaryOp { op: BinaryOperator::Pow, .. }));
    }

    #[test]
    fn if_elif_else_chain() {
        let src = "def transform(INPUT):\n    if INPUT.a:\n        return 1\n    elif INPUT.b:\n        return 2\n    else:\n        return 3\n";
        let program = parse(src).unwrap();
        let Stmt::If { elifs, else_body, .. } = &program.functions[0].body[0] else {
            panic!("expected an if statement");
        };
        assert_eq!(elifs.len(), 1);
        assert!(else_body.is_some());
    }

    #[test]
    fn safe_navigation_chain() {
        let program = parse("def transform(INPUT):\n    return INPUT?.a?.b\n").unwrap();
        let Stmt::Return { value: Some(Expr::AttrAccess { safe: true, .. }), .. } = &program.functions[0].body[0] else {
            panic!("expected a safe attribute access");
        };
    }

    #[test]
    fn assignment_target_must_be_lvalue() {
        let err = parse("def transform(INPUT):\n    1 + 1 = 2\n").unwrap_err();
        assert!(err.expected.contains("assignable"));
    }

    /// Quantified invariant (spec §8): every AST node's line number lies
    /// within the source.
    #[test]
    fn every_node_line_number_lies_within_the_source() {
        let src = "\
def helper(a, b):
    total = a + b
    if total > 10:
        return total
    elif total < 0:
        return 0 - total
    else:
        for x in range(total):
            if x == 5:
                break
            elif x == 3:
                continue
        return total
def transform(INPUT):
    result = helper(INPUT.a, INPUT.b)
    OUTPUT = {\"sum\": result, \"items\": [1, 2, 3]}
    return OUTPUT
";
        let program = parse(src).unwrap();
        let line_count = src.lines().count() as u32;

        fn check_expr(expr: &Expr, max_line: u32) {
            let line = expr.line();
            assert!((1..=max_line).contains(&line), "expr line {line} out of [1, {max_line}]");
            match expr {
                Expr::ListLiteral { elements, .. } => elements.iter().for_each(|e| check_expr(e, max_line)),
                Expr::DictLiteral { entries, .. } => entries.iter().for_each(|(k, v)| {
                    check_expr(k, max_line);
                    check_expr(v, max_line);
                }),
                Expr::BinaryOp { left, right, .. } => {
                    check_expr(left, max_line);
                    check_expr(right, max_line);
                }
                Expr::UnaryOp { operand, .. } => check_expr(operand, max_line),
                Expr::AttrAccess { object, .. } => check_expr(object, max_line),
                Expr::DictAccess { object, key, .. } => {
                    check_expr(object, max_line);
                    check_expr(key, max_line);
                }
                Expr::MethodCall { object, args, .. } => {
                    check_expr(object, max_line);
                    args.iter().for_each(|a| check_expr(a, max_line));
                }
                Expr::FunctionCallExpression { args, .. } => args.iter().for_each(|a| check_expr(a, max_line)),
                Expr::Identifier { .. }
                | Expr::StringLiteral { .. }
                | Expr::NumberLiteral { .. }
                | Expr::BooleanLiteral { .. }
                | Expr::NullLiteral { .. } => {}
            }
        }

        fn check_block(body: &[Stmt], max_line: u32) {
            for stmt in body {
                let line = stmt.line();
                assert!((1..=max_line).contains(&line), "stmt line {line} out of [1, {max_line}]");
                match stmt {
                    Stmt::Assignment { target, value, .. } => {
                        check_expr(target, max_line);
                        check_expr(value, max_line);
                    }
                    Stmt::If { cond, then_body, elifs, else_body, .. } => {
                        check_expr(cond, max_line);
                        check_block(then_body, max_line);
                        for (elif_cond, elif_body) in elifs {
                            check_expr(elif_cond, max_line);
                            check_block(elif_body, max_line);
                        }
                        if let Some(body) = else_body {
                            check_block(body, max_line);
                        }
                    }
                    Stmt::For { iterable, body, .. } => {
                        check_expr(iterable, max_line);
                        check_block(body, max_line);
                    }
                    Stmt::Return { value: Some(value), .. } => check_expr(value, max_line),
                    Stmt::Return { value: None, .. }
                    | Stmt::Break { .. }
                    | Stmt::Continue { .. }
                    | Stmt::Import { .. } => {}
                    Stmt::Expression { expr, .. } => check_expr(expr, max_line),
                }
            }
        }

        for function in &program.functions {
            assert!((1..=line_count).contains(&function.line));
            check_block(&function.body, line_count);
        }
    }
}
