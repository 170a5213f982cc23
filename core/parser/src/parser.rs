//! FILENAME: core/parser/src/parser.rs
//! PURPOSE: Recursive descent parser that converts a stream of Tokens into an AST.
//! CONTEXT: This is the second stage of the parsing pipeline. It takes tokens
//! from the Lexer and builds an Expression tree that can be evaluated.
//!
//! GRAMMAR:
//!   expression --> signs? term ( signs term )*          signs --> ("+" | "-")+
//!   term       --> func_term ( ("*" | "/") func_term )*
//!   func_term  --> primary ( "^" primary )*
//!   primary    --> FUNCTION "(" expression ")" | "E^" primary | factor
//!   factor     --> VARIABLE | CONSTANT | NUMBER | "(" expression ")"
//!
//! `^` is left-associative (2^3^2 = 64) and binds tighter than a leading
//! sign (-x^2 = -(x^2)). A run of signs collapses to a single one.
//! A leading minus negates a number literal in place and otherwise becomes
//! a multiplication by -1.
//!
//! LIMITS: bracket nesting, tree depth and DELTA-in-DELTA nesting are each
//! bounded; exceeding any of them is code 8.

use crate::ast::{BinaryOperator, Expression, Function};
use crate::error::{ParseResult, SyntaxError, SyntaxErrorKind};
use crate::lexer::Lexer;
use crate::options::{
    ParserOptions, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TREE_DEPTH, DEFAULT_VARIABLE_NAME,
    MAX_DELTA_NESTING,
};
use crate::token::{Precedence, Token};

/// A subtree together with its depth, so the depth bound is checked as the
/// tree grows instead of by a second walk.
struct Node {
    expr: Expression,
    depth: usize,
}

impl Node {
    fn leaf(expr: Expression) -> Self {
        Node { expr, depth: 1 }
    }
}

/// The Parser struct holds the lexer and current token state.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    /// Character offset of `current_token`.
    current_pos: usize,
    /// Open brackets, function arguments and `E^` arguments.
    nesting: usize,
    /// DELTA arguments currently open.
    delta_nesting: usize,
    max_depth: usize,
    max_tree_depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser with the default variable name and depth bound.
    /// Automatically advances to the first token.
    pub fn new(input: &'a str) -> Self {
        Self::build(
            input,
            DEFAULT_VARIABLE_NAME,
            DEFAULT_MAX_DEPTH,
            DEFAULT_MAX_TREE_DEPTH,
        )
    }

    pub fn with_options(input: &'a str, options: &'a ParserOptions) -> Self {
        Self::build(
            input,
            &options.variable_name,
            options.max_depth,
            options.max_tree_depth,
        )
    }

    fn build(
        input: &'a str,
        variable_name: &'a str,
        max_depth: usize,
        max_tree_depth: usize,
    ) -> Self {
        let mut lexer = Lexer::with_variable(input, variable_name);
        let current_token = lexer.next_token();
        let current_pos = lexer.token_start();
        Parser {
            lexer,
            current_token,
            current_pos,
            nesting: 0,
            delta_nesting: 0,
            max_depth,
            max_tree_depth,
        }
    }

    /// Parses the entire input and returns the AST.
    pub fn parse(&mut self) -> ParseResult<Expression> {
        // Handle empty formula
        if self.current_token == Token::EOF {
            return Err(SyntaxError::new(SyntaxErrorKind::EmptyFormula, 0));
        }

        let node = self.parse_expression()?;

        // Ensure we consumed all tokens
        match self.current_token {
            Token::EOF => Ok(node.expr),
            Token::RParen => Err(self.fail(SyntaxErrorKind::MissingOpeningBracket)),
            _ => Err(self.fail(SyntaxErrorKind::MissingOperator)),
        }
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current_token = self.lexer.next_token();
        self.current_pos = self.lexer.token_start();
    }

    /// Builds the error for the current position. A lexical error token
    /// always wins over the grammar error the caller was about to report.
    fn fail(&self, kind: SyntaxErrorKind) -> SyntaxError {
        let kind = match self.current_token {
            Token::Illegal(_) => SyntaxErrorKind::IllegalCharacter,
            Token::Unknown(_) => SyntaxErrorKind::UnknownIdentifier,
            Token::Malformed(_) => SyntaxErrorKind::MissingTerm,
            _ => kind,
        };
        SyntaxError::new(kind, self.current_pos)
    }

    fn enter(&mut self) -> ParseResult<()> {
        if self.nesting >= self.max_depth {
            return Err(self.fail(SyntaxErrorKind::TooDeeplyNested));
        }
        self.nesting += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn enter_delta(&mut self) -> ParseResult<()> {
        if self.delta_nesting >= MAX_DELTA_NESTING {
            return Err(self.fail(SyntaxErrorKind::TooDeeplyNested));
        }
        self.delta_nesting += 1;
        Ok(())
    }

    fn node(&self, expr: Expression, depth: usize) -> ParseResult<Node> {
        if depth > self.max_tree_depth {
            return Err(self.fail(SyntaxErrorKind::TooDeeplyNested));
        }
        Ok(Node { expr, depth })
    }

    fn combine(&self, left: Node, op: BinaryOperator, right: Node) -> ParseResult<Node> {
        let depth = 1 + left.depth.max(right.depth);
        self.node(Expression::binary(left.expr, op, right.expr), depth)
    }

    fn apply(&self, func: Function, arg: Node) -> ParseResult<Node> {
        let depth = 1 + arg.depth;
        self.node(Expression::function(func, arg.expr), depth)
    }

    /// Consumes a run of `+`/`-` and reports whether the net sign is negative.
    fn parse_signs(&mut self) -> bool {
        let mut negative = false;
        loop {
            match self.current_token {
                Token::Minus => negative = !negative,
                Token::Plus => {}
                _ => return negative,
            }
            self.advance();
        }
    }

    fn negate(&self, operand: Node) -> ParseResult<Node> {
        match operand.expr {
            Expression::Number(n) => Ok(Node::leaf(Expression::Number(-n))),
            expr => self.combine(
                Node::leaf(Expression::Number(-1.0)),
                BinaryOperator::Multiply,
                Node {
                    expr,
                    depth: operand.depth,
                },
            ),
        }
    }

    /// Parses additive expressions (+ and -), including a leading sign.
    fn parse_expression(&mut self) -> ParseResult<Node> {
        let negative = self.parse_signs();
        let first = self.parse_term()?;
        let mut left = if negative { self.negate(first)? } else { first };

        while self.current_token.precedence() == Some(Precedence::Additive) {
            let op = if self.parse_signs() {
                BinaryOperator::Subtract
            } else {
                BinaryOperator::Add
            };
            let right = self.parse_term()?;
            left = self.combine(left, op, right)?;
        }

        Ok(left)
    }

    /// Parses multiplicative expressions (* and /).
    fn parse_term(&mut self) -> ParseResult<Node> {
        let mut left = self.parse_func_term()?;

        while self.current_token.precedence() == Some(Precedence::Multiplicative) {
            let op = match self.current_token.binary_operator() {
                Some(op) => op,
                None => break,
            };
            self.advance();
            let right = self.parse_func_term()?;
            left = self.combine(left, op, right)?;
        }

        Ok(left)
    }

    /// Parses power expressions, left to right.
    fn parse_func_term(&mut self) -> ParseResult<Node> {
        let mut left = self.parse_primary()?;

        while self.current_token.precedence() == Some(Precedence::Power) {
            self.advance();
            let right = self.parse_primary()?;
            left = self.combine(left, BinaryOperator::Power, right)?;
        }

        Ok(left)
    }

    /// Parses function applications and factors.
    fn parse_primary(&mut self) -> ParseResult<Node> {
        match self.current_token.clone() {
            Token::Function(func) => {
                self.advance();
                if self.current_token != Token::LParen {
                    return Err(self.fail(SyntaxErrorKind::MissingOpeningBracket));
                }
                self.advance();
                self.enter()?;
                let is_delta = func == Function::Delta;
                if is_delta {
                    self.enter_delta()?;
                }
                let arg = self.parse_expression()?;
                self.expect_closing()?;
                if is_delta {
                    self.delta_nesting -= 1;
                }
                self.leave();
                self.apply(func, arg)
            }

            Token::ExpPower => {
                self.advance();
                self.enter()?;
                let arg = self.parse_primary()?;
                self.leave();
                self.apply(Function::Exp, arg)
            }

            _ => self.parse_factor(),
        }
    }

    /// Parses operands and parenthesized expressions.
    fn parse_factor(&mut self) -> ParseResult<Node> {
        match self.current_token.clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Node::leaf(Expression::Number(n)))
            }

            Token::Constant(constant) => {
                self.advance();
                Ok(Node::leaf(Expression::Constant {
                    symbol: constant.symbol,
                    value: constant.value,
                }))
            }

            Token::Variable => {
                self.advance();
                Ok(Node::leaf(Expression::Variable))
            }

            // Parenthesized expression
            Token::LParen => {
                self.advance();
                self.enter()?;
                let inner = self.parse_expression()?;
                self.expect_closing()?;
                self.leave();
                Ok(inner)
            }

            // EOF, an operator or ')' where a term belongs
            _ => Err(self.fail(SyntaxErrorKind::MissingTerm)),
        }
    }

    /// Consumes the ')' that closes a bracket or a function argument.
    fn expect_closing(&mut self) -> ParseResult<()> {
        if self.current_token == Token::RParen {
            self.advance();
            Ok(())
        } else if self.current_token.starts_term() {
            Err(self.fail(SyntaxErrorKind::MissingOperator))
        } else {
            Err(self.fail(SyntaxErrorKind::MissingClosingBracket))
        }
    }
}

/// Convenience function to parse a formula in the default variable `x`.
pub fn parse(input: &str) -> ParseResult<Expression> {
    if input.is_empty() {
        return Err(SyntaxError::new(SyntaxErrorKind::EmptyFormula, 0));
    }
    let mut parser = Parser::new(input);
    parser.parse()
}

/// Parses a formula with a custom variable name and depth bounds.
pub fn parse_with(input: &str, options: &ParserOptions) -> ParseResult<Expression> {
    if input.is_empty() {
        return Err(SyntaxError::new(SyntaxErrorKind::EmptyFormula, 0));
    }
    let mut parser = Parser::with_options(input, options);
    parser.parse()
}
