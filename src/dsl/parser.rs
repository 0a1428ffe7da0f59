//! Parser for the filter expression language.
//!
//! Grammar (in rough EBNF), lowest precedence first:
//!
//! expr       = or_expr ("?" expr ":" expr)?
//! or_expr    = and_expr (("or" | "||") and_expr)*
//! and_expr   = compare (("and" | "&&") compare)*
//! compare    = range (compare_op range)*
//! compare_op = "==" | "!=" | "<" | "<=" | ">" | ">=" | "in" | "not" "in"
//!            | "matches" | "contains" | "startsWith" | "endsWith"
//! range      = additive (".." additive)?
//! additive   = term (("+" | "-") term)*
//! term       = unary (("*" | "/" | "%") unary)*
//! unary      = ("not" | "!" | "-") unary | primary
//! primary    = INT | FLOAT | STRING | "true" | "false" | "nil"
//!            | IDENT ("(" args? ")")? | "[" args? "]" | "(" expr ")"

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::lexer::{Token, tokenize};

/// Parser state.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        let tok = self.advance();
        if tok == expected {
            Ok(())
        } else {
            Err(format!("Expected {:?}, got {:?}", expected, tok))
        }
    }

    /// Consume the operator if it is one of `ops`.
    fn eat_op(&mut self, ops: &[&str]) -> Option<&'static str> {
        match self.peek() {
            Token::Op(op) if ops.contains(op) => {
                let op = *op;
                self.advance();
                Some(op)
            }
            _ => None,
        }
    }

    /// Parse a full expression, including the ternary conditional.
    fn parse_expr(&mut self) -> Result<Expr, String> {
        let cond = self.parse_or_expr()?;

        if !matches!(self.peek(), Token::Question) {
            return Ok(cond);
        }
        self.advance(); // consume ?
        let then = self.parse_expr()?;
        self.expect(Token::Colon)?;
        let otherwise = self.parse_expr()?;

        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    /// Parse OR expression: and_expr (("or" | "||") and_expr)*
    fn parse_or_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_and_expr()?;

        while let Some(op) = self.eat_op(&["or", "||"]) {
            let op = if op == "or" { BinaryOp::Or } else { BinaryOp::OrOr };
            let right = self.parse_and_expr()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse AND expression: compare (("and" | "&&") compare)*
    fn parse_and_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_compare()?;

        while let Some(op) = self.eat_op(&["and", "&&"]) {
            let op = if op == "and" {
                BinaryOp::And
            } else {
                BinaryOp::AndAnd
            };
            let right = self.parse_compare()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse the comparison level, where `not in` is a two-token operator.
    fn parse_compare(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_range()?;

        loop {
            let op = match self.peek() {
                Token::Op("not") if self.peek_at(1) == &Token::Op("in") => {
                    self.advance(); // consume not
                    Some(BinaryOp::NotIn)
                }
                Token::Op("==") => Some(BinaryOp::Eq),
                Token::Op("!=") => Some(BinaryOp::Ne),
                Token::Op("<") => Some(BinaryOp::Lt),
                Token::Op("<=") => Some(BinaryOp::Le),
                Token::Op(">") => Some(BinaryOp::Gt),
                Token::Op(">=") => Some(BinaryOp::Ge),
                Token::Op("in") => Some(BinaryOp::In),
                Token::Op("contains") => Some(BinaryOp::Contains),
                Token::Op("startsWith") => Some(BinaryOp::StartsWith),
                Token::Op("endsWith") => Some(BinaryOp::EndsWith),
                Token::Op("matches") => None,
                _ => break,
            };
            self.advance(); // consume operator

            let right = self.parse_range()?;
            left = match op {
                Some(op) => Expr::binary(op, left, right),
                None => Expr::Matches {
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }

        Ok(left)
    }

    /// Parse range: additive (".." additive)?
    fn parse_range(&mut self) -> Result<Expr, String> {
        let lo = self.parse_additive()?;

        if self.eat_op(&[".."]).is_none() {
            return Ok(lo);
        }
        let hi = self.parse_additive()?;
        Ok(Expr::Range(Box::new(lo), Box::new(hi)))
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_term()?;

        while let Some(op) = self.eat_op(&["+", "-"]) {
            let op = if op == "+" { BinaryOp::Add } else { BinaryOp::Sub };
            let right = self.parse_term()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_unary()?;

        while let Some(op) = self.eat_op(&["*", "/", "%"]) {
            let op = match op {
                "*" => BinaryOp::Mul,
                "/" => BinaryOp::Div,
                _ => BinaryOp::Mod,
            };
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse unary expression: ("not" | "!" | "-") unary | primary
    fn parse_unary(&mut self) -> Result<Expr, String> {
        let op = match self.eat_op(&["not", "!", "-"]) {
            None => return self.parse_primary(),
            Some("not") => UnaryOp::Not,
            Some("!") => UnaryOp::Bang,
            Some(_) => UnaryOp::Neg,
        };

        let operand = self.parse_unary()?;
        Ok(match (op, operand) {
            // Negative numeric literals are literals
            (UnaryOp::Neg, Expr::Integer(n)) => Expr::Integer(-n),
            (UnaryOp::Neg, Expr::Float(n)) => Expr::Float(-n),
            (op, operand) => Expr::unary(op, operand),
        })
    }

    /// Parse primary expression.
    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Token::Int(n) => Ok(Expr::Integer(n)),
            Token::Float(n) => Ok(Expr::Float(n)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::Bool(b) => Ok(Expr::Bool(b)),
            Token::Nil => Ok(Expr::Nil),
            Token::Ident(name) => {
                if !matches!(self.peek(), Token::LParen) {
                    return Ok(Expr::Identifier(name));
                }
                self.advance(); // consume (
                let args = self.parse_list(Token::RParen)?;
                Ok(Expr::Call { name, args })
            }
            Token::LBracket => Ok(Expr::Array(self.parse_list(Token::RBracket)?)),
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Eof => Err("Unexpected end of expression".to_string()),
            other => Err(format!("Unexpected token: {:?}", other)),
        }
    }

    /// Parse a comma separated list up to and including `close`.
    fn parse_list(&mut self, close: Token) -> Result<Vec<Expr>, String> {
        let mut items = Vec::new();

        if *self.peek() == close {
            self.advance();
            return Ok(items);
        }

        loop {
            items.push(self.parse_expr()?);
            match self.advance() {
                Token::Comma => continue,
                tok if tok == close => return Ok(items),
                other => return Err(format!("Expected ',' or {:?}, got {:?}", close, other)),
            }
        }
    }
}

/// Parse a filter expression string into an AST.
pub fn parse_expr(input: &str) -> Result<Expr, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty expression".to_string());
    }

    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let ast = parser.parse_expr()?;

    // Ensure we consumed all tokens
    if !matches!(parser.peek(), Token::Eof) {
        return Err(format!(
            "Unexpected token after expression: {:?}",
            parser.peek()
        ));
    }

    Ok(ast)
}
