// ============================================================================
// spark-components - Expression Parser
// Recursive descent from tokens to an expression tree
// ============================================================================
//
//   expr     := or
//   or       := and ( "||" and )*
//   and      := equality ( "&&" equality )*
//   equality := relation ( ("==" | "!=" | "===" | "!==") relation )*
//   relation := additive ( ("<" | "<=" | ">" | ">=") additive )*
//   additive := term ( ("+" | "-") term )*
//   term     := unary ( ("*" | "/" | "%") unary )*
//   unary    := ("!" | "-") unary | postfix
//   postfix  := primary ( "." ident | "[" expr "]" )*
//   primary  := number | string | true | false | null | undefined
//             | ident | "(" expr ")"
// ============================================================================

use serde_json::Value;

use super::lexer::{tokenize, Op, Spanned, Token};
use super::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Undefined,
    Value(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Ident(String),
    /// `object.property`
    Member(Box<Expr>, String),
    /// `object[index]`
    Index(Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(Op, Box<Expr>, Box<Expr>),
}

/// Parse a complete expression.
pub fn parse(source: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    match parser.tokens.get(parser.pos) {
        Some((token, position)) => Err(ExprError::UnexpectedToken {
            token: token.to_string(),
            position: *position,
        }),
        None => Ok(expr),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn next(&mut self) -> Result<Spanned, ExprError> {
        let spanned = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ExprError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(spanned)
    }

    /// Consume the next token if it is one of `ops`.
    fn eat_op(&mut self, ops: &[Op]) -> Option<Op> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ExprError> {
        let (token, position) = self.next()?;
        if &token == expected {
            Ok(())
        } else {
            Err(ExprError::UnexpectedToken {
                token: token.to_string(),
                position,
            })
        }
    }

    /// One left-associative precedence level.
    fn binary_level(
        &mut self,
        ops: &[Op],
        operand: fn(&mut Self) -> Result<Expr, ExprError>,
    ) -> Result<Expr, ExprError> {
        let mut left = operand(self)?;
        while let Some(op) = self.eat_op(ops) {
            let right = operand(self)?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn expr(&mut self) -> Result<Expr, ExprError> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr, ExprError> {
        self.binary_level(&[Op::Or], Self::and)
    }

    fn and(&mut self) -> Result<Expr, ExprError> {
        self.binary_level(&[Op::And], Self::equality)
    }

    fn equality(&mut self) -> Result<Expr, ExprError> {
        self.binary_level(
            &[Op::Eq, Op::Ne, Op::StrictEq, Op::StrictNe],
            Self::relation,
        )
    }

    fn relation(&mut self) -> Result<Expr, ExprError> {
        self.binary_level(&[Op::Lt, Op::Le, Op::Gt, Op::Ge], Self::additive)
    }

    fn additive(&mut self) -> Result<Expr, ExprError> {
        self.binary_level(&[Op::Add, Op::Sub], Self::term)
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        self.binary_level(&[Op::Mul, Op::Div, Op::Rem], Self::unary)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        match self.eat_op(&[Op::Not, Op::Sub]) {
            Some(Op::Not) => Ok(Expr::Unary(UnaryOp::Not, Box::new(self.unary()?))),
            Some(_) => Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.unary()?))),
            None => self.postfix(),
        }
    }

    fn postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.pos += 1;
                    match self.next()? {
                        (Token::Ident(name), _) => expr = Expr::Member(Box::new(expr), name),
                        (token, position) => {
                            return Err(ExprError::UnexpectedToken {
                                token: token.to_string(),
                                position,
                            });
                        }
                    }
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    let index = self.expr()?;
                    self.expect(&Token::RBracket)?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                _ => return Ok(expr),
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let (token, position) = self.next()?;
        let expr = match token {
            Token::Number(n) => Expr::Literal(Literal::Value(Value::from(n))),
            Token::Str(s) => Expr::Literal(Literal::Value(Value::String(s))),
            Token::Ident(name) => match name.as_str() {
                "true" => Expr::Literal(Literal::Value(Value::Bool(true))),
                "false" => Expr::Literal(Literal::Value(Value::Bool(false))),
                "null" => Expr::Literal(Literal::Value(Value::Null)),
                "undefined" => Expr::Literal(Literal::Undefined),
                _ => Expr::Ident(name),
            },
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                inner
            }
            other => {
                return Err(ExprError::UnexpectedToken {
                    token: other.to_string(),
                    position,
                });
            }
        };
        Ok(expr)
    }
}
