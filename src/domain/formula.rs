//! Arithmetic evaluator for custom commission formulas.
//!
//! Formulas reference order variables by name (`gross * percent / 100`) and
//! support `+ - * /`, unary minus, and parentheses. Anything else in the
//! input is discarded before evaluation, and division by zero yields zero.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormulaError {
    #[error("invalid number literal: {0}")]
    InvalidNumber(String),
    #[error("arithmetic overflow")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Decimal),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str, vars: &HashMap<&str, Decimal>) -> Result<Vec<Token>, FormulaError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '*' => tokens.push(Token::Star),
            '/' => tokens.push(Token::Slash),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            c if c.is_ascii_digit() => {
                let start = i;
                while i + 1 < chars.len() && (chars[i + 1].is_ascii_digit() || chars[i + 1] == '.')
                {
                    i += 1;
                }
                let literal: String = chars[start..=i].iter().collect();
                let literal = literal.trim_end_matches('.');
                let value = literal
                    .parse::<Decimal>()
                    .map_err(|_| FormulaError::InvalidNumber(literal.to_string()))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i + 1 < chars.len()
                    && (chars[i + 1].is_ascii_alphanumeric() || chars[i + 1] == '_')
                {
                    i += 1;
                }
                let name: String = chars[start..=i].iter().collect();
                if let Some(value) = vars.get(name.as_str()) {
                    tokens.push(Token::Number(*value));
                }
            }
            _ => {}
        }
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn expression(&mut self) -> Result<Decimal, FormulaError> {
        let mut result = self.term()?;
        while let Some(op) = self.peek().cloned() {
            let add = match op {
                Token::Plus => true,
                Token::Minus => false,
                _ => break,
            };
            self.pos += 1;
            let right = self.term()?;
            result = if add {
                result.checked_add(right)
            } else {
                result.checked_sub(right)
            }
            .ok_or(FormulaError::Overflow)?;
        }
        Ok(result)
    }

    fn term(&mut self) -> Result<Decimal, FormulaError> {
        let mut result = self.factor()?;
        while let Some(op) = self.peek().cloned() {
            let multiply = match op {
                Token::Star => true,
                Token::Slash => false,
                _ => break,
            };
            self.pos += 1;
            let right = self.factor()?;
            result = if multiply {
                result.checked_mul(right).ok_or(FormulaError::Overflow)?
            } else if right.is_zero() {
                Decimal::ZERO
            } else {
                result.checked_div(right).ok_or(FormulaError::Overflow)?
            };
        }
        Ok(result)
    }

    fn factor(&mut self) -> Result<Decimal, FormulaError> {
        let Some(token) = self.peek().cloned() else {
            return Ok(Decimal::ZERO);
        };
        self.pos += 1;
        match token {
            Token::Number(value) => Ok(value),
            Token::Minus => Ok(-self.factor()?),
            Token::Plus => self.factor(),
            Token::LParen => {
                let value = self.expression()?;
                if self.peek() == Some(&Token::RParen) {
                    self.pos += 1;
                }
                Ok(value)
            }
            Token::Star | Token::Slash | Token::RParen => Ok(Decimal::ZERO),
        }
    }
}

/// Evaluates `formula` with the given variables.
///
/// Returns `Ok(None)` when nothing evaluable remains after discarding
/// unsupported characters.
pub fn evaluate(formula: &str, vars: &HashMap<&str, Decimal>) -> Result<Option<Decimal>, FormulaError> {
    let tokens = tokenize(formula, vars)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    let mut parser = Parser { tokens, pos: 0 };
    parser.expression().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> HashMap<&'static str, Decimal> {
        HashMap::from([
            ("gross", Decimal::from(1000)),
            ("expenses", Decimal::from(200)),
            ("percent", Decimal::from(10)),
        ])
    }

    #[test]
    fn respects_precedence_and_parentheses() {
        let v = vars();
        assert_eq!(evaluate("2 + 3 * 4", &v), Ok(Some(Decimal::from(14))));
        assert_eq!(evaluate("(2 + 3) * 4", &v), Ok(Some(Decimal::from(20))));
        assert_eq!(
            evaluate("(gross - expenses) * percent / 100", &v),
            Ok(Some(Decimal::from(80)))
        );
    }

    #[test]
    fn division_by_zero_is_zero() {
        assert_eq!(evaluate("gross / 0", &vars()), Ok(Some(Decimal::ZERO)));
    }

    #[test]
    fn unsupported_characters_are_dropped() {
        assert_eq!(evaluate("gross; $x * 1", &vars()), Ok(Some(Decimal::from(1000))));
        assert_eq!(evaluate("&&", &vars()), Ok(None));
    }

    #[test]
    fn decimal_literals_and_unary_minus() {
        let v = vars();
        assert_eq!(evaluate("0.5 * gross", &v), Ok(Some(Decimal::from(500))));
        assert_eq!(evaluate("-expenses + gross", &v), Ok(Some(Decimal::from(800))));
    }
}
