//! `$(Property)` expansion and boolean condition evaluation.
//!
//! Expansion substitutes property references against whatever scope the
//! caller supplies; condition evaluation handles the comparison/combinator
//! grammar used by build-file `Condition` attributes:
//!
//! ```text
//! condition  := and-expr ( "Or" and-expr )*
//! and-expr   := unary ( "And" unary )*
//! unary      := "!" unary | "(" condition ")" | comparison
//! comparison := operand ( ("==" | "!=") operand )?
//! operand    := 'quoted string' | bareword
//! ```
//!
//! Unknown properties are not a hard failure: expansion keeps the raw
//! `$(...)` token (the caller flags the value), and inside conditions an
//! unknown reference substitutes to the empty string, which makes the
//! enclosing comparison unsatisfied. Malformed syntax is the only case that
//! produces an error.

use nudge_core::{Error, Result};

/// Upper bound on substitution passes, so mutually recursive property
/// definitions terminate.
const MAX_PASSES: usize = 16;

/// Read access to resolved property values during expansion.
pub trait PropertyScope {
    /// Returns the current resolved-or-raw value for `name`, if any.
    /// Property names compare case-insensitively.
    fn value_of(&self, name: &str) -> Option<&str>;
}

impl PropertyScope for std::collections::HashMap<String, String> {
    fn value_of(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A scope that pins `TargetFramework` to one concrete moniker while
/// delegating every other lookup. Used when an item-group condition is
/// evaluated once per resolved framework.
pub struct FrameworkScope<'a> {
    inner: &'a dyn PropertyScope,
    framework: &'a str,
}

impl<'a> FrameworkScope<'a> {
    /// Wraps `inner` with `TargetFramework` bound to `framework`.
    pub fn new(inner: &'a dyn PropertyScope, framework: &'a str) -> Self {
        Self { inner, framework }
    }
}

impl PropertyScope for FrameworkScope<'_> {
    fn value_of(&self, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case("TargetFramework") {
            Some(self.framework)
        } else {
            self.inner.value_of(name)
        }
    }
}

/// The outcome of expanding one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The expanded value. Unknown references remain as raw `$(...)` tokens.
    pub value: String,
    /// False when the value still contains an unresolved reference.
    pub fully_resolved: bool,
}

/// Expands `$(Name)` references in `input` against `scope`.
///
/// Substitution iterates so that properties defined in terms of other
/// properties resolve fully; unknown references are kept raw and reported
/// through [`Expansion::fully_resolved`].
pub fn expand(input: &str, scope: &dyn PropertyScope) -> Expansion {
    let mut value = input.to_string();
    for _ in 0..MAX_PASSES {
        let (next, substituted) = expand_once(&value, scope, false);
        value = next;
        if !substituted {
            break;
        }
    }
    let fully_resolved = !value.contains("$(");
    Expansion {
        value,
        fully_resolved,
    }
}

/// Expands references with unknown properties substituted by the empty
/// string. This matches how conditions behave: a comparison against an
/// unsupplied property compares against `""` rather than failing.
fn expand_or_empty(input: &str, scope: &dyn PropertyScope) -> String {
    let mut value = input.to_string();
    for _ in 0..MAX_PASSES {
        let (next, substituted) = expand_once(&value, scope, true);
        value = next;
        if !substituted {
            break;
        }
    }
    value
}

fn is_property_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// One substitution pass. Returns the rewritten value and whether anything
/// changed.
fn expand_once(value: &str, scope: &dyn PropertyScope, drop_unknown: bool) -> (String, bool) {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    let mut substituted = false;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'$' && i + 1 < bytes.len() && bytes[i + 1] == b'(' {
            if let Some(rel_end) = value[i + 2..].find(')') {
                let name = &value[i + 2..i + 2 + rel_end];
                if is_property_name(name) {
                    let token = &value[i..i + 3 + rel_end];
                    match scope.value_of(name) {
                        // Substituting a token with itself would loop forever
                        Some(resolved) if resolved != token => {
                            out.push_str(resolved);
                            substituted = true;
                        }
                        Some(_) => out.push_str(token),
                        None if drop_unknown => substituted = true,
                        None => out.push_str(token),
                    }
                    i += 3 + rel_end;
                    continue;
                }
            }
        }
        // Safe: i always lands on a char boundary
        let Some(ch) = value[i..].chars().next() else {
            break;
        };
        out.push(ch);
        i += ch.len_utf8();
    }

    (out, substituted)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Not,
    Eq,
    Ne,
    And,
    Or,
    Value(String),
}

fn malformed(expression: &str, message: impl Into<String>) -> Error {
    Error::Condition {
        expression: expression.to_string(),
        message: message.into(),
    }
}

fn tokenize(expression: &str, scope: &dyn PropertyScope) -> Result<Vec<Token>> {
    let chars: Vec<char> = expression.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '\'' => {
                let start = i + 1;
                let mut j = start;
                while j < chars.len() && chars[j] != '\'' {
                    j += 1;
                }
                if j >= chars.len() {
                    return Err(malformed(expression, "unterminated quoted string"));
                }
                let literal: String = chars[start..j].iter().collect();
                tokens.push(Token::Value(expand_or_empty(&literal, scope)));
                i = j + 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Eq);
                    i += 2;
                } else {
                    return Err(malformed(expression, "single `=` is not an operator"));
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ne);
                    i += 2;
                } else {
                    tokens.push(Token::Not);
                    i += 1;
                }
            }
            _ => {
                // Bareword; `$(...)` may embed parentheses that must not be
                // read as grouping.
                let start = i;
                while i < chars.len() {
                    let c = chars[i];
                    if c == '$' && chars.get(i + 1) == Some(&'(') {
                        while i < chars.len() && chars[i] != ')' {
                            i += 1;
                        }
                        if i >= chars.len() {
                            return Err(malformed(expression, "unterminated property reference"));
                        }
                        i += 1;
                    } else if c.is_whitespace() || matches!(c, '(' | ')' | '\'' | '=' | '!') {
                        break;
                    } else {
                        i += 1;
                    }
                }
                let word: String = chars[start..i].iter().collect();
                if word.eq_ignore_ascii_case("and") {
                    tokens.push(Token::And);
                } else if word.eq_ignore_ascii_case("or") {
                    tokens.push(Token::Or);
                } else {
                    tokens.push(Token::Value(expand_or_empty(&word, scope)));
                }
            }
        }
    }

    Ok(tokens)
}

struct ConditionParser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    expression: &'a str,
}

impl ConditionParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<bool> {
        let mut value = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let rhs = self.parse_and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn parse_and(&mut self) -> Result<bool> {
        let mut value = self.parse_unary()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let rhs = self.parse_unary()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn parse_unary(&mut self) -> Result<bool> {
        match self.peek() {
            Some(Token::Not) => {
                self.pos += 1;
                Ok(!self.parse_unary()?)
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let value = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(malformed(self.expression, "expected closing parenthesis")),
                }
            }
            Some(Token::Value(_)) => self.parse_comparison(),
            _ => Err(malformed(self.expression, "expected an operand")),
        }
    }

    fn parse_comparison(&mut self) -> Result<bool> {
        let Some(Token::Value(left)) = self.advance() else {
            return Err(malformed(self.expression, "expected an operand"));
        };
        match self.peek() {
            Some(Token::Eq) => {
                self.pos += 1;
                let right = self.expect_value()?;
                Ok(left.eq_ignore_ascii_case(&right))
            }
            Some(Token::Ne) => {
                self.pos += 1;
                let right = self.expect_value()?;
                Ok(!left.eq_ignore_ascii_case(&right))
            }
            _ => {
                // A lone operand must be a boolean literal. An unresolved
                // reference substitutes to "" and reads as unsatisfied.
                if left.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if left.is_empty() || left.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(malformed(
                        self.expression,
                        format!("`{left}` is not a boolean"),
                    ))
                }
            }
        }
    }

    fn expect_value(&mut self) -> Result<String> {
        match self.advance() {
            Some(Token::Value(value)) => Ok(value),
            _ => Err(malformed(
                self.expression,
                "expected an operand after comparison operator",
            )),
        }
    }
}

/// Evaluates a `Condition` attribute against `scope`.
///
/// An empty or whitespace-only condition is satisfied (it is equivalent to
/// the attribute being absent).
///
/// # Errors
///
/// Returns [`Error::Condition`] for malformed syntax - the only hard
/// failure this evaluator produces.
pub fn evaluate_condition(expression: &str, scope: &dyn PropertyScope) -> Result<bool> {
    if expression.trim().is_empty() {
        return Ok(true);
    }

    let tokens = tokenize(expression, scope)?;
    let mut parser = ConditionParser {
        tokens,
        pos: 0,
        expression,
    };
    let value = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(malformed(expression, "unexpected trailing tokens"));
    }
    Ok(value)
}
