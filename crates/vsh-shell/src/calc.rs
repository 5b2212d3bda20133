//! Arithmetic evaluator for the `calc` command.
//!
//! A recursive-descent parser over the grammar
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := number | '(' expr ')' | '-' factor
//! ```
//!
//! Callers strip everything outside `0-9 . + - * / ( )` before evaluation,
//! so there is no code-execution surface of any kind. Anything the grammar
//! rejects, and any non-finite result, is an error.

/// Characters the evaluator accepts; everything else is stripped first.
pub fn strip(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.'))
        .collect()
}

/// Evaluate a pre-stripped expression.
pub fn eval(expr: &str) -> Option<f64> {
    let bytes = expr.as_bytes();
    let mut parser = Parser { bytes, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != bytes.len() || !value.is_finite() {
        return None;
    }
    Some(value)
}

/// Render a result the way a calculator would: no trailing `.0` on
/// integral values.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

/// Recursion guard for pathological paren or sign nesting.
const MAX_DEPTH: usize = 128;

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expr(&mut self) -> Option<f64> {
        self.expr_at(0)
    }

    fn expr_at(&mut self, depth: usize) -> Option<f64> {
        if depth > MAX_DEPTH {
            return None;
        }
        let mut value = self.term(depth)?;
        while let Some(op) = self.peek() {
            match op {
                b'+' => {
                    self.pos += 1;
                    value += self.term(depth)?;
                }
                b'-' => {
                    self.pos += 1;
                    value -= self.term(depth)?;
                }
                _ => break,
            }
        }
        Some(value)
    }

    fn term(&mut self, depth: usize) -> Option<f64> {
        let mut value = self.factor(depth)?;
        while let Some(op) = self.peek() {
            match op {
                b'*' => {
                    self.pos += 1;
                    value *= self.factor(depth)?;
                }
                b'/' => {
                    self.pos += 1;
                    value /= self.factor(depth)?;
                }
                _ => break,
            }
        }
        Some(value)
    }

    fn factor(&mut self, depth: usize) -> Option<f64> {
        if depth > MAX_DEPTH {
            return None;
        }
        match self.peek()? {
            b'-' => {
                self.pos += 1;
                Some(-self.factor(depth + 1)?)
            }
            b'(' => {
                self.pos += 1;
                let value = self.expr_at(depth + 1)?;
                if self.peek() != Some(b')') {
                    return None;
                }
                self.pos += 1;
                Some(value)
            }
            _ => self.number(),
        }
    }

    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9') | Some(b'.')) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()?
            .parse()
            .ok()
    }
}
