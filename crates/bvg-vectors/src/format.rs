#![forbid(unsafe_code)]

//! Renders vectors as `CHECK(run<Op>(Int("..."), ...));` assertion blocks.

use crate::driver::TestVector;
use bvg_oracle::{Expected, Operation};
use num_bigint::BigInt;

pub const WRAP_WIDTH: usize = 80;
const CHECK_OPEN: &str = "CHECK(";
const INT_OPEN: &str = "Int(";

/// Column at which continuation arguments line up under the first one.
#[must_use]
pub fn continuation_indent(op: Operation) -> usize {
    CHECK_OPEN.len() + op.assertion_name().len() + 1
}

#[must_use]
pub fn int_literal(value: &BigInt) -> String {
    format!("{INT_OPEN}\"{value}\")")
}

/// Splits `digits` into `wrap_width`-character string literals, one per line.
///
/// Every line is indented by `indent_width`; surrounding whitespace of the
/// whole block is trimmed, so the first literal starts at column zero.
#[must_use]
pub fn wrap_decimal(digits: &str, indent_width: usize, wrap_width: usize) -> String {
    let indent = " ".repeat(indent_width);
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(digits.len() + indent_width + 3);
    for chunk in chars.chunks(wrap_width.max(1)) {
        out.push_str(&indent);
        out.push('"');
        out.extend(chunk);
        out.push_str("\"\n");
    }
    out.trim().to_string()
}

/// Concatenates the contents of every string literal in `wrapped`.
#[must_use]
pub fn unwrap_literals(wrapped: &str) -> String {
    wrapped.split('"').skip(1).step_by(2).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorFormatter {
    wrap_width: usize,
}

impl VectorFormatter {
    #[must_use]
    pub const fn new(wrap_width: usize) -> Self {
        Self { wrap_width }
    }

    #[must_use]
    pub fn render(&self, vector: &TestVector) -> String {
        let op = vector.operation;
        let indent = continuation_indent(op);
        let mut args = vec![int_literal(&vector.x), int_literal(&vector.y)];

        match (&vector.expected, op) {
            (Expected::Single(power), Operation::Exponentiation) => {
                let wrapped = wrap_decimal(
                    &power.to_string(),
                    indent + INT_OPEN.len(),
                    self.wrap_width,
                );
                args.push(format!("{INT_OPEN}{wrapped})"));
            }
            (Expected::Single(value), _) => args.push(int_literal(value)),
            (
                Expected::QuotientRemainder {
                    quotient,
                    remainder,
                },
                _,
            ) => {
                args.push(quotient.to_string());
                args.push(int_literal(remainder));
            }
        }

        let separator = format!(",\n{}", " ".repeat(indent));
        format!(
            "{CHECK_OPEN}{}({}));",
            op.assertion_name(),
            args.join(&separator)
        )
    }
}

impl Default for VectorFormatter {
    fn default() -> Self {
        Self::new(WRAP_WIDTH)
    }
}
