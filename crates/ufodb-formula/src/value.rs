use std::fmt;

use crate::error::FormulaError;
use crate::parser::Operator;

/// A cell value after coercion, and the result of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FormulaValue {
    /// Integer if the text parses as one, else float, else the text itself.
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(int) = trimmed.parse::<i64>() {
            return FormulaValue::Int(int);
        }
        if let Ok(float) = trimmed.parse::<f64>() {
            return FormulaValue::Float(float);
        }
        FormulaValue::Text(raw.to_string())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FormulaValue::Int(_) => "integer",
            FormulaValue::Float(_) => "float",
            FormulaValue::Text(_) => "text",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FormulaValue::Int(v) => Some(*v as f64),
            FormulaValue::Float(v) => Some(*v),
            FormulaValue::Text(_) => None,
        }
    }

    fn is_zero(&self) -> bool {
        self.as_f64() == Some(0.0)
    }

    /// One accumulator step: `self <op> rhs`.
    ///
    /// Integers stay integers except under `/`, which always yields a float, and on `i64`
    /// overflow, which falls back to float arithmetic. Text only supports `+` with text.
    pub fn apply(self, op: Operator, rhs: FormulaValue) -> Result<FormulaValue, FormulaError> {
        if op == Operator::Div && rhs.is_zero() {
            return Err(FormulaError::DivisionByZero);
        }

        match (self, rhs) {
            (FormulaValue::Int(a), FormulaValue::Int(b)) => {
                let checked = match op {
                    Operator::Add => a.checked_add(b),
                    Operator::Sub => a.checked_sub(b),
                    Operator::Mul => a.checked_mul(b),
                    Operator::Div => None,
                };
                Ok(match checked {
                    Some(v) => FormulaValue::Int(v),
                    None => FormulaValue::Float(float_op(op, a as f64, b as f64)),
                })
            }
            (FormulaValue::Text(mut a), FormulaValue::Text(b)) if op == Operator::Add => {
                a.push_str(&b);
                Ok(FormulaValue::Text(a))
            }
            (lhs, rhs) => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => Ok(FormulaValue::Float(float_op(op, a, b))),
                _ => Err(FormulaError::NonNumericOperand {
                    operator: op.symbol(),
                    left: lhs.kind(),
                    right: rhs.kind(),
                }),
            },
        }
    }
}

fn float_op(op: Operator, a: f64, b: f64) -> f64 {
    match op {
        Operator::Add => a + b,
        Operator::Sub => a - b,
        Operator::Mul => a * b,
        Operator::Div => a / b,
    }
}

impl fmt::Display for FormulaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaValue::Int(v) => write!(f, "{v}"),
            // Whole floats keep one decimal so `6 / 3` reads `2.0`, not `2`.
            FormulaValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            FormulaValue::Float(v) => write!(f, "{v}"),
            FormulaValue::Text(v) => f.write_str(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use FormulaValue::{Float, Int, Text};

    #[test]
    fn coercion_prefers_int_then_float_then_text() {
        assert_eq!(FormulaValue::coerce("42"), Int(42));
        assert_eq!(FormulaValue::coerce(" -7 "), Int(-7));
        assert_eq!(FormulaValue::coerce("2.5"), Float(2.5));
        assert_eq!(FormulaValue::coerce("1e3"), Float(1000.0));
        assert_eq!(FormulaValue::coerce("abc"), Text("abc".into()));
        assert_eq!(FormulaValue::coerce(""), Text(String::new()));
    }

    #[test]
    fn integer_arithmetic_stays_integral_except_division() {
        assert_eq!(Int(3).apply(Operator::Add, Int(4)), Ok(Int(7)));
        assert_eq!(Int(3).apply(Operator::Sub, Int(4)), Ok(Int(-1)));
        assert_eq!(Int(3).apply(Operator::Mul, Int(4)), Ok(Int(12)));
        assert_eq!(Int(3).apply(Operator::Div, Int(4)), Ok(Float(0.75)));
        assert_eq!(Int(6).apply(Operator::Div, Int(3)), Ok(Float(2.0)));
    }

    #[test]
    fn overflow_falls_back_to_float() {
        assert_eq!(
            Int(i64::MAX).apply(Operator::Add, Int(1)),
            Ok(Float(i64::MAX as f64 + 1.0))
        );
    }

    #[test]
    fn mixed_numbers_promote_to_float() {
        assert_eq!(Int(1).apply(Operator::Add, Float(0.5)), Ok(Float(1.5)));
        assert_eq!(Float(1.5).apply(Operator::Mul, Int(2)), Ok(Float(3.0)));
    }

    #[test]
    fn division_by_zero_is_checked_before_operand_types() {
        assert_eq!(Int(1).apply(Operator::Div, Int(0)), Err(FormulaError::DivisionByZero));
        assert_eq!(Int(1).apply(Operator::Div, Float(0.0)), Err(FormulaError::DivisionByZero));
        assert_eq!(
            Text("a".into()).apply(Operator::Div, Int(0)),
            Err(FormulaError::DivisionByZero)
        );
    }

    #[test]
    fn text_concatenates_and_rejects_everything_else() {
        assert_eq!(
            Text("ab".into()).apply(Operator::Add, Text("cd".into())),
            Ok(Text("abcd".into()))
        );
        assert_eq!(
            Int(1).apply(Operator::Add, Text("x".into())),
            Err(FormulaError::NonNumericOperand {
                operator: '+',
                left: "integer",
                right: "text",
            })
        );
        assert!(Text("a".into()).apply(Operator::Sub, Text("b".into())).is_err());
        assert!(Text("a".into()).apply(Operator::Mul, Int(2)).is_err());
    }

    #[test]
    fn display_matches_spreadsheet_conventions() {
        assert_eq!(Int(7).to_string(), "7");
        assert_eq!(Float(2.0).to_string(), "2.0");
        assert_eq!(Float(0.75).to_string(), "0.75");
        assert_eq!(Text("hi".into()).to_string(), "hi");
    }
}
