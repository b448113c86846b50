use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::FormulaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }
}

/// The column part of a cell reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// The identity field.
    Id,
    /// Zero-based position into the declared columns. `id` is not counted.
    Index(usize),
    /// Column name, matched case-insensitively.
    Name(String),
}

impl ColumnRef {
    fn from_token(token: &str) -> Self {
        if token.bytes().all(|b| b.is_ascii_digit()) {
            // Too many digits to fit is still just an index past the end.
            ColumnRef::Index(token.parse().unwrap_or(usize::MAX))
        } else if token.eq_ignore_ascii_case("id") {
            ColumnRef::Id
        } else {
            ColumnRef::Name(token.to_string())
        }
    }
}

/// `{row}column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub row: usize,
    pub column: ColumnRef,
}

/// A validated command: the first reference followed by `(operator, reference)` steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    first: CellRef,
    steps: Vec<(Operator, CellRef)>,
}

impl Command {
    pub fn first(&self) -> &CellRef {
        &self.first
    }

    pub fn steps(&self) -> &[(Operator, CellRef)] {
        &self.steps
    }

    /// All references in source order.
    pub fn references(&self) -> impl Iterator<Item = &CellRef> {
        std::iter::once(&self.first).chain(self.steps.iter().map(|(_, cell)| cell))
    }
}

/// Validates and splits a whole command. Nothing is resolved yet.
pub fn parse_command(input: &str) -> Result<Command, FormulaError> {
    let mut scanner = Scanner {
        chars: input.char_indices().peekable(),
        len: input.len(),
    };

    if scanner.bump() != Some('=') {
        return Err(invalid(0, "command must start with '='"));
    }

    scanner.skip_whitespace();
    let first = scanner.cell_ref()?;
    let mut steps = Vec::new();
    loop {
        scanner.skip_whitespace();
        let position = scanner.position();
        let Some(ch) = scanner.bump() else {
            break;
        };
        let Some(op) = Operator::from_char(ch) else {
            return Err(invalid(position, "expected an operator"));
        };
        scanner.skip_whitespace();
        steps.push((op, scanner.cell_ref()?));
    }

    Ok(Command { first, steps })
}

fn invalid(position: usize, reason: &'static str) -> FormulaError {
    FormulaError::InvalidCommandFormat { position, reason }
}

struct Scanner<'a> {
    chars: Peekable<CharIndices<'a>>,
    len: usize,
}

impl Scanner<'_> {
    fn position(&mut self) -> usize {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.len)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, ch)| ch)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut buf = String::new();
        while let Some((_, ch)) = self.chars.next_if(|(_, ch)| pred(*ch)) {
            buf.push(ch);
        }
        buf
    }

    fn cell_ref(&mut self) -> Result<CellRef, FormulaError> {
        let position = self.position();
        if self.bump() != Some('{') {
            return Err(invalid(position, "expected '{' to start a cell reference"));
        }

        let position = self.position();
        let digits = self.take_while(|ch| ch.is_ascii_digit());
        if digits.is_empty() {
            return Err(invalid(position, "expected a row index"));
        }

        let position = self.position();
        if self.bump() != Some('}') {
            return Err(invalid(position, "expected '}' after the row index"));
        }

        let position = self.position();
        let token = self.take_while(|ch| ch.is_alphanumeric() || ch == '_');
        if token.is_empty() {
            return Err(invalid(position, "expected a column after the row index"));
        }

        Ok(CellRef {
            // Out-of-range rows are reported when the reference is resolved.
            row: digits.parse().unwrap_or(usize::MAX),
            column: ColumnRef::from_token(&token),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(row: usize, column: ColumnRef) -> CellRef {
        CellRef { row, column }
    }

    #[test]
    fn splits_references_and_operators() {
        let command = parse_command("={0}a + {1}ID*{2}3 /{10}Total_2").unwrap();
        assert_eq!(command.first(), &cell(0, ColumnRef::Name("a".into())));
        assert_eq!(
            command.steps(),
            &[
                (Operator::Add, cell(1, ColumnRef::Id)),
                (Operator::Mul, cell(2, ColumnRef::Index(3))),
                (Operator::Div, cell(10, ColumnRef::Name("Total_2".into()))),
            ]
        );
        assert_eq!(command.references().count(), 4);
    }

    #[test]
    fn single_reference_with_trailing_whitespace() {
        let command = parse_command("=  {0}id  ").unwrap();
        assert_eq!(command.first(), &cell(0, ColumnRef::Id));
        assert!(command.steps().is_empty());
    }

    #[test]
    fn rejects_malformed_commands() {
        let cases = [
            ("{0}a", 0),
            ("", 0),
            ("=", 1),
            ("={x}a", 2),
            ("={0 }a", 3),
            ("={0}", 4),
            ("={0}a +", 7),
            ("={0}a {1}b", 6),
            ("={0}a + 5", 8),
            ("={0}a + {1}b)", 12),
            ("={-1}a", 2),
        ];
        for (input, expected_position) in cases {
            match parse_command(input) {
                Err(FormulaError::InvalidCommandFormat { position, .. }) => {
                    assert_eq!(position, expected_position, "{input:?}");
                }
                other => panic!("{input:?} should be malformed, got {other:?}"),
            }
        }
    }

    #[test]
    fn huge_indices_saturate_instead_of_failing_to_parse() {
        let command = parse_command("={99999999999999999999999}99999999999999999999999").unwrap();
        assert_eq!(command.first(), &cell(usize::MAX, ColumnRef::Index(usize::MAX)));
    }
}
