use dualsimplex_solver::SolveError;
use log::debug;
use thiserror::Error;

use crate::file::ProblemFile;
use crate::lexer::{Lexer, Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token on line {line}: expected {expected}, found '{found}'")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
    },
    #[error("Invalid number on line {line}: {text}")]
    InvalidNumber { text: String, line: usize },
    #[error("Missing {0} line")]
    MissingSection(&'static str),
    #[error("{section} on line {line} has {found} entries, expected {expected}")]
    RowLength {
        section: &'static str,
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Invalid basis index on line {line}: {text} (indices are positive integers)")]
    InvalidIndex { text: String, line: usize },
    #[error("Invalid problem: {0}")]
    Problem(#[from] SolveError),
}

/// One non-empty source line of numbers
struct NumberLine {
    line: usize,
    tokens: Vec<Token>,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse the text layout: cost line, one line per constraint row,
    /// right-hand side line, 1-based basis line.
    pub fn parse(source: &str) -> Result<ProblemFile, ParseError> {
        let tokens = Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_file()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    /// Collect the numbers of the next non-empty line, or `None` at end of input
    fn next_line(&mut self) -> Result<Option<NumberLine>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Comment => {
                    self.advance();
                }
                TokenKind::Newline => {
                    self.advance();
                    if !tokens.is_empty() {
                        break;
                    }
                }
                TokenKind::Number => {
                    if let Some(token) = self.advance() {
                        tokens.push(token.clone());
                    }
                }
                TokenKind::Error => {
                    let (found, line) = self
                        .current()
                        .map(|t| (t.text.clone(), t.span.line))
                        .unwrap_or_default();
                    return Err(ParseError::UnexpectedToken {
                        expected: "number".to_string(),
                        found,
                        line,
                    });
                }
            }
        }
        let Some(line) = tokens.first().map(|t| t.span.line) else {
            return Ok(None);
        };
        Ok(Some(NumberLine { line, tokens }))
    }

    fn parse_file(&mut self) -> Result<ProblemFile, ParseError> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line()? {
            lines.push(line);
        }
        debug!("problem file has {} number lines", lines.len());

        // Cost line first, rhs and basis last; the lines in between are the
        // constraint rows
        let (costs_line, rows, rhs_line, basis_line) = match lines.as_slice() {
            [] => return Err(ParseError::MissingSection("cost")),
            [_] => return Err(ParseError::MissingSection("right-hand side")),
            [_, _] => return Err(ParseError::MissingSection("basis")),
            [_, _, _] => return Err(ParseError::MissingSection("constraint")),
            [costs, rows @ .., rhs, basis] => (costs, rows, rhs, basis),
        };

        let costs = parse_numbers(costs_line)?;
        let n = costs.len();
        let m = rows.len();

        let mut matrix = Vec::with_capacity(m);
        for row in rows {
            check_length("constraint row", row, n)?;
            matrix.push(parse_numbers(row)?);
        }

        check_length("right-hand side", rhs_line, m)?;
        let rhs = parse_numbers(rhs_line)?;

        check_length("basis", basis_line, m)?;
        let basis = parse_indices(basis_line)?;

        Ok(ProblemFile {
            costs,
            matrix,
            rhs,
            basis,
        })
    }
}

fn check_length(section: &'static str, line: &NumberLine, expected: usize) -> Result<(), ParseError> {
    if line.tokens.len() != expected {
        return Err(ParseError::RowLength {
            section,
            line: line.line,
            expected,
            found: line.tokens.len(),
        });
    }
    Ok(())
}

fn parse_numbers(line: &NumberLine) -> Result<Vec<f64>, ParseError> {
    line.tokens
        .iter()
        .map(|t| {
            t.text.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                text: t.text.clone(),
                line: t.span.line,
            })
        })
        .collect()
}

fn parse_indices(line: &NumberLine) -> Result<Vec<usize>, ParseError> {
    line.tokens
        .iter()
        .map(|t| {
            let invalid = || ParseError::InvalidIndex {
                text: t.text.clone(),
                line: t.span.line,
            };
            let text = t.text.strip_prefix('+').unwrap_or(&t.text);
            match text.parse::<usize>() {
                Ok(0) | Err(_) => Err(invalid()),
                Ok(i) => Ok(i),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "// dual simplex reference instance
-2 -7 1 0
1 -6 1 0
0 -5 1 1

-6 -10
3 4
";

    #[test]
    fn test_parse_reference() {
        let file = Parser::parse(REFERENCE).unwrap();
        assert_eq!(file.costs, vec![-2.0, -7.0, 1.0, 0.0]);
        assert_eq!(
            file.matrix,
            vec![vec![1.0, -6.0, 1.0, 0.0], vec![0.0, -5.0, 1.0, 1.0]]
        );
        assert_eq!(file.rhs, vec![-6.0, -10.0]);
        assert_eq!(file.basis, vec![3, 4]);
    }

    #[test]
    fn test_trailing_comments_and_no_final_newline() {
        let file = Parser::parse("1 1 # costs\n1 1\n2\n1").unwrap();
        assert_eq!(file.costs, vec![1.0, 1.0]);
        assert_eq!(file.matrix, vec![vec![1.0, 1.0]]);
        assert_eq!(file.rhs, vec![2.0]);
        assert_eq!(file.basis, vec![1]);
    }

    #[test]
    fn test_row_length_reports_line() {
        let err = Parser::parse("1 2 3\n1 2 3\n1 2\n4 5\n1 2\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::RowLength {
                section: "constraint row",
                line: 3,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_rhs_and_basis_lengths() {
        let err = Parser::parse("1 2\n1 1\n1 2\n1\n").unwrap_err();
        assert!(matches!(err, ParseError::RowLength { section: "right-hand side", line: 3, .. }));

        let err = Parser::parse("1 2\n1 1\n1\n1 2\n").unwrap_err();
        assert!(matches!(err, ParseError::RowLength { section: "basis", line: 4, .. }));
    }

    #[test]
    fn test_missing_sections() {
        assert_eq!(Parser::parse("").unwrap_err(), ParseError::MissingSection("cost"));
        assert_eq!(Parser::parse("1 2\n").unwrap_err(), ParseError::MissingSection("right-hand side"));
        assert_eq!(Parser::parse("1 2\n1\n").unwrap_err(), ParseError::MissingSection("basis"));
        // cost, rhs and basis present, no constraint rows
        assert_eq!(Parser::parse("1 2\n1\n1\n").unwrap_err(), ParseError::MissingSection("constraint"));
        assert!(Parser::parse("1 2\n1 1\n1\n1\n").is_ok());
    }

    #[test]
    fn test_unexpected_token() {
        let err = Parser::parse("1 2\n1 x\n1\n1\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                expected: "number".to_string(),
                found: "x".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn test_invalid_number() {
        let err = Parser::parse("1 -.\n1 1\n1\n1\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                text: "-.".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn test_basis_must_be_positive_integers() {
        let err = Parser::parse("1 2\n1 1\n1\n0\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidIndex { line: 4, .. }));
        let err = Parser::parse("1 2\n1 1\n1\n1.5\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidIndex { .. }));
    }
}
