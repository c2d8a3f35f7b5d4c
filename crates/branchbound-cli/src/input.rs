//! Reader for the problem entry protocol.
//!
//! The protocol is a stream of whitespace-separated numbers: the constraint
//! count, the variable count, one row of coefficients plus a bound per
//! constraint, then one objective coefficient per variable. Interactive mode
//! writes a prompt before each value the user still has to type.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use branchbound_solver::{LpProblem, SolveError};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    text: String,
    span: Span,
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),
    #[error("Invalid number '{text}' for {expected} at line {}, column {}", .span.line, .span.column)]
    InvalidNumber {
        text: String,
        expected: String,
        span: Span,
    },
    #[error("Invalid count '{text}' for {expected} at line {}, column {}: expected a non-negative integer", .span.line, .span.column)]
    InvalidCount {
        text: String,
        expected: String,
        span: Span,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Problem(#[from] SolveError),
}

pub struct ProblemReader<R, W> {
    input: R,
    prompts: Option<W>,
    pending: VecDeque<Token>,
    line: usize,
}

impl<R: BufRead> ProblemReader<R, io::Sink> {
    /// Read without prompting
    pub fn batch(input: R) -> Self {
        Self {
            input,
            prompts: None,
            pending: VecDeque::new(),
            line: 0,
        }
    }
}

impl<R: BufRead, W: Write> ProblemReader<R, W> {
    pub fn interactive(input: R, prompts: W) -> Self {
        Self {
            input,
            prompts: Some(prompts),
            pending: VecDeque::new(),
            line: 0,
        }
    }

    pub fn read_problem(&mut self) -> Result<LpProblem, InputError> {
        let m = self.read_count("Number of constraints: ", "the number of constraints")?;
        let n = self.read_count("Number of variables: ", "the number of variables")?;

        // Counts come straight from the user; rows grow as values arrive
        let mut rows = Vec::new();
        for i in 1..=m {
            self.announce(&format!("Constraint {}:\n", i))?;
            let mut row = Vec::new();
            for j in 1..=n {
                row.push(self.read_number(
                    &format!("  coefficient {}: ", j),
                    &format!("coefficient {} of constraint {}", j, i),
                )?);
            }
            row.push(self.read_number("  bound: ", &format!("the bound of constraint {}", i))?);
            rows.push(row);
        }

        self.announce("Objective function:\n")?;
        let mut objective = Vec::new();
        for j in 1..=n {
            objective.push(self.read_number(
                &format!("  coefficient {}: ", j),
                &format!("objective coefficient {}", j),
            )?);
        }

        Ok(LpProblem::from_rows(&rows, objective)?)
    }

    fn read_count(&mut self, prompt: &str, expected: &str) -> Result<usize, InputError> {
        let token = self.next_token(prompt, expected)?;
        token.text.parse().map_err(|_| InputError::InvalidCount {
            text: token.text,
            expected: expected.to_string(),
            span: token.span,
        })
    }

    fn read_number(&mut self, prompt: &str, expected: &str) -> Result<f64, InputError> {
        let token = self.next_token(prompt, expected)?;
        token.text.parse().map_err(|_| InputError::InvalidNumber {
            text: token.text,
            expected: expected.to_string(),
            span: token.span,
        })
    }

    /// Section headers are only shown when the user is typing value by value
    fn announce(&mut self, text: &str) -> Result<(), InputError> {
        if self.pending.is_empty() {
            if let Some(out) = self.prompts.as_mut() {
                out.write_all(text.as_bytes())?;
            }
        }
        Ok(())
    }

    fn next_token(&mut self, prompt: &str, expected: &str) -> Result<Token, InputError> {
        while self.pending.is_empty() {
            if let Some(out) = self.prompts.as_mut() {
                out.write_all(prompt.as_bytes())?;
                out.flush()?;
            }

            let mut buf = String::new();
            if self.input.read_line(&mut buf)? == 0 {
                return Err(InputError::UnexpectedEof(expected.to_string()));
            }
            self.line += 1;
            self.pending.extend(tokenize(&buf, self.line));
        }

        self.pending
            .pop_front()
            .ok_or_else(|| InputError::UnexpectedEof(expected.to_string()))
    }
}

fn tokenize(line: &str, line_no: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, ch) in line.char_indices().chain(std::iter::once((line.len(), ' '))) {
        match (ch.is_whitespace(), start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                tokens.push(Token {
                    text: line[s..i].to_string(),
                    span: Span {
                        line: line_no,
                        column: s + 1,
                    },
                });
                start = None;
            }
            _ => {}
        }
    }

    tokens
}
