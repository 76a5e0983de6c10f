//! Built-in structural check for Python source.
//!
//! Not a parser: it tracks string literals, bracket nesting, line
//! continuations and block indentation, which is where generated code goes
//! wrong in practice. Used when no Python interpreter is available.

use std::path::Path;

use super::{SyntaxError, SyntaxValidator, ValidateError, Validation};

const TAB_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalValidator;

impl SyntaxValidator for LexicalValidator {
    fn name(&self) -> &str {
        "lexical"
    }

    fn validate(&self, _path: &Path, source: &str) -> Result<Validation, ValidateError> {
        check(source)?;
        Ok(Validation::Structural)
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenString {
    quote: char,
    triple: bool,
    line: usize,
}

#[derive(Debug, Default)]
struct Scanner {
    brackets: Vec<(char, usize)>,
    string: Option<OpenString>,
    continued: bool,
}

impl Scanner {
    /// True while the current logical line spans past the end of the physical one.
    fn in_logical_line(&self) -> bool {
        !self.brackets.is_empty() || self.string.is_some() || self.continued
    }

    /// Scan one physical line; returns the last significant character outside
    /// comments, if any.
    fn scan_line(&mut self, line: &str, lineno: usize) -> Result<Option<char>, SyntaxError> {
        self.continued = false;
        let chars: Vec<char> = line.chars().collect();
        let mut last = None;
        let mut escaped_eol = false;
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if let Some(open) = self.string {
                if c == '\\' {
                    escaped_eol = i + 1 == chars.len();
                    i += 2;
                    continue;
                }
                if c == open.quote {
                    if !open.triple {
                        self.string = None;
                        last = Some(c);
                    } else if chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c) {
                        self.string = None;
                        last = Some(c);
                        i += 3;
                        continue;
                    }
                }
                i += 1;
                continue;
            }
            match c {
                '#' => break,
                '"' | '\'' => {
                    let triple = chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c);
                    self.string = Some(OpenString {
                        quote: c,
                        triple,
                        line: lineno,
                    });
                    i += if triple { 3 } else { 1 };
                    continue;
                }
                '(' | '[' | '{' => self.brackets.push((c, lineno)),
                ')' | ']' | '}' => match self.brackets.pop() {
                    Some((open, _)) if closer(open) == c => {}
                    Some((open, open_line)) => {
                        return Err(SyntaxError::at(
                            lineno,
                            format!(
                                "closing parenthesis '{c}' does not match opening parenthesis '{open}' on line {open_line}"
                            ),
                        ));
                    }
                    None => return Err(SyntaxError::at(lineno, format!("unmatched '{c}'"))),
                },
                '\\' => {
                    if i + 1 == chars.len() {
                        self.continued = true;
                        break;
                    }
                    return Err(SyntaxError::at(
                        lineno,
                        "unexpected character after line continuation character",
                    ));
                }
                c if c.is_whitespace() => {
                    i += 1;
                    continue;
                }
                _ => {}
            }
            last = Some(c);
            i += 1;
        }

        if let Some(open) = self.string
            && !open.triple
            && !escaped_eol
        {
            self.string = None;
            return Err(SyntaxError::at(
                open.line,
                format!("unterminated string literal (detected at line {lineno})"),
            ));
        }
        Ok(last)
    }
}

fn closer(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
            _ => break,
        }
    }
    width
}

/// Check `source` for structural errors, reporting the first one found.
pub fn check(source: &str) -> Result<(), SyntaxError> {
    let mut scanner = Scanner::default();
    let mut indents: Vec<usize> = vec![0];
    let mut pending_block: Option<usize> = None;
    let mut logical_start = 0;
    let mut logical_last: Option<char> = None;
    let mut line_count = 0;

    for (idx, line) in source.lines().enumerate() {
        let lineno = idx + 1;
        line_count = lineno;

        if !scanner.in_logical_line() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let indent = indent_width(line);
            let current = indents.last().copied().unwrap_or(0);
            if let Some(opener) = pending_block.take() {
                if indent <= current {
                    return Err(SyntaxError::at(
                        lineno,
                        format!("expected an indented block after line {opener}"),
                    ));
                }
                indents.push(indent);
            } else if indent > current {
                return Err(SyntaxError::at(lineno, "unexpected indent"));
            } else if indent < current {
                while indents.last().is_some_and(|&top| top > indent) {
                    indents.pop();
                }
                if indents.last().copied() != Some(indent) {
                    return Err(SyntaxError::at(
                        lineno,
                        "unindent does not match any outer indentation level",
                    ));
                }
            }
            logical_start = lineno;
            logical_last = None;
        }

        if let Some(last) = scanner.scan_line(line, lineno)? {
            logical_last = Some(last);
        }
        if !scanner.in_logical_line() && logical_last == Some(':') {
            pending_block = Some(logical_start);
        }
    }

    if let Some(open) = scanner.string {
        return Err(SyntaxError::at(
            open.line,
            "unterminated triple-quoted string literal",
        ));
    }
    if let Some((open, line)) = scanner.brackets.first() {
        return Err(SyntaxError::at(*line, format!("'{open}' was never closed")));
    }
    if scanner.continued {
        return Err(SyntaxError::at(line_count, "unexpected EOF while parsing"));
    }
    if let Some(opener) = pending_block {
        return Err(SyntaxError::at(
            line_count,
            format!("expected an indented block after line {opener}"),
        ));
    }
    Ok(())
}

/// For each line of `source`, whether the line ends inside a string literal.
///
/// Best effort: after a scan error tracking restarts from a clean state.
pub(crate) fn lines_ending_in_string(source: &str) -> Vec<bool> {
    let mut scanner = Scanner::default();
    source
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            if scanner.scan_line(line, idx + 1).is_err() {
                scanner = Scanner::default();
            }
            scanner.string.is_some()
        })
        .collect()
}
