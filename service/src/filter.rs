//! Generated-artifact filter
//!
//! A generated typed-class module contains every class reachable from the
//! schema's imports. Only the classes the schema defines itself are kept;
//! every other top-level `class` block is cut out of the text. Nothing else
//! is rewritten: imports, module variables and kept classes stay exactly as
//! generated, apart from runs of blank lines longer than two.
//!
//! Block boundaries come from a line scanner that tracks string literals,
//! bracket nesting and line continuations, so a `class` keyword inside a
//! docstring or an indented body never starts a block. Source that cannot
//! be scanned is rejected instead of being passed through.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::generator::{GeneratorError, GeneratorResult};
use crate::linkml::read_document;

/// A top-level class definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassBlock {
    /// Class name
    pub name: String,
    /// First line (zero-based), including decorators
    pub start: usize,
    /// One past the last line; trailing blank lines are included
    pub end: usize,
}

/// Outcome of filtering one source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filtered {
    /// The filtered source
    pub source: String,
    /// Names of the removed classes, in source order
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Single(char),
    Triple(char),
}

#[derive(Debug, Default)]
struct Scanner {
    string: Option<Quote>,
    depth: usize,
    continuation: bool,
}

impl Scanner {
    /// Whether the next line begins a new logical line
    fn at_statement_start(&self) -> bool {
        self.string.is_none() && self.depth == 0 && !self.continuation
    }

    fn scan_line(&mut self, line: &str, number: usize) -> GeneratorResult<()> {
        let chars: Vec<char> = line.chars().collect();
        let mut escaped_newline = false;
        self.continuation = false;

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            match self.string {
                Some(quote) => {
                    if c == '\\' {
                        escaped_newline = i + 1 >= chars.len();
                        i += 2;
                        continue;
                    }
                    match quote {
                        Quote::Triple(q) if c == q && chars.get(i + 1) == Some(&q) && chars.get(i + 2) == Some(&q) => {
                            self.string = None;
                            i += 3;
                            continue;
                        }
                        Quote::Single(q) if c == q => self.string = None,
                        _ => {}
                    }
                }
                None => match c {
                    '#' => break,
                    '"' | '\'' => {
                        if chars.get(i + 1) == Some(&c) && chars.get(i + 2) == Some(&c) {
                            self.string = Some(Quote::Triple(c));
                            i += 3;
                            continue;
                        }
                        self.string = Some(Quote::Single(c));
                    }
                    '(' | '[' | '{' => self.depth += 1,
                    ')' | ']' | '}' => {
                        self.depth = self.depth.checked_sub(1).ok_or_else(|| {
                            GeneratorError::source_parse(number, format!("unmatched '{c}'"))
                        })?;
                    }
                    '\\' if i + 1 == chars.len() => self.continuation = true,
                    _ => {}
                },
            }
            i += 1;
        }

        if matches!(self.string, Some(Quote::Single(_))) && !escaped_newline {
            return Err(GeneratorError::source_parse(number, "unterminated string literal"));
        }
        Ok(())
    }

    fn finish(&self, lines: usize) -> GeneratorResult<()> {
        if self.string.is_some() {
            return Err(GeneratorError::source_parse(lines, "unterminated string at end of file"));
        }
        if self.depth > 0 {
            return Err(GeneratorError::source_parse(lines, "unclosed bracket at end of file"));
        }
        if self.continuation {
            return Err(GeneratorError::source_parse(lines, "line continuation at end of file"));
        }
        Ok(())
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r')
}

fn is_comment_only(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Whether the next line holding code is indented
///
/// Blank and comment-only lines are skipped. Such lines inside a string
/// literal are not told apart, which only matters for column-0 comments
/// directly followed by a multi-line string.
fn next_code_is_indented(lines: &[&str]) -> bool {
    lines
        .iter()
        .map(|raw| strip_line_ending(raw))
        .find(|line| !line.trim().is_empty() && !is_comment_only(line))
        .is_some_and(|line| line.starts_with([' ', '\t']))
}

/// Line indices of every top-level statement start
///
/// A column-0 comment followed by indented code belongs to the enclosing
/// block and does not start a statement.
fn top_level_lines(lines: &[&str]) -> GeneratorResult<Vec<usize>> {
    let mut scanner = Scanner::default();
    let mut starts = Vec::new();
    for (index, raw) in lines.iter().enumerate() {
        let line = strip_line_ending(raw);
        let number = index + 1;
        if scanner.at_statement_start() && !line.trim().is_empty() {
            if line.starts_with([' ', '\t']) {
                if starts.is_empty() {
                    return Err(GeneratorError::source_parse(number, "unexpected indent"));
                }
            } else {
                let body_comment =
                    is_comment_only(line) && !starts.is_empty() && next_code_is_indented(&lines[index + 1..]);
                if !body_comment {
                    starts.push(index);
                }
            }
        }
        scanner.scan_line(line, number)?;
    }
    scanner.finish(lines.len())?;
    Ok(starts)
}

fn class_name(line: &str, number: usize) -> GeneratorResult<Option<String>> {
    let Some(rest) = line.strip_prefix("class") else {
        return Ok(None);
    };
    if !rest.starts_with([' ', '\t']) {
        return Ok(None);
    }
    let name: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        return Err(GeneratorError::source_parse(number, "class statement without a name"));
    }
    Ok(Some(name))
}

/// Split a Python module into its top-level class blocks
///
/// # Errors
///
/// Returns [`GeneratorError::SourceParse`] for unbalanced brackets,
/// unterminated strings, a leading indent, or a nameless `class` statement.
pub fn find_class_blocks(source: &str) -> GeneratorResult<Vec<ClassBlock>> {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let starts = top_level_lines(&lines)?;

    let mut blocks = Vec::new();
    for (position, &line_index) in starts.iter().enumerate() {
        let line = strip_line_ending(lines[line_index]);
        let Some(name) = class_name(line, line_index + 1)? else {
            continue;
        };

        let mut first = position;
        while first > 0 && lines[starts[first - 1]].starts_with('@') {
            first -= 1;
        }
        let end = starts.get(position + 1).copied().unwrap_or(lines.len());
        blocks.push(ClassBlock {
            name,
            start: starts[first],
            end,
        });
    }
    Ok(blocks)
}

/// Remove every top-level class not named in `local`
///
/// Runs of more than two blank lines left behind are collapsed to two.
///
/// # Errors
///
/// Returns an error if the source cannot be split into blocks; nothing is
/// filtered in that case.
pub fn remove_unwanted_classes(source: &str, local: &BTreeSet<String>) -> GeneratorResult<Filtered> {
    let blocks = find_class_blocks(source)?;
    let lines: Vec<&str> = source.split_inclusive('\n').collect();

    let mut keep = vec![true; lines.len()];
    let mut removed = Vec::new();
    for block in blocks.iter().filter(|b| !local.contains(&b.name)) {
        keep[block.start..block.end].fill(false);
        removed.push(block.name.clone());
    }

    let mut output = String::with_capacity(source.len());
    let mut blank_run = 0;
    for (line, _) in lines.iter().zip(&keep).filter(|(_, keep)| **keep) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 2 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        output.push_str(line);
    }

    debug!(kept = blocks.len() - removed.len(), removed = removed.len(), "filtered class blocks");
    Ok(Filtered {
        source: output,
        removed,
    })
}

/// Filter a generated file against the schema document it came from
///
/// The local definitions are the classes and enums declared in the
/// document at `schema_path`. The result replaces `output`, or the source
/// file itself when no output is given. Returns the removed class names.
///
/// # Errors
///
/// Returns an error if either file cannot be read, the schema cannot be
/// parsed, or the source cannot be split into blocks. No file is written
/// on error.
pub fn filter_generated_file(
    source_path: &Path,
    schema_path: &Path,
    output: Option<&Path>,
) -> Result<Vec<String>> {
    let local = read_document(schema_path)?.local_definitions();
    let source =
        std::fs::read_to_string(source_path).map_err(|e| PipelineError::io(source_path, e))?;
    let filtered = remove_unwanted_classes(&source, &local)?;

    let output = output.unwrap_or(source_path);
    std::fs::write(output, &filtered.source).map_err(|e| PipelineError::io(output, e))?;
    info!(
        path = %output.display(),
        kept = local.len(),
        removed = filtered.removed.len(),
        "filtered generated classes"
    );
    Ok(filtered.removed)
}
