//! GetPot input file parser.
//!
//! Reads MOOSE input text into a forest of [`Block`]s. The parser is a line
//! oriented state machine over a stack of open blocks and never fails: lines
//! it cannot interpret are reported as [`ParseWarning`]s and skipped, since
//! production input files routinely contain directives this model does not
//! cover.
//!
//! - [`line`] – Classification of single lines

pub mod line;

use crate::error::{ParseWarning, Result};
use crate::model::*;
use crate::schema::{ContentSource, TYPE_PARAMETER};
use camino::Utf8Path;
use line::{Line, classify, classify_param, has_open_quote};
use tracing::{debug, warn};

/// Blocks read from a GetPot file together with the lines that were skipped.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    pub blocks: Vec<Block>,
    pub warnings: Vec<ParseWarning>,
}

/// Parse GetPot text into blocks, logging and discarding warnings.
pub fn parse(text: &str) -> Vec<Block> {
    parse_with_warnings(text).blocks
}

/// Parse GetPot text into blocks and collect the recoverable warnings.
pub fn parse_with_warnings(text: &str) -> Parsed {
    let mut state = ParseState::default();
    for (idx, raw) in text.lines().enumerate() {
        state.feed(idx + 1, raw);
    }
    state.finish()
}

/// Read and parse a GetPot file through a [`ContentSource`].
pub fn parse_file<S: ContentSource>(source: &mut S, path: impl AsRef<Utf8Path>) -> Result<Parsed> {
    let path = path.as_ref();
    let text = source.read_to_string(path)?;
    debug!(target: "mooseblocks::parser", "parsing {}", path);
    Ok(parse_with_warnings(&text))
}

// ────────────────────────────────────────────────────────────────────────────
// State machine
// ────────────────────────────────────────────────────────────────────────────

struct Frame {
    block: Block,
    /// Opened by a commented-out header; its lines carry an extra `#`.
    commented: bool,
}

/// A parameter whose quoted value continues on following lines.
struct Continuation {
    line: usize,
    /// First line of the parameter, as written.
    text: String,
    param: Parameter,
}

#[derive(Default)]
struct ParseState {
    stack: Vec<Frame>,
    blocks: Vec<Block>,
    warnings: Vec<ParseWarning>,
    continuation: Option<Continuation>,
}

impl ParseState {
    fn feed(&mut self, lineno: usize, raw: &str) {
        let trimmed = raw.trim();
        let line = self.strip_comment_prefixes(trimmed);

        if let Some(mut cont) = self.continuation.take() {
            if !line.starts_with('[') {
                if !line.is_empty() {
                    cont.param.value.push(' ');
                    cont.param.value.push_str(line);
                }
                if has_open_quote(&cont.param.value) {
                    self.continuation = Some(cont);
                } else {
                    self.add_parameter(cont.line, &cont.text, cont.param);
                }
                return;
            }
            self.warn(cont.line, &cont.text, "unterminated quoted value");
            self.add_parameter(cont.line, &cont.text, cont.param);
        }

        if line.is_empty() {
            return;
        }
        match classify(line) {
            Line::Open {
                name,
                comment,
                trailing,
            } => {
                self.trailing_text(lineno, raw, trailing);
                self.open(name, comment, false);
            }
            Line::Close { trailing } => {
                self.trailing_text(lineno, raw, trailing);
                self.close(lineno, raw);
            }
            Line::Param {
                name,
                value,
                comment,
            } => self.param(lineno, raw, name, value, comment, true),
            Line::Comment(text) => self.commented(lineno, raw, text),
            Line::Unknown => self.warn(lineno, raw, "unrecognized line"),
        }
    }

    /// Remove one leading `#` per commented-out block that is open.
    fn strip_comment_prefixes<'a>(&self, mut line: &'a str) -> &'a str {
        let depth = self.stack.iter().filter(|f| f.commented).count();
        for _ in 0..depth {
            match line.strip_prefix('#') {
                Some(rest) => line = rest.trim_start(),
                None => break,
            }
        }
        line
    }

    /// Handle the text after a leading `#`: a commented-out block header,
    /// an inactive parameter, or plain comment text.
    fn commented(&mut self, lineno: usize, raw: &str, text: &str) {
        if text.starts_with('[') {
            if let Line::Open {
                name,
                comment,
                trailing,
            } = classify(text)
            {
                self.trailing_text(lineno, raw, trailing);
                self.open(name, comment, true);
                return;
            }
        }
        if let Some(Line::Param {
            name,
            value,
            comment,
        }) = classify_param(text)
        {
            self.param(lineno, raw, name, value, comment, false);
            return;
        }
        if text.is_empty() {
            return;
        }
        match self.stack.last_mut() {
            Some(frame) => {
                let block = &mut frame.block;
                match block.comment.as_mut() {
                    Some(existing) if !existing.is_empty() => {
                        existing.push(' ');
                        existing.push_str(text);
                    }
                    _ => block.comment = Some(text.to_string()),
                }
            }
            None => debug!(target: "mooseblocks::parser", "line {}: dropping top-level comment", lineno),
        }
    }

    /// Text after a header's closing bracket is ignored; the header still counts.
    fn trailing_text(&mut self, lineno: usize, raw: &str, trailing: Option<&str>) {
        if trailing.is_some() {
            self.warn(lineno, raw, "ignoring text after block header");
        }
    }

    fn open(&mut self, name: &str, comment: Option<&str>, commented: bool) {
        let mut block = Block::new(name);
        block.active = !commented;
        block.comment = comment.map(str::to_string);
        self.stack.push(Frame { block, commented });
    }

    fn close(&mut self, lineno: usize, raw: &str) {
        match self.stack.pop() {
            Some(frame) => self.attach(frame.block),
            None => self.warn(lineno, raw, "block terminator without an open block"),
        }
    }

    fn attach(&mut self, mut block: Block) {
        if let Some(t) = block.parameter(TYPE_PARAMETER) {
            block.block_type = t.value.clone();
        }
        match self.stack.last_mut() {
            Some(parent) => parent.block.children.push(block),
            None => self.blocks.push(block),
        }
    }

    fn param(
        &mut self,
        lineno: usize,
        raw: &str,
        name: &str,
        value: &str,
        comment: Option<&str>,
        active: bool,
    ) {
        let param = Parameter {
            name: name.to_string(),
            value: value.to_string(),
            description: comment.unwrap_or_default().to_string(),
            active,
            ..Default::default()
        };
        if has_open_quote(value) {
            self.continuation = Some(Continuation {
                line: lineno,
                text: raw.to_string(),
                param,
            });
            return;
        }
        self.add_parameter(lineno, raw, param);
    }

    fn add_parameter(&mut self, lineno: usize, raw: &str, param: Parameter) {
        let Some(frame) = self.stack.last_mut() else {
            self.warn(lineno, raw, "parameter outside of any block");
            return;
        };
        if let Err(e) = frame.block.add_parameter(param) {
            self.warn(lineno, raw, &e.to_string());
        }
    }

    fn warn(&mut self, line: usize, raw: &str, reason: &str) {
        let warning = ParseWarning {
            line,
            text: raw.to_string(),
            reason: reason.to_string(),
        };
        warn!(target: "mooseblocks::parser", "{}", warning);
        self.warnings.push(warning);
    }

    fn finish(mut self) -> Parsed {
        if let Some(cont) = self.continuation.take() {
            self.warn(cont.line, &cont.text, "unterminated quoted value at end of input");
            self.add_parameter(cont.line, &cont.text, cont.param);
        }
        while let Some(frame) = self.stack.pop() {
            let name = frame.block.name.clone();
            self.warn(0, "", &format!("block '{}' is not closed", name));
            self.attach(frame.block);
        }
        Parsed {
            blocks: self.blocks,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_blocks_and_parameters() {
        let text = "\
[Mesh]                        # The mesh
  type = GeneratedMesh
# nx = 10
[]
[Kernels]
  [./diff]
    variable = u
  [../]
  [./]
  [../]
[]
";
        let parsed = parse_with_warnings(text);
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        let blocks = parsed.blocks;
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name, "Mesh");
        assert_eq!(blocks[0].comment(), "The mesh");
        assert_eq!(blocks[0].block_type, "GeneratedMesh");
        assert!(blocks[0].parameters[0].active);
        assert!(!blocks[0].parameters[1].active);
        assert_eq!(blocks[0].parameters[1].value, "10");
        assert_eq!(blocks[1].children.len(), 2);
        assert_eq!(blocks[1].children[0].name, "diff");
        assert!(blocks[1].children[1].is_anonymous());
    }

    #[test]
    fn test_unknown_lines_are_skipped() {
        let parsed = parse_with_warnings("[A]\n  what is this\n  x = 1\n[]\n[]\n");
        assert_eq!(parsed.blocks.len(), 1);
        assert_eq!(parsed.blocks[0].parameters.len(), 1);
        assert_eq!(parsed.warnings.len(), 2);
        assert_eq!(parsed.warnings[0].line, 2);
        assert_eq!(parsed.warnings[1].line, 5);
    }

    #[test]
    fn test_missing_trailing_newline() {
        let blocks = parse("[A]\n  x = 1\n[]");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].parameters[0].value, "1");
    }

    #[test]
    fn test_unclosed_block_is_kept() {
        let parsed = parse_with_warnings("[A]\n  [./b]\n  x = 1\n");
        assert_eq!(parsed.blocks.len(), 1);
        assert_eq!(parsed.blocks[0].children[0].name, "b");
        assert_eq!(parsed.warnings.len(), 2);
    }

    #[test]
    fn test_multiline_quoted_value() {
        let blocks = parse("[A]\n  vars = 'u\n          v w'\n  y = 2\n[]\n");
        assert_eq!(blocks[0].parameters[0].value, "'u v w'");
        assert_eq!(blocks[0].parameters[1].name, "y");
    }

    #[test]
    fn test_comment_lines_attach_to_open_block() {
        let blocks = parse("# header comment\n[A]\n  # first\n  # second\n[]\n");
        assert_eq!(blocks[0].comment(), "first second");
    }

    #[test]
    fn test_duplicate_parameter_keeps_first() {
        let parsed = parse_with_warnings("[A]\n  x = 1\n  x = 2\n[]\n");
        assert_eq!(parsed.blocks[0].parameters.len(), 1);
        assert_eq!(parsed.blocks[0].parameters[0].value, "1");
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_commented_out_block() {
        let blocks = parse("#[Outputs]\n#  exodus = true\n## csv = true\n#[]\n");
        assert_eq!(blocks.len(), 1);
        assert!(!blocks[0].active);
        assert!(blocks[0].parameters[0].active);
        assert!(!blocks[0].parameters[1].active);
    }

    #[test]
    fn test_header_with_trailing_text_still_opens() {
        let parsed = parse_with_warnings("[A]\n  [B] junk\n    x = 1\n  []\n  y = 2\n[]\n[C]\n[]\n");
        assert_eq!(parsed.blocks.len(), 2);
        let a = &parsed.blocks[0];
        assert_eq!(a.parameters.len(), 1);
        assert_eq!(a.parameters[0].name, "y");
        assert_eq!(a.children[0].name, "B");
        assert_eq!(a.children[0].parameters[0].name, "x");
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].line, 2);
    }

    #[test]
    fn test_unterminated_quote_reports_its_own_line() {
        let parsed = parse_with_warnings("[A]\n  vars = 'u v\n[]\n");
        assert_eq!(parsed.warnings.len(), 1);
        let warning = &parsed.warnings[0];
        assert_eq!(warning.line, 2);
        assert_eq!(warning.text.trim(), "vars = 'u v");
        assert_eq!(parsed.blocks[0].parameters[0].value, "'u v");
    }

    #[test]
    fn test_apostrophe_inside_value() {
        let blocks = parse("[Outputs]\n  file_base = bob's_run\n  exodus = true\n[]\n");
        assert_eq!(blocks[0].parameters.len(), 2);
        assert_eq!(blocks[0].parameters[0].value, "bob's_run");
    }
}
