//! Document → markdown.
//!
//! Lines are grouped into blocks: runs of code lines become one fenced
//! block, runs of checklist lines one list, runs of quote lines one quote,
//! and consecutive plain lines one paragraph. Blank plain lines separate
//! paragraphs. Blocks are joined by a blank line.

use crate::editable::{Document, Line, LineFormat, TextRun};

/// Error type for documents the encoder cannot represent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Mention run spanning a line break
    MultilineMention { offset: usize },
    /// Mention run with an empty label or id
    EmptyMention { offset: usize },
    /// Line format attached to something other than a `"\n"` run
    LineFormatOnText { offset: usize },
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::MultilineMention { offset } => {
                write!(f, "Mention at {} spans a line break", offset)
            }
            EncodeError::EmptyMention { offset } => {
                write!(f, "Mention at {} has an empty label or id", offset)
            }
            EncodeError::LineFormatOnText { offset } => {
                write!(f, "Line format on text run at {}", offset)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Paragraph,
    Checklist,
    Code,
    Quote,
}

impl BlockKind {
    fn of(line: &Line) -> Self {
        match line.format {
            None => BlockKind::Paragraph,
            Some(LineFormat::Checklist { .. }) => BlockKind::Checklist,
            Some(LineFormat::CodeBlock) => BlockKind::Code,
            Some(LineFormat::Blockquote) => BlockKind::Quote,
        }
    }
}

/// Reject run shapes with no markdown form
fn validate(doc: &Document) -> Result<(), EncodeError> {
    let mut offset = 0;
    for run in doc.runs() {
        if let Some(mention) = &run.attributes.mention {
            if run.text.contains('\n') {
                return Err(EncodeError::MultilineMention { offset });
            }
            if run.text.trim().is_empty() || mention.id.is_empty() {
                return Err(EncodeError::EmptyMention { offset });
            }
        }
        if run.attributes.line.is_some() && run.text.chars().any(|c| c != '\n') {
            return Err(EncodeError::LineFormatOnText { offset });
        }
        offset += run.len_chars();
    }
    Ok(())
}

/// Encode `doc` to markdown
pub fn encode(doc: &Document) -> Result<String, EncodeError> {
    validate(doc)?;

    let mut blocks: Vec<String> = Vec::new();
    let mut group: Vec<Line> = Vec::new();
    let mut kind = BlockKind::Paragraph;

    for line in doc.lines() {
        let line_kind = BlockKind::of(&line);
        if line_kind == BlockKind::Paragraph && line.is_blank() {
            // Blank plain lines only separate blocks
            flush(&mut blocks, &mut group, kind);
            continue;
        }
        if line_kind != kind {
            flush(&mut blocks, &mut group, kind);
            kind = line_kind;
        }
        group.push(line);
    }
    flush(&mut blocks, &mut group, kind);

    Ok(blocks.join("\n\n"))
}

fn flush(blocks: &mut Vec<String>, group: &mut Vec<Line>, kind: BlockKind) {
    if group.is_empty() {
        return;
    }
    let lines = std::mem::take(group);
    let block = match kind {
        BlockKind::Code => encode_code(&lines),
        _ => lines
            .iter()
            .map(encode_line)
            .collect::<Vec<_>>()
            .join("\n"),
    };
    blocks.push(block);
}

fn encode_line(line: &Line) -> String {
    let prefix = match line.format {
        Some(LineFormat::Checklist { checked: true }) => "* [x] ",
        Some(LineFormat::Checklist { checked: false }) => "* [ ] ",
        Some(LineFormat::Blockquote) => "> ",
        _ => "",
    };
    let mut out = String::from(prefix);
    for (index, run) in line.runs.iter().enumerate() {
        if index == 0 && !run.attributes.is_mention() && run.attributes.link.is_none() {
            encode_leading_whitespace(&mut out, &run.text);
        } else {
            encode_run(&mut out, run);
        }
    }
    out
}

/// Indentation would be trimmed or read as an indented code block, so the
/// first blank char goes out as an entity
fn encode_leading_whitespace(out: &mut String, text: &str) {
    let entity = match text.chars().next() {
        Some(' ') => "&#32;",
        Some('\t') => "&#9;",
        _ => "",
    };
    let rest = if entity.is_empty() { text } else { &text[1..] };
    out.push_str(entity);
    out.push_str(&escape_text(rest));
}

fn encode_run(out: &mut String, run: &TextRun) {
    if let Some(mention) = &run.attributes.mention {
        out.push_str(&format!(
            "[{}]({})",
            escape_label(&run.text),
            mention.to_reference()
        ));
    } else if let Some(target) = &run.attributes.link {
        out.push_str(&format!("[{}]({})", escape_label(&run.text), target));
    } else {
        out.push_str(&escape_text(&run.text));
    }
}

/// Labels are atomic: brackets would end them early and inline markup
/// would change their text
fn escape_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in escape_text(label).chars() {
        if matches!(c, '[' | ']' | '*' | '_' | '`' | '<' | '&' | '!') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Only double backslashes are escaped; other punctuation is left alone
fn escape_text(text: &str) -> String {
    text.replace("\\\\", "\\\\\\\\")
}

/// Code lines verbatim inside a fence longer than any backtick run they hold
fn encode_code(lines: &[Line]) -> String {
    let body: Vec<String> = lines.iter().map(Line::text).collect();
    let longest_run = body
        .iter()
        .map(|text| {
            text.split(|c| c != '`')
                .map(str::len)
                .max()
                .unwrap_or(0)
        })
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);
    format!("{}\n{}\n{}", fence, body.join("\n"), fence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::{MentionKind, MentionRef};

    fn tim() -> TextRun {
        TextRun::mention("Tim", MentionRef::new(MentionKind::User, "u1"))
    }

    #[test]
    fn test_mention_encodes_as_reference_link() {
        let doc = Document::from_runs([TextRun::plain("Hi "), tim(), TextRun::plain(" ")]);
        assert_eq!(encode(&doc).unwrap(), "Hi [Tim](user:u1) ");
    }

    #[test]
    fn test_plain_link_keeps_target() {
        let doc = Document::from_runs([TextRun::link("docs", "https://example.com/a")]);
        assert_eq!(encode(&doc).unwrap(), "[docs](https://example.com/a)");
    }

    #[test]
    fn test_checklist_lines() {
        let doc = Document::from_runs([
            TextRun::plain("done"),
            TextRun::line_break(Some(LineFormat::Checklist { checked: true })),
            TextRun::plain("todo"),
            TextRun::line_break(Some(LineFormat::Checklist { checked: false })),
        ]);
        assert_eq!(encode(&doc).unwrap(), "* [x] done\n* [ ] todo");
    }

    #[test]
    fn test_code_block_is_verbatim() {
        let doc = Document::from_runs([
            TextRun::plain("intro"),
            TextRun::line_break(None),
            TextRun::plain("let a = b\\\\c;"),
            TextRun::line_break(Some(LineFormat::CodeBlock)),
            TextRun::plain(""),
            TextRun::line_break(Some(LineFormat::CodeBlock)),
            TextRun::plain("  *x*"),
            TextRun::line_break(Some(LineFormat::CodeBlock)),
        ]);
        assert_eq!(
            encode(&doc).unwrap(),
            "intro\n\n```\nlet a = b\\\\c;\n\n  *x*\n```"
        );
    }

    #[test]
    fn test_code_fence_outgrows_backticks() {
        let doc = Document::from_runs([
            TextRun::plain("````"),
            TextRun::line_break(Some(LineFormat::CodeBlock)),
        ]);
        assert_eq!(encode(&doc).unwrap(), "`````\n````\n`````");
    }

    #[test]
    fn test_quote_lines_stack() {
        let doc = Document::from_runs([
            TextRun::plain("one"),
            TextRun::line_break(Some(LineFormat::Blockquote)),
            TextRun::plain("two"),
            TextRun::line_break(Some(LineFormat::Blockquote)),
            TextRun::plain("after"),
        ]);
        assert_eq!(encode(&doc).unwrap(), "> one\n> two\n\nafter");
    }

    #[test]
    fn test_paragraph_grouping() {
        let doc = Document::from_text("a\nb\n\n\nc");
        assert_eq!(encode(&doc).unwrap(), "a\nb\n\nc");
    }

    #[test]
    fn test_double_backslash_escaped() {
        let doc = Document::from_text("path\\\\share and \\n");
        assert_eq!(encode(&doc).unwrap(), "path\\\\\\\\share and \\n");
    }

    #[test]
    fn test_punctuation_not_escaped() {
        let doc = Document::from_text("1 * 2 _x_ #tag");
        assert_eq!(encode(&doc).unwrap(), "1 * 2 _x_ #tag");
    }

    #[test]
    fn test_label_brackets_escaped() {
        let doc = Document::from_runs([TextRun::mention(
            "a]b",
            MentionRef::new(MentionKind::Task, "t1"),
        )]);
        assert_eq!(encode(&doc).unwrap(), "[a\\]b](task:t1)");
    }

    #[test]
    fn test_label_markup_escaped() {
        let doc = Document::from_runs([TextRun::mention(
            "_v003_ *b* `c` <d> &e !f",
            MentionRef::new(MentionKind::Version, "v1"),
        )]);
        assert_eq!(
            encode(&doc).unwrap(),
            "[\\_v003\\_ \\*b\\* \\`c\\` \\<d> \\&e \\!f](version:v1)"
        );
    }

    #[test]
    fn test_leading_indentation_escaped() {
        let doc = Document::from_runs([
            TextRun::plain("    indented note"),
            TextRun::line_break(None),
            TextRun::plain("\tnext"),
            TextRun::line_break(None),
            TextRun::plain("  item"),
            TextRun::line_break(Some(LineFormat::Checklist { checked: false })),
        ]);
        assert_eq!(
            encode(&doc).unwrap(),
            "&#32;   indented note\n&#9;next\n\n* [ ] &#32; item"
        );
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(encode(&Document::new()).unwrap(), "");
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        let doc = Document::from_runs([
            TextRun::plain("x"),
            TextRun::mention("a\nb", MentionRef::new(MentionKind::User, "u1")),
        ]);
        assert_eq!(
            encode(&doc),
            Err(EncodeError::MultilineMention { offset: 1 })
        );

        let doc = Document::from_runs([TextRun::mention("Tim", MentionRef::new(MentionKind::User, ""))]);
        assert_eq!(encode(&doc), Err(EncodeError::EmptyMention { offset: 0 }));

        let doc = Document::from_runs([TextRun::new(
            "text",
            crate::editable::RunAttributes::line(LineFormat::CodeBlock),
        )]);
        assert_eq!(
            encode(&doc),
            Err(EncodeError::LineFormatOnText { offset: 0 })
        );
    }
}
