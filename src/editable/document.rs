//! Rich-text document model.
//!
//! The flattened text lives in a `ropey::Rope`; attributes live in a parallel
//! list of spans. All offsets are char offsets into the flattened text, and
//! span boundaries are transparent to offset arithmetic.
//!
//! Mention runs are atomic: inserts never land strictly inside one, and a
//! delete that touches part of one removes the whole run.

use std::ops::Range;

use ropey::Rope;
use serde::{Deserialize, Serialize};

use crate::mention::MentionRef;

/// Block format carried by the `"\n"` that terminates a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineFormat {
    /// Checklist item, consumed by the checkbox-toggle collaborator
    Checklist { checked: bool },
    CodeBlock,
    Blockquote,
}

/// Attributes shared by every char of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention: Option<MentionRef>,
    /// Plain hyperlink target (never a `kind:id` reference)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Only meaningful on `"\n"` runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<LineFormat>,
}

impl RunAttributes {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn mention(mention: MentionRef) -> Self {
        Self {
            mention: Some(mention),
            ..Self::default()
        }
    }

    pub fn link(target: impl Into<String>) -> Self {
        Self {
            link: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn line(format: LineFormat) -> Self {
        Self {
            line: Some(format),
            ..Self::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        self.mention.is_none() && self.link.is_none() && self.line.is_none()
    }

    pub fn is_mention(&self) -> bool {
        self.mention.is_some()
    }

    /// Same attributes without the line format (for the content of a line)
    fn inline(&self) -> Self {
        Self {
            line: None,
            ..self.clone()
        }
    }
}

/// A contiguous span of text sharing the same attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default)]
    pub attributes: RunAttributes,
}

impl TextRun {
    pub fn new(text: impl Into<String>, attributes: RunAttributes) -> Self {
        Self {
            text: text.into(),
            attributes,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunAttributes::plain())
    }

    pub fn mention(label: impl Into<String>, mention: MentionRef) -> Self {
        Self::new(label, RunAttributes::mention(mention))
    }

    pub fn link(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(text, RunAttributes::link(target))
    }

    /// A line terminator, optionally carrying a block format
    pub fn line_break(format: Option<LineFormat>) -> Self {
        Self::new(
            "\n",
            RunAttributes {
                line: format,
                ..RunAttributes::default()
            },
        )
    }

    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }
}

/// A mention run located in the flattened text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSpan {
    pub range: Range<usize>,
    pub mention: MentionRef,
}

/// One line of the document with its block format
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// Inline content (line formats stripped)
    pub runs: Vec<TextRun>,
    pub format: Option<LineFormat>,
    /// False only for a final line without a trailing `"\n"`
    pub terminated: bool,
}

impl Line {
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|run| run.text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Span {
    len: usize,
    attributes: RunAttributes,
}

/// Ordered sequence of text runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TextRun>", into = "Vec<TextRun>")]
pub struct Document {
    text: Rope,
    spans: Vec<Span>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self::from_runs([TextRun::plain(text)])
    }

    pub fn from_runs<I: IntoIterator<Item = TextRun>>(runs: I) -> Self {
        let mut doc = Self::new();
        for run in runs {
            doc.push(run);
        }
        doc
    }

    /// Append a run at the end of the document
    pub fn push(&mut self, run: TextRun) {
        let len = run.len_chars();
        if len == 0 {
            return;
        }
        let end = self.len_chars();
        self.text.insert(end, &run.text);
        self.spans.push(Span {
            len,
            attributes: run.attributes,
        });
        self.normalize();
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Full flattened text
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// Slice of the flattened text (clamped to the document)
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start >= end {
            return String::new();
        }
        self.text.slice(start..end).to_string()
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.len_chars()).then(|| self.text.char(offset))
    }

    pub fn runs(&self) -> Vec<TextRun> {
        self.runs_in(0..self.len_chars())
    }

    /// Runs covering `range`, with the first and last trimmed to it
    pub fn runs_in(&self, range: Range<usize>) -> Vec<TextRun> {
        let mut runs = Vec::new();
        let mut pos = 0;
        for span in &self.spans {
            let span_end = pos + span.len;
            let start = range.start.max(pos);
            let end = range.end.min(span_end);
            if start < end {
                runs.push(TextRun::new(
                    self.text.slice(start..end).to_string(),
                    span.attributes.clone(),
                ));
            }
            pos = span_end;
            if pos >= range.end {
                break;
            }
        }
        runs
    }

    /// Attributes of the char at `offset` (plain when out of range)
    pub fn attributes_at(&self, offset: usize) -> RunAttributes {
        self.span_index_at(offset)
            .map(|(index, _)| self.spans[index].attributes.clone())
            .unwrap_or_default()
    }

    /// Attributes common to every char in `range`.
    ///
    /// A collapsed range reports the inline attributes of the char before it,
    /// which is what a caret "is adjacent to".
    pub fn format(&self, range: Range<usize>) -> RunAttributes {
        if range.start >= range.end {
            if range.start == 0 {
                return RunAttributes::plain();
            }
            return self.attributes_at(range.start - 1).inline();
        }

        let mut common: Option<RunAttributes> = None;
        for run in self.runs_in(range) {
            common = Some(match common {
                None => run.attributes,
                Some(mut acc) => {
                    if acc.mention != run.attributes.mention {
                        acc.mention = None;
                    }
                    if acc.link != run.attributes.link {
                        acc.link = None;
                    }
                    if acc.line != run.attributes.line {
                        acc.line = None;
                    }
                    acc
                }
            });
        }
        common.unwrap_or_default()
    }

    /// The mention run containing the char at `offset`
    pub fn mention_span_at(&self, offset: usize) -> Option<MentionSpan> {
        let (index, start) = self.span_index_at(offset)?;
        let span = &self.spans[index];
        let mention = span.attributes.mention.clone()?;
        Some(MentionSpan {
            range: start..start + span.len,
            mention,
        })
    }

    /// Grow `range` so that it never covers only part of a mention run
    pub fn atomic_range(&self, range: Range<usize>) -> Range<usize> {
        if range.start >= range.end {
            return range;
        }
        let mut start = range.start;
        let mut end = range.end;
        if let Some(span) = self.mention_span_at(start) {
            start = start.min(span.range.start);
        }
        if let Some(span) = self.mention_span_at(end - 1) {
            end = end.max(span.range.end);
        }
        start..end
    }

    /// Insert `text` with `attributes`, returning the offset actually used.
    ///
    /// An offset strictly inside a mention run snaps to the end of that run.
    pub fn insert(&mut self, offset: usize, text: &str, attributes: RunAttributes) -> usize {
        let mut offset = offset.min(self.len_chars());
        if let Some(span) = self.mention_span_at(offset) {
            if span.range.start < offset {
                offset = span.range.end;
            }
        }

        let len = text.chars().count();
        if len == 0 {
            return offset;
        }

        let index = self.split_at(offset);
        self.spans.insert(index, Span { len, attributes });
        self.text.insert(offset, text);
        self.normalize();
        offset
    }

    /// Delete `range` (grown to whole mention runs).
    ///
    /// Returns the range actually removed and the removed runs.
    pub fn delete(&mut self, range: Range<usize>) -> (Range<usize>, Vec<TextRun>) {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        let range = self.atomic_range(start..end);
        if range.is_empty() {
            return (range, Vec::new());
        }

        let removed = self.runs_in(range.clone());
        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        self.spans.drain(first..last);
        self.text.remove(range.clone());
        self.normalize();
        (range, removed)
    }

    /// Range of the line containing `offset`, excluding its `"\n"`
    pub fn line_bounds(&self, offset: usize) -> Range<usize> {
        let len = self.len_chars();
        let offset = offset.min(len);
        let mut start = offset;
        while start > 0 && self.text.char(start - 1) != '\n' {
            start -= 1;
        }
        let mut end = offset;
        while end < len && self.text.char(end) != '\n' {
            end += 1;
        }
        start..end
    }

    /// Split the document into lines.
    ///
    /// A trailing empty, unterminated line is not reported.
    pub fn lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut current = Line::default();

        for run in self.runs() {
            let inline = run.attributes.inline();
            let mut rest = run.text.as_str();
            while let Some(idx) = rest.find('\n') {
                let head = &rest[..idx];
                if !head.is_empty() {
                    current.runs.push(TextRun::new(head, inline.clone()));
                }
                current.format = run.attributes.line;
                current.terminated = true;
                lines.push(std::mem::take(&mut current));
                rest = &rest[idx + 1..];
            }
            if !rest.is_empty() {
                current.runs.push(TextRun::new(rest, inline));
            }
        }

        if !current.runs.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn span_index_at(&self, offset: usize) -> Option<(usize, usize)> {
        let mut pos = 0;
        for (index, span) in self.spans.iter().enumerate() {
            if offset < pos + span.len {
                return Some((index, pos));
            }
            pos += span.len;
        }
        None
    }

    /// Ensure a span boundary at `offset`; returns the index of the span
    /// starting there (or `spans.len()` at the end).
    fn split_at(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for index in 0..self.spans.len() {
            if pos == offset {
                return index;
            }
            let len = self.spans[index].len;
            if offset < pos + len {
                let head = offset - pos;
                let tail = Span {
                    len: len - head,
                    attributes: self.spans[index].attributes.clone(),
                };
                self.spans[index].len = head;
                self.spans.insert(index + 1, tail);
                return index + 1;
            }
            pos += len;
        }
        self.spans.len()
    }

    /// Drop empty spans and merge equal neighbours. Mention spans never merge.
    fn normalize(&mut self) {
        let mut merged: Vec<Span> = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if span.len == 0 {
                continue;
            }
            if let Some(last) = merged.last_mut() {
                if last.attributes == span.attributes && !span.attributes.is_mention() {
                    last.len += span.len;
                    continue;
                }
            }
            merged.push(span);
        }
        self.spans = merged;
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.runs() == other.runs()
    }
}

impl Eq for Document {}

impl From<Vec<TextRun>> for Document {
    fn from(runs: Vec<TextRun>) -> Self {
        Self::from_runs(runs)
    }
}

impl From<Document> for Vec<TextRun> {
    fn from(doc: Document) -> Self {
        doc.runs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::MentionKind;

    fn tim() -> MentionRef {
        MentionRef::new(MentionKind::User, "u1")
    }

    fn doc_with_mention() -> Document {
        // "Hi " + [Tim] + " there"
        Document::from_runs([
            TextRun::plain("Hi "),
            TextRun::mention("Tim", tim()),
            TextRun::plain(" there"),
        ])
    }

    #[test]
    fn test_from_runs_merges_plain_neighbours() {
        let doc = Document::from_runs([TextRun::plain("ab"), TextRun::plain("cd")]);
        assert_eq!(doc.runs(), vec![TextRun::plain("abcd")]);
        assert_eq!(doc.len_chars(), 4);
    }

    #[test]
    fn test_adjacent_mentions_stay_separate() {
        let doc = Document::from_runs([
            TextRun::mention("Tim", tim()),
            TextRun::mention("Tim", tim()),
        ]);
        assert_eq!(doc.runs().len(), 2);
    }

    #[test]
    fn test_insert_plain_text() {
        let mut doc = Document::from_text("hello");
        let at = doc.insert(5, " world", RunAttributes::plain());
        assert_eq!(at, 5);
        assert_eq!(doc.text(), "hello world");
        assert_eq!(doc.runs().len(), 1);
    }

    #[test]
    fn test_insert_utf8_offsets_are_chars() {
        let mut doc = Document::from_text("héllo");
        doc.insert(2, "X", RunAttributes::plain());
        assert_eq!(doc.text(), "héXllo");
    }

    #[test]
    fn test_insert_inside_mention_snaps_to_end() {
        let mut doc = doc_with_mention();
        let at = doc.insert(4, "x", RunAttributes::plain());
        assert_eq!(at, 6);
        assert_eq!(doc.text(), "Hi Timx there");
        assert_eq!(doc.mention_span_at(3).map(|s| s.range), Some(3..6));
    }

    #[test]
    fn test_insert_at_mention_start_is_allowed() {
        let mut doc = doc_with_mention();
        let at = doc.insert(3, "@", RunAttributes::plain());
        assert_eq!(at, 3);
        assert_eq!(doc.text(), "Hi @Tim there");
    }

    #[test]
    fn test_delete_partial_mention_removes_whole_run() {
        let mut doc = doc_with_mention();
        let (range, removed) = doc.delete(5..6);
        assert_eq!(range, 3..6);
        assert_eq!(removed, vec![TextRun::mention("Tim", tim())]);
        assert_eq!(doc.text(), "Hi  there");
        assert_eq!(doc.runs(), vec![TextRun::plain("Hi  there")]);
    }

    #[test]
    fn test_delete_plain_range() {
        let mut doc = doc_with_mention();
        let (range, removed) = doc.delete(0..2);
        assert_eq!(range, 0..2);
        assert_eq!(removed, vec![TextRun::plain("Hi")]);
        assert_eq!(doc.text(), " Tim there");
    }

    #[test]
    fn test_delete_clamps_out_of_range() {
        let mut doc = Document::from_text("abc");
        let (range, _) = doc.delete(2..10);
        assert_eq!(range, 2..3);
        assert_eq!(doc.text(), "ab");
    }

    #[test]
    fn test_mention_span_at() {
        let doc = doc_with_mention();
        assert_eq!(doc.mention_span_at(2), None);
        let span = doc.mention_span_at(5).unwrap();
        assert_eq!(span.range, 3..6);
        assert_eq!(span.mention, tim());
        assert_eq!(doc.mention_span_at(6), None);
    }

    #[test]
    fn test_format_collapsed_reports_char_before() {
        let doc = doc_with_mention();
        assert!(doc.format(6..6).is_mention());
        assert!(!doc.format(3..3).is_mention());
        assert!(doc.format(0..0).is_plain());
    }

    #[test]
    fn test_format_range_keeps_common_attributes() {
        let doc = doc_with_mention();
        assert!(doc.format(3..6).is_mention());
        assert!(doc.format(2..6).is_plain());
    }

    #[test]
    fn test_lines_carry_line_formats() {
        let doc = Document::from_runs([
            TextRun::plain("intro"),
            TextRun::line_break(None),
            TextRun::plain("task"),
            TextRun::line_break(Some(LineFormat::Checklist { checked: true })),
            TextRun::plain("tail"),
        ]);
        let lines = doc.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text(), "intro");
        assert_eq!(lines[0].format, None);
        assert_eq!(lines[1].text(), "task");
        assert_eq!(
            lines[1].format,
            Some(LineFormat::Checklist { checked: true })
        );
        assert!(lines[1].terminated);
        assert_eq!(lines[2].text(), "tail");
        assert!(!lines[2].terminated);
    }

    #[test]
    fn test_lines_report_blank_lines() {
        let doc = Document::from_text("a\n\nb\n");
        let lines = doc.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_blank());
        assert!(lines[2].terminated);
    }

    #[test]
    fn test_line_bounds() {
        let doc = Document::from_text("one\ntwo\nthree");
        assert_eq!(doc.line_bounds(0), 0..3);
        assert_eq!(doc.line_bounds(5), 4..7);
        assert_eq!(doc.line_bounds(7), 4..7);
        assert_eq!(doc.line_bounds(13), 8..13);
    }

    #[test]
    fn test_serde_round_trip_as_runs() {
        let doc = doc_with_mention();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"kind\":\"user\""));
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
