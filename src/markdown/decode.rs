//! Markdown → document, driven by `pulldown-cmark` events.
//!
//! Decoding never fails: anything without a document counterpart degrades
//! to plain text.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::editable::{Document, LineFormat, TextRun};
use crate::mention::MentionRef;

/// A decoded line plus the top-level block it came from
#[derive(Debug)]
struct DecodedLine {
    runs: Vec<TextRun>,
    format: Option<LineFormat>,
    block: usize,
}

struct Decoder<'a> {
    source: &'a str,
    trigger_chars: &'a [char],
    lines: Vec<DecodedLine>,
    current: Vec<TextRun>,
    format: Option<LineFormat>,
    depth: usize,
    block: usize,
    quote_depth: usize,
    code: Option<String>,
    /// Next number per open list (`None` = bullet list)
    lists: Vec<Option<u64>>,
    item_prefix: Option<String>,
    /// `(target, label)` of open links and images
    links: Vec<(String, String)>,
    images: Vec<(String, String)>,
    /// Source offset just past the last inline content of the open line
    inline_end: Option<usize>,
}

impl<'a> Decoder<'a> {
    fn new(source: &'a str, trigger_chars: &'a [char]) -> Self {
        Self {
            source,
            trigger_chars,
            lines: Vec::new(),
            current: Vec::new(),
            format: None,
            depth: 0,
            block: 0,
            quote_depth: 0,
            code: None,
            lists: Vec::new(),
            item_prefix: None,
            links: Vec::new(),
            images: Vec::new(),
            inline_end: None,
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        let inline = match &event {
            Event::Text(_) => self.code.is_none(),
            Event::Code(_) | Event::InlineHtml(_) => true,
            Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => true,
            _ => false,
        };
        if inline {
            self.inline_end = Some(range.end);
        }
        match event {
            Event::Start(tag) => {
                if self.depth == 0 {
                    self.block += 1;
                }
                self.depth += 1;
                self.start(tag);
            }
            Event::End(tag) => {
                self.end(tag);
                self.depth = self.depth.saturating_sub(1);
            }
            Event::Text(text) => {
                if let Some(code) = self.code.as_mut() {
                    code.push_str(&text);
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) => self.push_text(&format!("`{}`", code)),
            Event::Html(html) | Event::InlineHtml(html) => {
                let mut parts = html.split('\n').peekable();
                while let Some(part) = parts.next() {
                    if !part.is_empty() {
                        self.push_text(part);
                    }
                    if parts.peek().is_some() {
                        self.flush();
                    }
                }
            }
            Event::SoftBreak | Event::HardBreak => self.flush(),
            Event::Rule => {
                if self.depth == 0 {
                    self.block += 1;
                }
                self.push_text("---");
                self.flush();
            }
            Event::TaskListMarker(checked) => {
                self.item_prefix = None;
                self.format = Some(LineFormat::Checklist { checked });
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                let hashes = "#".repeat(level as usize);
                self.push_text(&format!("{} ", hashes));
            }
            Tag::BlockQuote(_) => self.quote_depth += 1,
            Tag::CodeBlock(kind) => {
                self.flush();
                if let CodeBlockKind::Fenced(lang) = &kind {
                    tracing::trace!(lang = %lang, "decoding fenced block");
                }
                self.code = Some(String::new());
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let prefix = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let prefix = format!("{}. ", n);
                        *n += 1;
                        prefix
                    }
                    _ => "* ".to_string(),
                };
                self.item_prefix = Some(prefix);
            }
            Tag::Link { dest_url, .. } => self.links.push((dest_url.to_string(), String::new())),
            Tag::Image { dest_url, .. } => self.images.push((dest_url.to_string(), String::new())),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::HtmlBlock => {
                self.flush()
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                let content = self.code.take().unwrap_or_default();
                if !content.is_empty() {
                    let content = content.strip_suffix('\n').unwrap_or(&content);
                    for line in content.split('\n') {
                        let runs = if line.is_empty() {
                            Vec::new()
                        } else {
                            vec![TextRun::plain(line)]
                        };
                        self.lines.push(DecodedLine {
                            runs,
                            format: Some(LineFormat::CodeBlock),
                            block: self.block,
                        });
                    }
                }
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::Link => {
                if let Some((target, label)) = self.links.pop() {
                    self.push_link(&target, label);
                }
            }
            TagEnd::Image => {
                if let Some((target, alt)) = self.images.pop() {
                    self.push_text(&format!("![{}]({})", alt, target));
                }
            }
            _ => {}
        }
    }

    fn push_link(&mut self, target: &str, label: String) {
        match MentionRef::parse_reference(target) {
            Some(mention) => {
                let triggers = self.trigger_chars;
                let stripped = label.trim_start_matches(|c| triggers.contains(&c));
                let text = if stripped.is_empty() {
                    mention.id.clone()
                } else {
                    stripped.to_string()
                };
                self.push_run(TextRun::mention(text, mention));
            }
            None => {
                let text = if label.is_empty() {
                    target.to_string()
                } else {
                    label
                };
                self.push_run(TextRun::link(text, target));
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some((_, alt)) = self.images.last_mut() {
            alt.push_str(text);
        } else if let Some((_, label)) = self.links.last_mut() {
            label.push_str(text);
        } else {
            self.push_run(TextRun::plain(text));
        }
    }

    fn push_run(&mut self, run: TextRun) {
        if let Some((_, label)) = self.links.last_mut() {
            // Nested inline content (image inside a link) stays label text
            label.push_str(&run.text);
            return;
        }
        if let Some(prefix) = self.item_prefix.take() {
            self.current.push(TextRun::plain(prefix));
        }
        self.current.push(run);
    }

    /// The parser trims spaces at the end of a line; put them back
    fn restore_trailing_whitespace(&mut self) {
        let Some(end) = self.inline_end.take() else {
            return;
        };
        if self.current.is_empty() || !self.links.is_empty() || !self.images.is_empty() {
            return;
        }
        let rest = self.source.get(end..).unwrap_or_default();
        let trailing: String = rest.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        let at_line_end = matches!(
            rest[trailing.len()..].chars().next(),
            None | Some('\n') | Some('\r')
        );
        if !trailing.is_empty() && at_line_end {
            self.current.push(TextRun::plain(trailing));
        }
    }

    fn flush(&mut self) {
        self.restore_trailing_whitespace();
        self.item_prefix = None;
        if self.current.is_empty() && self.format.is_none() {
            return;
        }
        let format = self
            .format
            .take()
            .or_else(|| (self.quote_depth > 0).then_some(LineFormat::Blockquote));
        self.lines.push(DecodedLine {
            runs: std::mem::take(&mut self.current),
            format,
            block: self.block,
        });
    }

    /// Assemble lines into a document.
    ///
    /// Consecutive top-level plain blocks get a blank line between them;
    /// the last line keeps its terminator only when it carries a format.
    fn finish(mut self) -> Document {
        self.flush();

        let mut doc = Document::new();
        let count = self.lines.len();
        let mut previous: Option<(usize, bool)> = None;

        for (index, line) in self.lines.into_iter().enumerate() {
            let plain = line.format.is_none();
            if let Some((block, was_plain)) = previous {
                if was_plain && plain && block != line.block {
                    doc.push(TextRun::line_break(None));
                }
            }
            previous = Some((line.block, plain));

            for run in line.runs {
                doc.push(run);
            }
            if index + 1 < count || !plain {
                doc.push(TextRun::line_break(line.format));
            }
        }
        doc
    }
}

/// Decode markdown into a document.
///
/// `trigger_chars` are stripped from the start of mention labels.
pub fn decode(markdown: &str, trigger_chars: &[char]) -> Document {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TASKLISTS);
    let mut decoder = Decoder::new(markdown, trigger_chars);
    for (event, range) in parser.into_offset_iter() {
        decoder.event(event, range);
    }
    decoder.finish()
}
