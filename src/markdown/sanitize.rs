//! Submit-time cleanup of encoded markdown.
//!
//! - query strings are stripped from image URLs
//! - trigger chars that leaked into link or image labels are removed
//!
//! Code blocks are passed through untouched.

use std::ops::Range;

use lazy_static::lazy_static;
use pulldown_cmark::{Event, Options, Parser, Tag};
use regex::Regex;

lazy_static! {
    /// `![alt](url?query)` → captures `![alt](url`
    static ref IMAGE_QUERY: Regex =
        Regex::new(r"(!\[[^\]]*\]\([^)?\s]+)\?[^)\s]*\)").unwrap();

    /// Leaked `@` run for the default trigger set
    static ref DEFAULT_LEAKED_TRIGGER: Regex = Regex::new(r"(!?\[)(?:@)+").unwrap();
}

/// Compiled sanitize pass for one trigger set
#[derive(Debug, Clone)]
pub struct Sanitizer {
    leaked_trigger: Option<Regex>,
}

impl Sanitizer {
    /// Build the pass for the given trigger chars
    pub fn new(trigger_chars: &[char]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = trigger_chars
            .iter()
            .map(|c| regex::escape(&c.to_string()))
            .collect();
        let leaked_trigger = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(r"(!?\[)(?:{})+", alternatives.join("|"));
            Some(Regex::new(&pattern)?)
        };
        Ok(Self { leaked_trigger })
    }

    pub fn sanitize(&self, markdown: &str) -> String {
        let mut out = String::with_capacity(markdown.len());
        let mut pos = 0;
        for block in code_blocks(markdown) {
            out.push_str(&self.sanitize_text(&markdown[pos..block.start]));
            out.push_str(&markdown[block.clone()]);
            pos = block.end;
        }
        out.push_str(&self.sanitize_text(&markdown[pos..]));
        out
    }

    fn sanitize_text(&self, text: &str) -> String {
        let without_query = IMAGE_QUERY.replace_all(text, "${1})");
        match &self.leaked_trigger {
            Some(re) => re.replace_all(&without_query, "${1}").into_owned(),
            None => without_query.into_owned(),
        }
    }
}

/// Source ranges of fenced and indented code blocks
fn code_blocks(markdown: &str) -> Vec<Range<usize>> {
    Parser::new_ext(markdown, Options::ENABLE_TASKLISTS)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_)) => Some(range),
            _ => None,
        })
        .collect()
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            leaked_trigger: Some(DEFAULT_LEAKED_TRIGGER.clone()),
        }
    }
}
