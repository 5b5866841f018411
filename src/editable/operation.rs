//! Edit operations: the retain/insert/delete change description emitted by
//! the surface for every change.

use super::document::{Document, RunAttributes, TextRun};

/// A single step of an [`EditOperation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpStep {
    /// Advance the cursor without modification
    Retain(usize),
    /// Insert text at the cursor
    Insert {
        text: String,
        attributes: RunAttributes,
    },
    /// Remove chars at the cursor
    Delete(usize),
}

/// Summary of a keystroke-sized change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePoint {
    /// Offset where the change starts
    pub offset: usize,
    /// Text inserted at `offset` (after any deletion)
    pub inserted: String,
    /// Number of chars removed at `offset`
    pub deleted: usize,
}

impl ChangePoint {
    pub fn inserted_len(&self) -> usize {
        self.inserted.chars().count()
    }

    /// Offset just after the changed region in the new document
    pub fn end(&self) -> usize {
        self.offset + self.inserted_len()
    }
}

/// Sequence of retain/insert/delete steps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOperation {
    steps: Vec<OpStep>,
}

impl EditOperation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[OpStep] {
        &self.steps
    }

    /// True when the operation changes nothing
    pub fn is_noop(&self) -> bool {
        self.steps.iter().all(|step| matches!(step, OpStep::Retain(_)))
    }

    pub fn retain(mut self, len: usize) -> Self {
        if len == 0 {
            return self;
        }
        if let Some(OpStep::Retain(n)) = self.steps.last_mut() {
            *n += len;
        } else {
            self.steps.push(OpStep::Retain(len));
        }
        self
    }

    pub fn insert(self, text: impl Into<String>) -> Self {
        self.insert_with(text, RunAttributes::plain())
    }

    pub fn insert_with(mut self, text: impl Into<String>, attributes: RunAttributes) -> Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }
        if let Some(OpStep::Insert {
            text: last,
            attributes: last_attrs,
        }) = self.steps.last_mut()
        {
            if *last_attrs == attributes && !attributes.is_mention() {
                last.push_str(&text);
                return self;
            }
        }
        self.steps.push(OpStep::Insert { text, attributes });
        self
    }

    pub fn delete(mut self, len: usize) -> Self {
        if len == 0 {
            return self;
        }
        if let Some(OpStep::Delete(n)) = self.steps.last_mut() {
            *n += len;
        } else {
            self.steps.push(OpStep::Delete(len));
        }
        self
    }

    /// Insert `text` at `offset`
    pub fn insert_at(offset: usize, text: impl Into<String>, attributes: RunAttributes) -> Self {
        Self::new().retain(offset).insert_with(text, attributes)
    }

    /// Delete `len` chars at `offset`
    pub fn delete_at(offset: usize, len: usize) -> Self {
        Self::new().retain(offset).delete(len)
    }

    /// Replace `len` chars at `offset` with `text`
    pub fn replace_at(
        offset: usize,
        len: usize,
        text: impl Into<String>,
        attributes: RunAttributes,
    ) -> Self {
        Self::new()
            .retain(offset)
            .delete(len)
            .insert_with(text, attributes)
    }

    /// Apply the operation to `doc`.
    ///
    /// The document snaps inserts out of mention runs and grows deletes to
    /// whole runs, so the returned operation is the one that actually took
    /// effect. Inverses, caret mapping and change events use that one.
    pub fn apply(&self, doc: &mut Document) -> EditOperation {
        let mut effective = EditOperation::new();
        let mut cursor = 0;
        let mut emitted = 0;
        // Chars a grown delete already consumed past its requested end
        let mut overshoot = 0;
        for step in &self.steps {
            match step {
                OpStep::Retain(n) => {
                    let skipped = overshoot.min(*n);
                    overshoot -= skipped;
                    cursor += n - skipped;
                }
                OpStep::Insert { text, attributes } => {
                    let at = doc.insert(cursor, text, attributes.clone());
                    let len = text.chars().count();
                    effective = effective
                        .retain(at.saturating_sub(emitted))
                        .insert_with(text.clone(), attributes.clone());
                    cursor = at + len;
                    emitted = cursor;
                }
                OpStep::Delete(n) => {
                    let (removed, _) = doc.delete(cursor..cursor + n);
                    overshoot += removed.end.saturating_sub(cursor + n);
                    effective = effective
                        .retain(removed.start.saturating_sub(emitted))
                        .delete(removed.len());
                    cursor = removed.start;
                    emitted = cursor;
                }
            }
        }
        effective
    }

    /// Operation that undoes `self` when applied to the result of applying
    /// `self` to `before`.
    pub fn invert(&self, before: &Document) -> EditOperation {
        let mut inverse = EditOperation::new();
        let mut base = 0;
        for step in &self.steps {
            match step {
                OpStep::Retain(n) => {
                    inverse = inverse.retain(*n);
                    base += n;
                }
                OpStep::Insert { text, .. } => {
                    inverse = inverse.delete(text.chars().count());
                }
                OpStep::Delete(n) => {
                    for TextRun { text, attributes } in before.runs_in(base..base + n) {
                        inverse = inverse.insert_with(text, attributes);
                    }
                    base += n;
                }
            }
        }
        inverse
    }

    /// Summarize the first contiguous change (insert and/or delete at one
    /// offset). `None` for pure retains.
    pub fn change_point(&self) -> Option<ChangePoint> {
        let mut offset = 0;
        let mut point: Option<ChangePoint> = None;
        for step in &self.steps {
            match step {
                OpStep::Retain(n) => {
                    if point.is_some() {
                        break;
                    }
                    offset += n;
                }
                OpStep::Insert { text, .. } => {
                    point
                        .get_or_insert_with(|| ChangePoint {
                            offset,
                            ..ChangePoint::default()
                        })
                        .inserted
                        .push_str(text);
                }
                OpStep::Delete(n) => {
                    point
                        .get_or_insert_with(|| ChangePoint {
                            offset,
                            ..ChangePoint::default()
                        })
                        .deleted += n;
                }
            }
        }
        point
    }

    /// Map an offset in the old document to the new one. A caret at an
    /// insertion point moves past the inserted text.
    pub fn transform_offset(&self, offset: usize) -> usize {
        let mut base = 0;
        let mut mapped = offset;
        for step in &self.steps {
            if base > offset {
                break;
            }
            match step {
                OpStep::Retain(n) => base += n,
                OpStep::Insert { text, .. } => {
                    mapped += text.chars().count();
                }
                OpStep::Delete(n) => {
                    let removed = (*n).min(offset.saturating_sub(base));
                    mapped -= removed;
                    base += n;
                }
            }
        }
        mapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::{MentionKind, MentionRef};

    #[test]
    fn test_builder_merges_and_drops_empty_steps() {
        let op = EditOperation::new()
            .retain(2)
            .retain(3)
            .retain(0)
            .insert("a")
            .insert("b")
            .delete(1)
            .delete(2);
        assert_eq!(
            op.steps(),
            &[
                OpStep::Retain(5),
                OpStep::Insert {
                    text: "ab".to_string(),
                    attributes: RunAttributes::plain()
                },
                OpStep::Delete(3),
            ]
        );
    }

    #[test]
    fn test_mention_inserts_never_merge() {
        let mention = RunAttributes::mention(MentionRef::new(MentionKind::User, "u1"));
        let op = EditOperation::new()
            .insert_with("Tim", mention.clone())
            .insert_with("Tim", mention);
        assert_eq!(op.steps().len(), 2);
    }

    #[test]
    fn test_apply_insert_and_delete() {
        let mut doc = Document::from_text("hello world");
        EditOperation::replace_at(6, 5, "there", RunAttributes::plain()).apply(&mut doc);
        assert_eq!(doc.text(), "hello there");
    }

    #[test]
    fn test_invert_restores_document() {
        let before = Document::from_runs([
            TextRun::plain("Hi "),
            TextRun::mention("Tim", MentionRef::new(MentionKind::User, "u1")),
            TextRun::plain(" !"),
        ]);
        let op = EditOperation::new().retain(3).delete(3).insert("Bob");
        let mut doc = before.clone();
        let effective = op.apply(&mut doc);
        assert_eq!(effective, op);
        assert_eq!(doc.text(), "Hi Bob !");

        op.invert(&before).apply(&mut doc);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_apply_reports_grown_delete() {
        let before = Document::from_runs([
            TextRun::plain("Hi "),
            TextRun::mention("Tim", MentionRef::new(MentionKind::User, "u1")),
            TextRun::plain(" x"),
        ]);
        let mut doc = before.clone();
        let effective = EditOperation::delete_at(4, 1).apply(&mut doc);
        assert_eq!(doc.text(), "Hi  x");
        assert_eq!(effective, EditOperation::delete_at(3, 3));

        effective.invert(&before).apply(&mut doc);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_apply_reports_snapped_insert() {
        let mut doc = Document::from_runs([TextRun::mention(
            "Tim",
            MentionRef::new(MentionKind::User, "u1"),
        )]);
        let effective = EditOperation::insert_at(1, "!", RunAttributes::plain()).apply(&mut doc);
        assert_eq!(doc.text(), "Tim!");
        assert_eq!(effective, EditOperation::insert_at(3, "!", RunAttributes::plain()));
    }

    #[test]
    fn test_apply_grown_replace_keeps_following_steps() {
        let mut doc = Document::from_runs([
            TextRun::mention("Tim", MentionRef::new(MentionKind::User, "u1")),
            TextRun::plain(" ab"),
        ]);
        let op = EditOperation::new()
            .retain(2)
            .delete(1)
            .insert("X")
            .retain(2)
            .delete(1);
        let effective = op.apply(&mut doc);
        assert_eq!(doc.text(), "X a");
        assert_eq!(
            effective,
            EditOperation::new().delete(3).insert("X").retain(2).delete(1)
        );
    }

    #[test]
    fn test_change_point_for_keystrokes() {
        let typed = EditOperation::insert_at(4, "t", RunAttributes::plain());
        assert_eq!(
            typed.change_point(),
            Some(ChangePoint {
                offset: 4,
                inserted: "t".to_string(),
                deleted: 0
            })
        );

        let backspace = EditOperation::delete_at(5, 1);
        assert_eq!(
            backspace.change_point(),
            Some(ChangePoint {
                offset: 5,
                inserted: String::new(),
                deleted: 1
            })
        );

        assert_eq!(EditOperation::new().retain(3).change_point(), None);
    }

    #[test]
    fn test_transform_offset() {
        let insert = EditOperation::insert_at(2, "xyz", RunAttributes::plain());
        assert_eq!(insert.transform_offset(1), 1);
        assert_eq!(insert.transform_offset(2), 5);
        assert_eq!(insert.transform_offset(4), 7);

        let delete = EditOperation::delete_at(2, 3);
        assert_eq!(delete.transform_offset(1), 1);
        assert_eq!(delete.transform_offset(3), 2);
        assert_eq!(delete.transform_offset(6), 3);
    }
}
