//! Rich-text editing substrate for the comment composer.
//!
//! # Architecture
//!
//! - [`Document`]: ordered text runs (plain, link, mention, line terminators)
//! - [`EditOperation`]: retain/insert/delete change description
//! - [`EditorSurface`]: the host editor interface the mention core consumes
//! - [`RichTextBuffer`]: in-process surface with selection and undo history
//! - [`TextEditMsg`]: keystroke-level messages
//!
//! # Example
//!
//! ```ignore
//! use mention_editor::editable::{ChangeSource, EditorSurface, RichTextBuffer, RunAttributes};
//!
//! let mut buffer = RichTextBuffer::from_text("hello");
//! buffer.insert_text(5, "!", RunAttributes::plain(), ChangeSource::User);
//!
//! assert_eq!(buffer.text(), "hello!");
//! ```

mod buffer;
mod document;
mod history;
mod messages;
mod operation;
mod selection;

pub use buffer::{ChangeEvent, ChangeSource, EditorSurface, RichTextBuffer};
pub use document::{Document, Line, LineFormat, MentionSpan, RunAttributes, TextRun};
pub use history::{EditHistory, HistoryEntry};
pub use messages::{MoveTarget, TextEditMsg};
pub use operation::{ChangePoint, EditOperation, OpStep};
pub use selection::SelectionRange;
