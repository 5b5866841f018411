//! Utility modules

pub mod text;

pub use text::{char_len, is_mention_boundary};
