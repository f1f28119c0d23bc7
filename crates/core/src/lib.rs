pub mod document;
pub mod editor;
pub mod language;
pub mod search_controller;
pub mod statistics;
pub mod transform;

pub use document::{Document, DocumentError, LineEnding, Template};
pub use editor::{EditorSurface, NativeFind, Selection, TextBuffer};
pub use language::{language_for_file_name, Language};
pub use search_controller::{MatchOption, SearchController, UnknownOption};
pub use statistics::{
    compute_statistics, count_words, cursor_position, CursorPosition, TextStatistics,
};
pub use transform::{
    capitalize, compose, format_text, lowercase, pipe, text_transformer, uppercase, Transform,
};
