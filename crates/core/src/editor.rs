use std::ops::Range;

use inkpad_search::{MatchOptions, SearchDirection};

/// 原生尋找的結果。 / Outcome of asking an editor surface to run its own find.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeFind {
    /// The surface has no built-in find; callers fall back to their own matching.
    Unsupported,
    /// The surface handled the request and selected the given char range, if any.
    Handled(Option<Range<usize>>),
}

/// 外部編輯元件的存取介面。 / Access to a text buffer owned by an editing widget.
///
/// Every offset is a char offset from the start of the buffer. Each mutating
/// call counts as one undoable edit from the user's perspective.
pub trait EditorSurface {
    fn value(&self) -> String;

    fn set_value(&mut self, text: &str);

    /// Current non-empty selection, if any.
    fn selection(&self) -> Option<Range<usize>>;

    fn set_selection(&mut self, range: Range<usize>);

    fn replace_range(&mut self, range: Range<usize>, text: &str);

    fn cursor_offset(&self) -> usize;

    fn find_native(
        &mut self,
        _term: &str,
        _options: &MatchOptions,
        _direction: SearchDirection,
    ) -> NativeFind {
        NativeFind::Unsupported
    }
}

/// 定義一段已排序（start <= end）的文字範圍。 / Represents an ordered selection range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    start: usize,
    end: usize,
}

impl Selection {
    /// 建立新的選取範圍，會自動將 start/end 排序。 / Creates a selection with automatically ordered bounds.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn clamp(&mut self, len: usize) {
        self.start = self.start.min(len);
        self.end = self.end.min(len);
    }
}

/// 記憶體中的文字緩衝區，附帶復原紀錄。 / In-memory editor surface with a linear undo history.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    contents: String,
    char_len: usize,
    cursor: usize,
    selection: Option<Selection>,
    history: Vec<String>,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let contents = text.into();
        let char_len = contents.chars().count();
        Self {
            contents,
            char_len,
            cursor: 0,
            selection: None,
            history: Vec::new(),
        }
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// 取得選取的文字。 / Returns the selected text, if a selection is active.
    pub fn selected_text(&self) -> Option<&str> {
        let selection = self.selection.as_ref()?;
        let start = byte_offset(&self.contents, selection.start);
        let end = byte_offset(&self.contents, selection.end);
        Some(&self.contents[start..end])
    }

    /// 移動游標並清除選取。 / Moves the cursor, clearing any selection.
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.char_len);
        self.selection = None;
    }

    /// Number of edits that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// 復原上一個編輯。 / Reverts the most recent edit; returns `false` when nothing is left to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.pop() else {
            return false;
        };
        self.replace_contents(previous);
        self.cursor = self.cursor.min(self.char_len);
        self.selection = None;
        true
    }

    fn record(&mut self) {
        self.history.push(self.contents.clone());
    }

    fn replace_contents(&mut self, text: String) {
        self.char_len = text.chars().count();
        self.contents = text;
    }
}

impl EditorSurface for TextBuffer {
    fn value(&self) -> String {
        self.contents.clone()
    }

    fn set_value(&mut self, text: &str) {
        self.record();
        self.replace_contents(text.to_string());
        self.cursor = 0;
        self.selection = None;
    }

    fn selection(&self) -> Option<Range<usize>> {
        self.selection
            .as_ref()
            .filter(|selection| !selection.is_empty())
            .map(|selection| selection.start..selection.end)
    }

    fn set_selection(&mut self, range: Range<usize>) {
        let mut selection = Selection::new(range.start, range.end);
        selection.clamp(self.char_len);
        self.cursor = selection.end;
        self.selection = (!selection.is_empty()).then_some(selection);
    }

    fn replace_range(&mut self, range: Range<usize>, text: &str) {
        let mut target = Selection::new(range.start, range.end);
        target.clamp(self.char_len);
        self.record();
        let start = byte_offset(&self.contents, target.start);
        let end = byte_offset(&self.contents, target.end);
        let mut updated = self.contents.clone();
        updated.replace_range(start..end, text);
        self.replace_contents(updated);
        self.cursor = target.start + text.chars().count();
        self.selection = None;
    }

    fn cursor_offset(&self) -> usize {
        self.cursor
    }
}

/// Byte index of the char at `char_offset`, or the text length when past the end.
pub(crate) fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(idx, _)| idx)
}
