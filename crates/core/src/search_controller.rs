use std::ops::Range;
use std::str::FromStr;

use inkpad_search::{
    replace_all_counted, MatchOptions, Occurrence, SearchDirection, SearchError, SearchPattern,
};
use inkpad_settings::{EditorSettings, SettingsProvider};
use thiserror::Error;
use tracing::{debug, warn};

use crate::editor::{byte_offset, EditorSurface, NativeFind};

/// 搜尋選項名稱。 / Names of the toggles exposed by the search bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOption {
    CaseSensitive,
    WholeWord,
    UseRegex,
}

/// Raised when a caller names a search option that does not exist.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown search option: {0}")]
pub struct UnknownOption(pub String);

impl FromStr for MatchOption {
    type Err = UnknownOption;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "caseSensitive" | "case_sensitive" => Ok(Self::CaseSensitive),
            "wholeWord" | "whole_word" | "matchWholeWord" => Ok(Self::WholeWord),
            "useRegex" | "use_regex" | "isRegex" => Ok(Self::UseRegex),
            other => Err(UnknownOption(other.to_string())),
        }
    }
}

/// 搜尋列的狀態與操作。 / Holds the search bar state and drives matching against an editor surface.
///
/// Every operation takes the surface as `Option`: a surface that is not
/// mounted yet turns the call into a no-op. Setters only affect later calls.
#[derive(Debug, Clone)]
pub struct SearchController {
    search_term: String,
    replace_term: String,
    options: MatchOptions,
    default_options: MatchOptions,
    show_replace: bool,
}

impl SearchController {
    /// 以設定值建立控制器。 / Creates a controller seeded from persisted settings.
    pub fn new(settings: &dyn SettingsProvider) -> Self {
        let resolved = EditorSettings::from_provider(settings);
        let default_options = MatchOptions::default().case_sensitive(resolved.case_sensitive);
        Self {
            search_term: String::new(),
            replace_term: String::new(),
            options: default_options,
            default_options,
            show_replace: false,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn replace_term(&self) -> &str {
        &self.replace_term
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn is_replace_visible(&self) -> bool {
        self.show_replace
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn set_replace_term(&mut self, term: impl Into<String>) {
        self.replace_term = term.into();
    }

    pub fn set_option(&mut self, option: MatchOption, value: bool) {
        match option {
            MatchOption::CaseSensitive => self.options.case_sensitive = value,
            MatchOption::WholeWord => self.options.whole_word = value,
            MatchOption::UseRegex => self.options.use_regex = value,
        }
    }

    /// Sets an option by its search-bar name, rejecting unknown names.
    pub fn set_option_by_name(&mut self, name: &str, value: bool) -> Result<(), UnknownOption> {
        let option = name.parse::<MatchOption>().inspect_err(|err| {
            warn!(%err, "ignoring search option");
        })?;
        self.set_option(option, value);
        Ok(())
    }

    pub fn set_replace_visible(&mut self, visible: bool) {
        self.show_replace = visible;
    }

    pub fn toggle_replace(&mut self) -> bool {
        self.show_replace = !self.show_replace;
        self.show_replace
    }

    /// 清除搜尋狀態。 / Clears both terms and restores the construction-time options.
    pub fn reset(&mut self) {
        self.search_term.clear();
        self.replace_term.clear();
        self.options = self.default_options;
        self.show_replace = false;
    }

    /// Lists every occurrence of the search term in the surface's current text.
    pub fn occurrences(
        &self,
        editor: Option<&dyn EditorSurface>,
    ) -> Result<Vec<Occurrence>, SearchError> {
        let Some(editor) = editor else {
            return Ok(Vec::new());
        };
        if self.search_term.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = self.compile()?;
        Ok(pattern.occurrences(&editor.value()))
    }

    /// 選取下一個符合項目。 / Selects the next occurrence after the cursor, wrapping at the end.
    pub fn find_next(
        &self,
        editor: Option<&mut dyn EditorSurface>,
    ) -> Result<Option<Range<usize>>, SearchError> {
        match editor {
            Some(editor) => self.advance(editor, SearchDirection::Forward),
            None => Ok(None),
        }
    }

    /// 選取上一個符合項目。 / Selects the occurrence before the selection, wrapping at the start.
    pub fn find_previous(
        &self,
        editor: Option<&mut dyn EditorSurface>,
    ) -> Result<Option<Range<usize>>, SearchError> {
        match editor {
            Some(editor) => self.advance(editor, SearchDirection::Backward),
            None => Ok(None),
        }
    }

    fn advance(
        &self,
        editor: &mut dyn EditorSurface,
        direction: SearchDirection,
    ) -> Result<Option<Range<usize>>, SearchError> {
        if self.search_term.is_empty() {
            return Ok(None);
        }
        if let NativeFind::Handled(range) =
            editor.find_native(&self.search_term, &self.options, direction)
        {
            return Ok(range);
        }

        let occurrences = self.compile()?.occurrences(&editor.value());
        let target = match direction {
            SearchDirection::Forward => {
                let anchor = editor.cursor_offset();
                occurrences
                    .iter()
                    .find(|occurrence| occurrence.index >= anchor)
                    .or_else(|| occurrences.first())
            }
            SearchDirection::Backward => {
                let anchor = editor
                    .selection()
                    .map_or_else(|| editor.cursor_offset(), |range| range.start);
                occurrences
                    .iter()
                    .rev()
                    .find(|occurrence| occurrence.end() <= anchor)
                    .or_else(|| occurrences.last())
            }
        };
        let Some(target) = target else {
            debug!(term = %self.search_term, "no occurrences");
            return Ok(None);
        };
        let range = target.range();
        editor.set_selection(range.clone());
        Ok(Some(range))
    }

    /// 取代目前選取的符合項目。 / Replaces the selection when it matches the search term, then moves on.
    ///
    /// The selected span must be matched in full by the pattern under the active
    /// options, with the surrounding text taken into account for word boundaries.
    /// Returns `false` without touching the document when it is not.
    pub fn replace_current(
        &self,
        editor: Option<&mut dyn EditorSurface>,
    ) -> Result<bool, SearchError> {
        let Some(editor) = editor else {
            return Ok(false);
        };
        if self.search_term.is_empty() {
            return Ok(false);
        }
        let Some(selection) = editor.selection() else {
            return Ok(false);
        };

        let pattern = self.compile()?;
        let text = editor.value();
        let span = byte_offset(&text, selection.start)..byte_offset(&text, selection.end);
        let Some(replacement) = pattern.replacement_at(&text, span, &self.replace_term) else {
            return Ok(false);
        };

        debug!(at = selection.start, "replacing current occurrence");
        editor.replace_range(selection, &replacement);
        self.advance(editor, SearchDirection::Forward)?;
        Ok(true)
    }

    /// 全部取代。 / Replaces every occurrence with a single document update.
    ///
    /// Returns the number of replacements. The document is left untouched when
    /// nothing matched or the pattern does not compile.
    pub fn replace_all_in_document(
        &self,
        editor: Option<&mut dyn EditorSurface>,
    ) -> Result<usize, SearchError> {
        let Some(editor) = editor else {
            return Ok(0);
        };
        if self.search_term.is_empty() {
            return Ok(0);
        }
        let text = editor.value();
        let outcome =
            replace_all_counted(&text, &self.search_term, &self.replace_term, &self.options)
                .inspect_err(|err| warn!(%err, "replace all aborted"))?;
        if outcome.replacements > 0 && outcome.text != text {
            editor.set_value(&outcome.text);
        }
        debug!(replacements = outcome.replacements, "replace all finished");
        Ok(outcome.replacements)
    }

    fn compile(&self) -> Result<SearchPattern, SearchError> {
        SearchPattern::new(&self.search_term, &self.options)
            .inspect_err(|err| warn!(%err, term = %self.search_term, "search pattern rejected"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::TextBuffer;
    use inkpad_settings::{DefaultSettings, MapSettings, CASE_SENSITIVE_KEY};

    fn controller(term: &str) -> SearchController {
        let mut controller = SearchController::new(&DefaultSettings);
        controller.set_search_term(term);
        controller
    }

    #[test]
    fn case_sensitivity_default_comes_from_settings() {
        let settings = MapSettings::new().with(CASE_SENSITIVE_KEY, "true");
        let controller = SearchController::new(&settings);
        assert!(controller.options().case_sensitive);

        let controller = SearchController::new(&DefaultSettings);
        assert!(!controller.options().case_sensitive);
    }

    #[test]
    fn find_next_and_previous_wrap() {
        let mut buffer = TextBuffer::new("alpha beta gamma beta");
        let session = controller("beta");

        assert_eq!(session.find_next(Some(&mut buffer)).unwrap(), Some(6..10));
        assert_eq!(session.find_next(Some(&mut buffer)).unwrap(), Some(17..21));
        // Wrap-around to first hit.
        assert_eq!(session.find_next(Some(&mut buffer)).unwrap(), Some(6..10));
        // Backwards wrap to last hit.
        assert_eq!(session.find_previous(Some(&mut buffer)).unwrap(), Some(17..21));
        assert_eq!(session.find_previous(Some(&mut buffer)).unwrap(), Some(6..10));
        assert_eq!(buffer.selected_text(), Some("beta"));
    }

    #[test]
    fn find_next_starts_from_cursor() {
        let mut buffer = TextBuffer::new("x x x");
        buffer.set_cursor(3);
        let session = controller("x");
        assert_eq!(session.find_next(Some(&mut buffer)).unwrap(), Some(4..5));
    }

    #[test]
    fn missing_editor_is_a_no_op() {
        let session = controller("beta");
        assert_eq!(session.find_next(None).unwrap(), None);
        assert_eq!(session.find_previous(None).unwrap(), None);
        assert!(!session.replace_current(None).unwrap());
        assert_eq!(session.replace_all_in_document(None).unwrap(), 0);
        assert!(session.occurrences(None).unwrap().is_empty());
    }

    #[test]
    fn empty_term_is_a_no_op() {
        let mut buffer = TextBuffer::new("abc");
        let session = controller("");
        assert_eq!(session.find_next(Some(&mut buffer)).unwrap(), None);
        assert_eq!(session.replace_all_in_document(Some(&mut buffer)).unwrap(), 0);
        assert_eq!(buffer.undo_depth(), 0);
    }

    #[test]
    fn replace_current_replaces_and_advances() {
        let mut buffer = TextBuffer::new("foo bar foo");
        let mut session = controller("foo");
        session.set_replace_term("baz");
        session.find_next(Some(&mut buffer)).unwrap();

        assert!(session.replace_current(Some(&mut buffer)).unwrap());
        assert_eq!(buffer.contents(), "baz bar foo");
        assert_eq!(buffer.selection(), Some(8..11));
    }

    #[test]
    fn replace_current_ignores_non_matching_selection() {
        let mut buffer = TextBuffer::new("foo bar foo");
        let mut session = controller("foo");
        session.set_replace_term("baz");
        buffer.set_selection(4..7);

        assert!(!session.replace_current(Some(&mut buffer)).unwrap());
        assert_eq!(buffer.contents(), "foo bar foo");
        assert_eq!(buffer.undo_depth(), 0);

        buffer.set_cursor(0);
        assert!(!session.replace_current(Some(&mut buffer)).unwrap());
    }

    #[test]
    fn replace_current_respects_case_sensitivity() {
        let mut buffer = TextBuffer::new("Foo foo");
        let mut session = controller("foo");
        session.set_option(MatchOption::CaseSensitive, true);
        session.set_replace_term("x");
        buffer.set_selection(0..3);
        assert!(!session.replace_current(Some(&mut buffer)).unwrap());

        session.set_option(MatchOption::CaseSensitive, false);
        assert!(session.replace_current(Some(&mut buffer)).unwrap());
        assert_eq!(buffer.contents(), "x foo");
    }

    #[test]
    fn replace_current_accepts_selection_overlapping_scan_matches() {
        let mut buffer = TextBuffer::new("aaa");
        let mut session = controller("aa");
        session.set_replace_term("X");
        buffer.set_selection(1..3);

        assert!(session.replace_current(Some(&mut buffer)).unwrap());
        assert_eq!(buffer.contents(), "aXa");
    }

    #[test]
    fn replace_current_checks_word_boundaries_around_selection() {
        let mut buffer = TextBuffer::new("food foo");
        let mut session = controller("foo");
        session.set_option(MatchOption::WholeWord, true);
        session.set_replace_term("bar");
        buffer.set_selection(0..3);
        assert!(!session.replace_current(Some(&mut buffer)).unwrap());

        buffer.set_selection(5..8);
        assert!(session.replace_current(Some(&mut buffer)).unwrap());
        assert_eq!(buffer.contents(), "food bar");
    }

    #[test]
    fn replace_current_handles_multibyte_text() {
        let mut buffer = TextBuffer::new("héllo wörld wörld");
        let mut session = controller("wörld");
        session.set_replace_term("world");
        buffer.set_selection(12..17);

        assert!(session.replace_current(Some(&mut buffer)).unwrap());
        assert_eq!(buffer.contents(), "héllo wörld world");
    }

    #[test]
    fn replace_current_expands_regex_groups() {
        let mut buffer = TextBuffer::new("key=value");
        let mut session = controller(r"(\w+)=(\w+)");
        session.set_option(MatchOption::UseRegex, true);
        session.set_replace_term("$2=$1");
        session.find_next(Some(&mut buffer)).unwrap();

        assert!(session.replace_current(Some(&mut buffer)).unwrap());
        assert_eq!(buffer.contents(), "value=key");
    }

    #[test]
    fn replace_all_is_a_single_edit() {
        let mut buffer = TextBuffer::new("one two two three two");
        let mut session = controller("two");
        session.set_replace_term("2");

        assert_eq!(session.replace_all_in_document(Some(&mut buffer)).unwrap(), 3);
        assert_eq!(buffer.contents(), "one 2 2 three 2");
        assert_eq!(buffer.undo_depth(), 1);
        assert!(buffer.undo());
        assert_eq!(buffer.contents(), "one two two three two");
    }

    #[test]
    fn invalid_regex_leaves_document_unchanged() {
        let mut buffer = TextBuffer::new("a[b");
        let mut session = controller("[");
        session.set_option(MatchOption::UseRegex, true);
        session.set_replace_term("x");

        let err = session.replace_all_in_document(Some(&mut buffer)).unwrap_err();
        assert!(matches!(err, SearchError::InvalidPattern(_)));
        assert!(session.find_next(Some(&mut buffer)).is_err());
        assert_eq!(buffer.contents(), "a[b");
        assert_eq!(buffer.undo_depth(), 0);
    }

    #[test]
    fn options_apply_to_the_next_call_only() {
        let mut buffer = TextBuffer::new("Cat cat");
        let mut session = controller("cat");
        assert_eq!(session.occurrences(Some(&buffer)).unwrap().len(), 2);

        session.set_option(MatchOption::CaseSensitive, true);
        assert_eq!(session.occurrences(Some(&buffer)).unwrap().len(), 1);
        assert_eq!(session.find_next(Some(&mut buffer)).unwrap(), Some(4..7));
    }

    #[test]
    fn options_by_name_reject_unknown_names() {
        let mut session = controller("x");
        session.set_option_by_name("wholeWord", true).unwrap();
        assert!(session.options().whole_word);
        let err = session.set_option_by_name("dotAll", true).unwrap_err();
        assert_eq!(err, UnknownOption("dotAll".to_string()));
    }

    #[test]
    fn reset_restores_defaults() {
        let settings = MapSettings::new().with(CASE_SENSITIVE_KEY, "true");
        let mut session = SearchController::new(&settings);
        session.set_search_term("a");
        session.set_replace_term("b");
        session.set_option(MatchOption::CaseSensitive, false);
        session.set_option(MatchOption::UseRegex, true);
        assert!(session.toggle_replace());

        session.reset();
        assert_eq!(session.search_term(), "");
        assert_eq!(session.replace_term(), "");
        assert!(session.options().case_sensitive);
        assert!(!session.options().use_regex);
        assert!(!session.is_replace_visible());
    }

    struct NativeSurface {
        inner: TextBuffer,
        calls: usize,
    }

    impl EditorSurface for NativeSurface {
        fn value(&self) -> String {
            self.inner.value()
        }
        fn set_value(&mut self, text: &str) {
            self.inner.set_value(text)
        }
        fn selection(&self) -> Option<Range<usize>> {
            self.inner.selection()
        }
        fn set_selection(&mut self, range: Range<usize>) {
            self.inner.set_selection(range)
        }
        fn replace_range(&mut self, range: Range<usize>, text: &str) {
            self.inner.replace_range(range, text)
        }
        fn cursor_offset(&self) -> usize {
            self.inner.cursor_offset()
        }
        fn find_native(
            &mut self,
            _term: &str,
            _options: &MatchOptions,
            _direction: SearchDirection,
        ) -> NativeFind {
            self.calls += 1;
            NativeFind::Handled(Some(0..1))
        }
    }

    #[test]
    fn native_find_takes_precedence() {
        let mut surface = NativeSurface {
            inner: TextBuffer::new("abc abc"),
            calls: 0,
        };
        let session = controller("abc");
        assert_eq!(session.find_next(Some(&mut surface)).unwrap(), Some(0..1));
        assert_eq!(surface.calls, 1);
        assert_eq!(surface.inner.selection(), None);
    }
}
