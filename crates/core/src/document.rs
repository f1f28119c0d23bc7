use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::language::{language_for_file_name, Language};
use crate::statistics::{compute_statistics, TextStatistics};

const UNTITLED: &str = "untitled.txt";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 表示文件目前使用的行尾樣式。 / Represents the line ending style used when the document is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
    Cr,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }
}

/// 新文件範本。 / Starter templates offered when creating a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Html,
    Css,
    JavaScript,
    Python,
    Markdown,
    Text,
}

impl Template {
    pub const ALL: [Template; 6] = [
        Template::Html,
        Template::Css,
        Template::JavaScript,
        Template::Python,
        Template::Markdown,
        Template::Text,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            Template::Html => "html",
            Template::Css => "css",
            Template::JavaScript => "js",
            Template::Python => "py",
            Template::Markdown => "md",
            Template::Text => "txt",
        }
    }

    pub fn content(self) -> &'static str {
        match self {
            Template::Html => "<!DOCTYPE html>\n<html>\n<head>\n  <title>New Document</title>\n</head>\n<body>\n\n</body>\n</html>",
            Template::Css => "/* Styles go here */\n",
            Template::JavaScript => "// JavaScript code\n",
            Template::Python => "# Python script\n",
            Template::Markdown => "# New Document\n\n",
            Template::Text => "",
        }
    }
}

/// 文件載入或儲存時可能發生的錯誤。 / Errors that can occur while loading or saving a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("file is not valid UTF-8 text")]
    InvalidEncoding,
    #[error("document has no associated path")]
    NoPath,
}

/// 記憶體中的文字文件。 / In-memory text document backed by an optional UTF-8 file.
#[derive(Debug, Clone)]
pub struct Document {
    path: Option<PathBuf>,
    file_name: String,
    contents: String,
    line_ending: LineEnding,
    has_bom: bool,
    is_dirty: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// 建立一個空內容且尚未儲存的文件。 / Creates an unsaved, empty `untitled.txt` document.
    pub fn new() -> Self {
        Self {
            path: None,
            file_name: UNTITLED.to_string(),
            contents: String::new(),
            line_ending: LineEnding::Lf,
            has_bom: false,
            is_dirty: false,
        }
    }

    /// 以範本建立新文件。 / Creates an unsaved `new.<ext>` document pre-filled from a template.
    pub fn from_template(template: Template) -> Self {
        Self {
            file_name: format!("new.{}", template.extension()),
            contents: template.content().to_string(),
            ..Self::new()
        }
    }

    /// 從磁碟載入文件並將行尾正規化為 `\n`。 / Loads a UTF-8 document, normalising newlines to `\n` internally.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let (payload, has_bom) = match bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => (rest, true),
            None => (bytes.as_slice(), false),
        };
        let text = std::str::from_utf8(payload).map_err(|_| DocumentError::InvalidEncoding)?;
        debug!(path = %path.display(), bytes = bytes.len(), "document opened");

        Ok(Self {
            path: Some(path.to_path_buf()),
            file_name: file_name_of(path),
            contents: normalize_newlines(text),
            line_ending: detect_line_ending(text),
            has_bom,
            is_dirty: false,
        })
    }

    /// 將文件儲存至現有路徑。 / Saves to the current path; fails with [`DocumentError::NoPath`] for untitled documents.
    pub fn save(&mut self) -> Result<(), DocumentError> {
        let path = self.path.clone().ok_or(DocumentError::NoPath)?;
        self.save_as(path)
    }

    /// 將文件另存為新路徑。 / Saves to `path` and adopts it as the document's location.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let encoded = self.serialise_contents();

        // 先寫入暫存檔再重新命名。 / Write a sibling temp file, then rename over the target.
        let tmp_path = path.with_extension("tmp_inkpad");
        {
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(&encoded)?;
            tmp_file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        debug!(path = %path.display(), bytes = encoded.len(), "document saved");

        self.path = Some(path.to_path_buf());
        self.file_name = file_name_of(path);
        self.is_dirty = false;
        Ok(())
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// 以新文字取代內容並標記為已修改。 / Replaces the contents and marks the document dirty.
    pub fn set_contents(&mut self, text: impl Into<String>) {
        self.contents = normalize_newlines(&text.into());
        self.is_dirty = true;
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn language(&self) -> Language {
        language_for_file_name(&self.file_name)
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn set_line_ending(&mut self, ending: LineEnding) {
        if self.line_ending != ending {
            self.line_ending = ending;
            self.is_dirty = true;
        }
    }

    pub fn has_bom(&self) -> bool {
        self.has_bom
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn statistics(&self) -> TextStatistics {
        compute_statistics(&self.contents)
    }

    fn serialise_contents(&self) -> Vec<u8> {
        let text = self.contents.replace('\n', self.line_ending.as_str());
        let mut bytes = Vec::with_capacity(text.len() + UTF8_BOM.len());
        if self.has_bom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(text.as_bytes());
        bytes
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// 以第一個換行記號推斷行尾。 / Infers the line ending from the first newline sequence in `text`.
fn detect_line_ending(text: &str) -> LineEnding {
    match text.find(|c: char| c == '\r' || c == '\n') {
        Some(idx) if text[idx..].starts_with("\r\n") => LineEnding::CrLf,
        Some(idx) if text[idx..].starts_with('\r') => LineEnding::Cr,
        _ => LineEnding::Lf,
    }
}

fn normalize_newlines(input: &str) -> String {
    if !input.contains('\r') {
        return input.to_string();
    }
    input.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_is_untitled_plain_text() {
        let doc = Document::new();
        assert_eq!(doc.file_name(), "untitled.txt");
        assert_eq!(doc.language(), Language::PlainText);
        assert!(doc.path().is_none());
        assert!(!doc.is_dirty());
    }

    #[test]
    fn templates_seed_name_and_content() {
        let doc = Document::from_template(Template::Python);
        assert_eq!(doc.file_name(), "new.py");
        assert_eq!(doc.contents(), "# Python script\n");
        assert_eq!(doc.language(), Language::Python);
        assert!(!doc.is_dirty());

        for template in Template::ALL {
            let doc = Document::from_template(template);
            assert!(doc.file_name().ends_with(template.extension()));
        }
    }

    #[test]
    fn open_detects_line_endings_and_normalises_content() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("sample.md");
        fs::write(&file_path, b"line1\r\nline2\r\n").unwrap();

        let doc = Document::open(&file_path).unwrap();
        assert_eq!(doc.contents(), "line1\nline2\n");
        assert_eq!(doc.line_ending(), LineEnding::CrLf);
        assert_eq!(doc.file_name(), "sample.md");
        assert_eq!(doc.language(), Language::Markdown);
        assert!(!doc.has_bom());
        assert!(!doc.is_dirty());
    }

    #[test]
    fn open_handles_utf8_bom() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("bom.txt");
        fs::write(&file_path, b"\xEF\xBB\xBFhello\rworld").unwrap();

        let doc = Document::open(&file_path).unwrap();
        assert_eq!(doc.contents(), "hello\nworld");
        assert_eq!(doc.line_ending(), LineEnding::Cr);
        assert!(doc.has_bom());
    }

    #[test]
    fn open_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("binary.bin");
        fs::write(&file_path, [0xFF, 0xFE, 0xFD, 0x00, 0xC3]).unwrap();

        let err = Document::open(&file_path).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidEncoding));
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::open(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, DocumentError::Io(_)));
    }

    #[test]
    fn save_preserves_line_endings_and_bom() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("roundtrip.txt");
        fs::write(&file_path, b"\xEF\xBB\xBFa\r\nb").unwrap();

        let mut doc = Document::open(&file_path).unwrap();
        doc.set_contents("a\nb\nc");
        assert!(doc.is_dirty());
        doc.save().unwrap();
        assert!(!doc.is_dirty());

        let bytes = fs::read(&file_path).unwrap();
        assert_eq!(bytes, b"\xEF\xBB\xBFa\r\nb\r\nc");
    }

    #[test]
    fn untitled_save_requires_a_path() {
        let mut doc = Document::new();
        doc.set_contents("draft");
        assert!(matches!(doc.save(), Err(DocumentError::NoPath)));

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("draft.js");
        doc.save_as(&target).unwrap();
        assert_eq!(doc.file_name(), "draft.js");
        assert_eq!(doc.language(), Language::JavaScript);
        assert_eq!(fs::read_to_string(&target).unwrap(), "draft");
    }

    #[test]
    fn statistics_reflect_contents() {
        let mut doc = Document::new();
        doc.set_contents("one two\r\nthree");
        let stats = doc.statistics();
        assert_eq!(stats.words, 3);
        assert_eq!(stats.lines, 2);
    }
}
