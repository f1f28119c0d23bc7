use std::fmt;

/// 依副檔名判斷的語言。 / Language mode inferred from a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    TypeScript,
    Html,
    Css,
    Json,
    Markdown,
    Python,
    PlainText,
}

impl Language {
    /// Identifier used by the editor widget's language modes.
    pub fn id(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Html => "html",
            Language::Css => "css",
            Language::Json => "json",
            Language::Markdown => "markdown",
            Language::Python => "python",
            Language::PlainText => "plaintext",
        }
    }

    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "js" | "jsx" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "html" => Language::Html,
            "css" => Language::Css,
            "json" => Language::Json,
            "md" => Language::Markdown,
            "py" => Language::Python,
            _ => Language::PlainText,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// 依檔名推斷語言。 / Maps a file name to its language; unknown or missing extensions are plain text.
///
/// The extension is whatever follows the last `.`, so dotfiles such as `.js`
/// count as having one.
pub fn language_for_file_name(name: &str) -> Language {
    name.rsplit_once('.')
        .map_or(Language::PlainText, |(_, ext)| Language::from_extension(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_languages() {
        assert_eq!(language_for_file_name("app.jsx"), Language::JavaScript);
        assert_eq!(language_for_file_name("types.d.ts"), Language::TypeScript);
        assert_eq!(language_for_file_name("README.MD"), Language::Markdown);
        assert_eq!(language_for_file_name("main.py"), Language::Python);
        assert_eq!(language_for_file_name("index.html").id(), "html");
    }

    #[test]
    fn unknown_or_missing_extensions_are_plain_text() {
        assert_eq!(language_for_file_name("notes.txt"), Language::PlainText);
        assert_eq!(language_for_file_name("Makefile"), Language::PlainText);
        assert_eq!(language_for_file_name("archive.tar.gz"), Language::PlainText);
        assert_eq!(language_for_file_name(""), Language::PlainText);
        assert_eq!(language_for_file_name("trailing."), Language::PlainText);
    }

    #[test]
    fn dotfiles_use_the_text_after_the_dot() {
        assert_eq!(language_for_file_name(".js"), Language::JavaScript);
        assert_eq!(language_for_file_name(".md"), Language::Markdown);
        assert_eq!(language_for_file_name(".gitignore"), Language::PlainText);
    }
}
