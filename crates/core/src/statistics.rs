/// 文字統計結果。 / Counts derived from a text snapshot.
///
/// Characters are Unicode scalar values, so a character outside the Basic
/// Multilingual Plane (an emoji, for instance) counts as 1, not 2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStatistics {
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub words: usize,
    pub lines: usize,
    pub paragraphs: usize,
}

/// 游標所在的行與欄（皆從 1 起算）。 / One-based line and column of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
}

/// 計算文字統計。 / Computes character, word, line and paragraph counts for `text`.
///
/// An empty text reports a single (empty) line and zero for every other count.
pub fn compute_statistics(text: &str) -> TextStatistics {
    let mut stats = TextStatistics {
        characters: 0,
        characters_no_spaces: 0,
        words: 0,
        lines: 0,
        paragraphs: 0,
    };
    for ch in text.chars() {
        stats.characters += 1;
        if !ch.is_whitespace() {
            stats.characters_no_spaces += 1;
        }
    }

    let mut previous_blank = true;
    for line in text.split('\n') {
        stats.lines += 1;
        let blank = line.trim().is_empty();
        if !blank && previous_blank {
            stats.paragraphs += 1;
        }
        previous_blank = blank;
    }
    stats.words = count_words(text);
    stats
}

/// 計算字數。 / Counts whitespace-delimited words, line by line.
pub fn count_words(text: &str) -> usize {
    text.split('\n').fold(0, |count, line| count + words_in_line(line))
}

fn words_in_line(line: &str) -> usize {
    line.split_whitespace().count()
}

/// 將字元位移轉換為行與欄。 / Converts a char offset into a one-based line/column pair.
///
/// Offsets beyond the end of `text` resolve to the position just past the last char.
pub fn cursor_position(text: &str, offset: usize) -> CursorPosition {
    let mut line = 1;
    let mut column = 1;
    for ch in text.chars().take(offset) {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    CursorPosition { line, column }
}
