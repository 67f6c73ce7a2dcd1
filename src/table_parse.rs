use std::sync::LazyLock;

use regex::Regex;

/// A tab or a run of two or more whitespace characters separates cells.
static CELL_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t|\s{2,}").expect("hardcoded cell gap regex is valid"));

const SENTENCE_ENDINGS: [char; 4] = ['.', '!', '?', '\u{061F}'];
const MAX_WORD_CELLS: usize = 6;

/// Trims a cell and collapses interior whitespace runs to single spaces.
pub(crate) fn clean_cell_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn gap_separated_cells(line: &str) -> Vec<String> {
    CELL_GAP
        .split(line.trim())
        .map(clean_cell_text)
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// Whether single-space words of a line can stand in for cells.
///
/// Sentences never qualify. Words without any digit only qualify on short lines.
fn words_as_cells(line: &str, words: &[&str], min_cells: usize) -> bool {
    if words.len() < min_cells || line.trim_end().ends_with(&SENTENCE_ENDINGS[..]) {
        return false;
    }
    words.len() <= MAX_WORD_CELLS || words.iter().any(|word| word.chars().any(char::is_numeric))
}

/// Cells of a text line.
///
/// Wide gaps are preferred; a line with fewer than `min_cells` gap-separated
/// cells falls back to its words when those look like a row of values.
pub(crate) fn line_cells(line: &str, min_cells: usize) -> Vec<String> {
    let cells = gap_separated_cells(line);
    if cells.len() >= min_cells {
        return cells;
    }

    let words = line.split_whitespace().collect::<Vec<_>>();
    if words_as_cells(line, &words, min_cells) {
        words.into_iter().map(str::to_string).collect()
    } else {
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::{clean_cell_text, line_cells};

    #[test]
    fn wide_gaps_and_tabs_separate_cells() {
        assert_eq!(line_cells("Alice  30  98", 2), vec!["Alice", "30", "98"]);
        assert_eq!(line_cells("A\tB\tC", 2), vec!["A", "B", "C"]);
    }

    #[test]
    fn single_spaces_stay_inside_cells() {
        let cells = line_cells("نام خانوادگی   شماره ملی", 2);
        assert_eq!(cells, vec!["نام خانوادگی", "شماره ملی"]);
    }

    #[test]
    fn short_lines_fall_back_to_words() {
        assert_eq!(line_cells("Name Age Score", 2), vec!["Name", "Age", "Score"]);
        assert_eq!(line_cells("کالا ۱۲ ۳۴ ۵۶ ۷۸ ۹۰ ۱۱", 2).len(), 7);
        assert_eq!(line_cells("one two three four five six seven", 2).len(), 1);
    }

    #[test]
    fn sentences_stay_whole() {
        assert_eq!(line_cells("This is a sentence.", 2).len(), 1);
        assert_eq!(line_cells("آیا این جمله است؟", 2).len(), 1);
    }

    #[test]
    fn blank_lines_have_no_cells() {
        assert!(line_cells("   ", 2).is_empty());
    }

    #[test]
    fn cleans_cell_whitespace() {
        assert_eq!(clean_cell_text("  a \n  b\t c  "), "a b c");
        assert_eq!(clean_cell_text("   "), "");
    }
}
