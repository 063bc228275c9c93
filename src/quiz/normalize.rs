//! Text cleanup applied to every stem and option before it reaches a quiz.
//!
//! PDF text extraction leaves line-wrap whitespace, page headers and stray
//! symbols behind. Normalization collapses whitespace, drops "Page 12" /
//! "Section B" artifacts and keeps only alphanumerics, whitespace and a fixed
//! set of punctuation that legitimately appears in exam questions.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref PAGE_ARTIFACT: Regex = Regex::new(r"(?i)\bpage\s*\d+").unwrap();
    static ref SECTION_ARTIFACT: Regex = Regex::new(r"(?i)\bsection\s+[a-z]\b").unwrap();
}

/// Punctuation that survives normalization. Everything else that is not
/// alphanumeric or whitespace is stripped.
const ALLOWED_PUNCTUATION: [char; 10] = [',', '.', '\'', '\u{2019}', '-', '+', '/', '*', '=', '\u{00B0}'];

/// Returns the cleaned form of `text`. Never fails; empty input gives an
/// empty string. Normalization is idempotent.
pub fn normalize(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    let no_pages = PAGE_ARTIFACT.replace_all(&collapsed, "");
    let no_sections = SECTION_ARTIFACT.replace_all(&no_pages, "");
    let allowed: String = no_sections
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || ALLOWED_PUNCTUATION.contains(c))
        .collect();
    // Removals can leave doubled spaces behind, so collapse once more.
    WHITESPACE.replace_all(&allowed, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize("What  is\n\n2+2"), "What is 2+2");
    }

    #[test]
    fn removes_page_and_section_artifacts() {
        assert_eq!(normalize("First question Page 12 continued"), "First question continued");
        assert_eq!(normalize("Intro SECTION B text"), "Intro text");
    }

    #[test]
    fn strips_characters_outside_the_allow_list() {
        assert_eq!(normalize("Q1: What's 2+2?? (Page 3)"), "Q1 What's 2+2");
    }

    #[test]
    fn keeps_allowed_punctuation() {
        assert_eq!(normalize("a, b. c' d\u{2019} e-f g+h i/j k*l m=n 90\u{00B0}"), "a, b. c' d\u{2019} e-f g+h i/j k*l m=n 90\u{00B0}");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
    }

    #[test]
    fn is_idempotent() {
        let once = normalize("  1.  What's   the    boiling point?? (Page 7) ");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn does_not_eat_words_containing_page_or_section() {
        assert_eq!(normalize("rampage 3 sectional sofa"), "rampage 3 sectional sofa");
    }
}
