//! MCQ block extraction from plain text recovered out of a PDF.
//!
//! The input is one undifferentiated run of text. Questions show up as
//! repeating blocks of the shape
//! `<number>. <stem> (a) <opt> (b) <opt> (c) <opt> (d) <opt>`,
//! each block ending where the next numbered block starts. Extraction is a
//! two-level scan rather than a backtracking regex: find the numbered block
//! starts first, then locate the four option markers inside each block in
//! their fixed a-d order. This is a heuristic; markers appearing inside a
//! stem or nested numbering can merge or split blocks, and that is accepted.

use crate::quiz::normalize::normalize;
use crate::quiz::Question;

/// Which of the two historical extraction policies to apply.
///
/// `Strict` requires all four markers in order and drops records with a
/// short stem or an empty option. `Lenient` keeps everything it can reach,
/// emitting marker-less blocks as questions with no options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Strict,
    Lenient,
}

/// A stem this short (in characters) cannot be a real question and is
/// dropped in strict mode.
const MIN_STEM_CHARS: usize = 10;

const OPTION_LETTERS: [char; 4] = ['a', 'b', 'c', 'd'];

/// Extracts every MCQ block from `text`, in document order. An input with
/// no blocks yields an empty vector; that is a normal outcome, not an error.
pub fn extract(text: &str, mode: Mode) -> Vec<Question> {
    let starts = block_starts(text);
    let mut questions = Vec::new();

    for (i, start) in starts.iter().enumerate() {
        let end = starts
            .get(i + 1)
            .map(|next| next.numbering)
            .unwrap_or(text.len());
        let body = &text[start.stem..end];

        if let Some(question) = scan_block(body, mode) {
            questions.push(question);
        }
    }

    questions
}

/// A numbered block start: the byte offset of the digit run and the offset
/// of the stem text behind the `.`/`)` and any following whitespace.
struct BlockStart {
    numbering: usize,
    stem: usize,
}

/// Finds every position where a run of digits is followed by `.` or `)`.
/// The digit run must not be the tail of a longer one, so `12.` is one
/// start, not two.
fn block_starts(text: &str) -> Vec<BlockStart> {
    let mut starts = Vec::new();
    let mut prev_was_digit = false;

    let mut iter = text.char_indices().peekable();
    while let Some((pos, ch)) = iter.next() {
        let is_digit = ch.is_ascii_digit();
        if is_digit && !prev_was_digit {
            // consume the rest of the digit run
            let mut after = pos + ch.len_utf8();
            while let Some(&(_, next)) = iter.peek() {
                if !next.is_ascii_digit() {
                    break;
                }
                after += next.len_utf8();
                iter.next();
            }
            if let Some(rest) = text[after..].strip_prefix(['.', ')']) {
                let stem = after + 1 + (rest.len() - rest.trim_start().len());
                starts.push(BlockStart {
                    numbering: pos,
                    stem,
                });
            }
            prev_was_digit = true;
        } else {
            prev_was_digit = is_digit;
        }
    }

    starts
}

/// Scans one block body (numbering already stripped) for the four option
/// markers and builds the record. Returns `None` when the block is skipped.
fn scan_block(body: &str, mode: Mode) -> Option<Question> {
    let mut markers = Vec::new();
    let mut from = 0;
    for letter in OPTION_LETTERS {
        match find_marker(body, from, letter) {
            Some(found) => {
                from = found.content;
                markers.push(found);
            }
            None => break,
        }
    }

    if markers.len() == OPTION_LETTERS.len() {
        let stem = normalize(&body[..markers[0].start]);
        let options: Vec<String> = markers
            .iter()
            .enumerate()
            .map(|(i, marker)| {
                let end = markers.get(i + 1).map(|next| next.start).unwrap_or(body.len());
                normalize(&body[marker.content..end])
            })
            .collect();

        if mode == Mode::Strict && !is_valid(&stem, &options) {
            return None;
        }
        return Some(Question::new(stem, options, None));
    }

    match mode {
        // Strict wants all four markers or nothing.
        Mode::Strict => None,
        Mode::Lenient => {
            let stem_end = markers.first().map(|m| m.start).unwrap_or(body.len());
            let stem = normalize(&body[..stem_end]);
            Some(Question::new(stem, Vec::new(), None))
        }
    }
}

fn is_valid(stem: &str, options: &[String]) -> bool {
    stem.chars().count() > MIN_STEM_CHARS && options.iter().all(|o| !o.is_empty())
}

/// Byte offsets of one located option marker within the block body.
struct Marker {
    /// Where the marker itself begins (`(` or the letter).
    start: usize,
    /// Where the option text after `)` begins.
    content: usize,
}

/// Finds the first `(x)` or `x)` marker for `letter` at or after `from`.
/// The bare `x)` form only counts when the letter does not continue a word,
/// so "America)" is not an `a)` marker.
fn find_marker(body: &str, from: usize, letter: char) -> Option<Marker> {
    let mut prev: Option<char> = if from == 0 {
        None
    } else {
        body[..from].chars().next_back()
    };

    for (offset, ch) in body[from..].char_indices() {
        let pos = from + offset;
        if ch == '(' {
            let mut rest = body[pos + 1..].chars();
            if rest.next().is_some_and(|l| l.eq_ignore_ascii_case(&letter))
                && rest.next() == Some(')')
            {
                return Some(Marker {
                    start: pos,
                    content: pos + 3,
                });
            }
        } else if ch.eq_ignore_ascii_case(&letter)
            && body[pos + ch.len_utf8()..].starts_with(')')
            && !prev.is_some_and(|p| p.is_alphanumeric())
        {
            return Some(Marker {
                start: pos,
                content: pos + ch.len_utf8() + 1,
            });
        }
        prev = Some(ch);
    }

    None
}
