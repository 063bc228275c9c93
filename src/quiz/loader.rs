//! Structured quiz sources: JSON and CSV files, plus the built-in practice
//! set used when the user has no file at hand.
//!
//! JSON input is an array of `{question, options, answer}` objects with a
//! zero-based answer index. CSV input is one question per line,
//! `question,opt1,opt2,opt3,opt4,correctOneBased`, comma-delimited with no
//! quoting or escaping; the answer column is one-based and converted here.

use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::quiz::error::SourceError;
use crate::quiz::Question;

pub const OPTIONS_PER_QUESTION: usize = 4;

const CSV_FIELDS: usize = OPTIONS_PER_QUESTION + 2;

#[derive(Debug, Clone, serde::Deserialize)]
struct JsonQuestion {
    question: String,
    options: Vec<String>,
    answer: usize,
}

pub fn from_json(text: &str) -> Result<Vec<Question>, SourceError> {
    let raw: Vec<JsonQuestion> = serde_json::from_str(text)?;

    raw.into_iter()
        .enumerate()
        .map(|(index, q)| {
            if q.options.len() != OPTIONS_PER_QUESTION {
                return Err(SourceError::OptionCount {
                    index,
                    found: q.options.len(),
                });
            }
            if q.answer >= q.options.len() {
                return Err(SourceError::AnswerRange {
                    index,
                    answer: q.answer,
                });
            }
            Ok(Question::new(q.question, q.options, Some(q.answer)))
        })
        .collect()
}

pub fn from_csv(text: &str) -> Result<Vec<Question>, SourceError> {
    let mut questions = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != CSV_FIELDS {
            return Err(SourceError::CsvFields {
                line: number + 1,
                found: fields.len(),
            });
        }

        let one_based: usize =
            fields[CSV_FIELDS - 1]
                .parse()
                .map_err(|_| SourceError::CsvAnswer {
                    line: number + 1,
                    value: fields[CSV_FIELDS - 1].to_string(),
                })?;
        if one_based < 1 || one_based > OPTIONS_PER_QUESTION {
            return Err(SourceError::CsvAnswer {
                line: number + 1,
                value: fields[CSV_FIELDS - 1].to_string(),
            });
        }

        let options = fields[1..=OPTIONS_PER_QUESTION]
            .iter()
            .map(|o| o.to_string())
            .collect();
        questions.push(Question::new(
            fields[0].to_string(),
            options,
            Some(one_based - 1),
        ));
    }

    Ok(questions)
}

/// The built-in practice quiz, shuffled so repeat runs do not present the
/// questions in the same order. `SliceRandom::shuffle` gives a uniform
/// permutation.
pub fn practice_quiz() -> Vec<Question> {
    let mut questions = vec![
        question(
            "What is the capital of Australia?",
            ["Sydney", "Canberra", "Melbourne", "Perth"],
            1,
        ),
        question(
            "Which planet is known as the Red Planet?",
            ["Venus", "Jupiter", "Mars", "Saturn"],
            2,
        ),
        question(
            "What is the chemical symbol for gold?",
            ["Au", "Ag", "Gd", "Go"],
            0,
        ),
        question(
            "In which year did the Second World War end?",
            ["1943", "1944", "1945", "1946"],
            2,
        ),
        question(
            "Which gas do plants absorb from the atmosphere?",
            ["Oxygen", "Nitrogen", "Hydrogen", "Carbon dioxide"],
            3,
        ),
        question(
            "How many sides does a hexagon have?",
            ["Five", "Six", "Seven", "Eight"],
            1,
        ),
    ];

    questions.shuffle(&mut thread_rng());
    questions
}

fn question(text: &str, options: [&str; OPTIONS_PER_QUESTION], answer: usize) -> Question {
    Question::new(
        text.to_string(),
        options.iter().map(|o| o.to_string()).collect(),
        Some(answer),
    )
}
