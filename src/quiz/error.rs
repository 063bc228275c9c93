use thiserror::Error;

/// Everything that can go wrong while turning an uploaded file into
/// questions. All of these are terminal to the current upload only; the
/// user keeps whatever quiz state they had and can retry with another file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to extract text from PDF: {0}")]
    PdfExtraction(String),

    #[error("file is not valid UTF-8 text")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("invalid JSON quiz file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("question {index}: expected 4 options, found {found}")]
    OptionCount { index: usize, found: usize },

    #[error("question {index}: answer index {answer} is out of range")]
    AnswerRange { index: usize, answer: usize },

    #[error("CSV line {line}: expected 6 fields, found {found}")]
    CsvFields { line: usize, found: usize },

    #[error("CSV line {line}: \"{value}\" is not a valid answer number (1-4)")]
    CsvAnswer { line: usize, value: String },

    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),
}
