pub mod error;
pub mod extract;
pub mod loader;
pub mod normalize;
pub mod pdf;
pub mod timer;

/// One multiple-choice question: the stem, its answer options and, when the
/// source carries an answer key (JSON/CSV/practice), the index of the correct
/// option. Questions extracted from a PDF have no key and are not scored.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub answer: Option<usize>,
}

impl Question {
    pub fn new(text: String, options: Vec<String>, answer: Option<usize>) -> Self {
        Self {
            text,
            options,
            answer,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.answer.is_some()
    }
}

/// Outcome of selecting an option for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Correct,
    Incorrect,
    /// Recorded, but the question has no answer key.
    Unscored,
}

/// A running quiz: the ordered questions plus the cursor, score and the
/// per-question selections. All transitions go through the methods below;
/// `current` never leaves `0..=questions.len()` (equal to the length means
/// the quiz is finished).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct QuizSession {
    pub questions: Vec<Question>,
    pub current: usize,
    pub score: u32,
    answered: Vec<Option<usize>>,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        let answered = vec![None; questions.len()];
        Self {
            questions,
            current: 0,
            score: 0,
            answered,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// How many questions carry an answer key and therefore count towards
    /// the score.
    pub fn scored_len(&self) -> usize {
        self.questions.iter().filter(|q| q.is_scored()).count()
    }

    /// Records the user's choice for the current question. Returns `None`
    /// when there is nothing to select: quiz finished, option out of range,
    /// or the question was already answered. A question is scored at most
    /// once, even if the user navigates back to it.
    pub fn select(&mut self, option: usize) -> Option<Selection> {
        if self.is_finished() {
            return None;
        }
        let question = &self.questions[self.current];
        if option >= question.options.len() {
            return None;
        }
        if self.answered[self.current].is_some() {
            return None;
        }

        self.answered[self.current] = Some(option);
        match question.answer {
            Some(correct) if correct == option => {
                self.score += 1;
                Some(Selection::Correct)
            }
            Some(_) => Some(Selection::Incorrect),
            None => Some(Selection::Unscored),
        }
    }

    /// Moves to the next question. Returns `false` once the quiz is over.
    pub fn advance(&mut self) -> bool {
        if self.current < self.questions.len() {
            self.current += 1;
        }
        !self.is_finished()
    }

    /// Moves back one question, if possible.
    pub fn retreat(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            return true;
        }
        false
    }

    /// The countdown ran out: same transition as advancing, with no answer
    /// recorded for the expired question.
    pub fn on_timeout(&mut self) -> bool {
        self.advance()
    }

    pub fn selected(&self, index: usize) -> Option<usize> {
        self.answered.get(index).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(text: &str, answer: usize) -> Question {
        Question::new(
            text.to_string(),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            Some(answer),
        )
    }

    fn unkeyed(text: &str) -> Question {
        Question::new(
            text.to_string(),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            None,
        )
    }

    #[test]
    fn select_scores_correct_answer() {
        let mut session = QuizSession::new(vec![keyed("q1", 2)]);
        assert_eq!(session.select(2), Some(Selection::Correct));
        assert_eq!(session.score, 1);
    }

    #[test]
    fn select_records_incorrect_answer_without_scoring() {
        let mut session = QuizSession::new(vec![keyed("q1", 2)]);
        assert_eq!(session.select(0), Some(Selection::Incorrect));
        assert_eq!(session.score, 0);
        assert_eq!(session.selected(0), Some(0));
    }

    #[test]
    fn unkeyed_question_is_unscored() {
        let mut session = QuizSession::new(vec![unkeyed("q1")]);
        assert_eq!(session.select(1), Some(Selection::Unscored));
        assert_eq!(session.score, 0);
    }

    #[test]
    fn question_is_scored_at_most_once() {
        let mut session = QuizSession::new(vec![keyed("q1", 0)]);
        assert_eq!(session.select(0), Some(Selection::Correct));
        assert_eq!(session.select(0), None);
        session.advance();
        session.retreat();
        assert_eq!(session.select(0), None);
        assert_eq!(session.score, 1);
    }

    #[test]
    fn select_rejects_out_of_range_option() {
        let mut session = QuizSession::new(vec![keyed("q1", 0)]);
        assert_eq!(session.select(4), None);
    }

    #[test]
    fn advance_stops_at_the_end() {
        let mut session = QuizSession::new(vec![keyed("q1", 0), keyed("q2", 1)]);
        assert!(session.advance());
        assert!(!session.advance());
        assert!(session.is_finished());
        assert!(session.current_question().is_none());
        // advancing past the end is a no-op
        assert!(!session.advance());
        assert_eq!(session.current, 2);
    }

    #[test]
    fn retreat_stops_at_the_start() {
        let mut session = QuizSession::new(vec![keyed("q1", 0), keyed("q2", 1)]);
        assert!(!session.retreat());
        session.advance();
        assert!(session.retreat());
        assert_eq!(session.current, 0);
    }

    #[test]
    fn timeout_advances_without_recording() {
        let mut session = QuizSession::new(vec![keyed("q1", 0), keyed("q2", 1)]);
        session.on_timeout();
        assert_eq!(session.current, 1);
        assert_eq!(session.selected(0), None);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn scored_len_counts_only_keyed_questions() {
        let session = QuizSession::new(vec![keyed("q1", 0), unkeyed("q2")]);
        assert_eq!(session.scored_len(), 1);
    }
}
