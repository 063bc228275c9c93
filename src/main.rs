mod quiz;

use std::future::Future;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    net::Download,
    prelude::*,
    types::{ChatId, Document, KeyboardButton, KeyboardMarkup},
};

use quiz::error::SourceError;
use quiz::extract::{self, Mode};
use quiz::timer::Countdowns;
use quiz::{loader, pdf, Question, QuizSession, Selection};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveQuizChoice,
    ReceiveDocument,
    RunningQuiz {
        session: QuizSession,
    },
}

type SessionStorage = Arc<ErasedStorage<State>>;

const PDF_QUIZ: &str = "📄 Quiz from a PDF";
const FILE_QUIZ: &str = "🗒 Quiz from a JSON/CSV file";
const PRACTICE_QUIZ: &str = "🎲 Practice quiz";

const NEXT_BUTTON: &str = "➡️ Next";
const BACK_BUTTON: &str = "⬅️ Back";
const STOP_BUTTON: &str = "🛑 Stop quiz";

const DEFAULT_QUESTION_SECONDS: u64 = 30;

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting quiz bot...");

    let bot = Bot::from_env();

    let db_path = std::env::var("QUIZ_DB").unwrap_or_else(|_| "quiz.sqlite".to_string());
    let storage: SessionStorage = SqliteStorage::open(&db_path, Json)
        .await
        .expect("Failed to open the dialogue database")
        .erase();

    let timers = Arc::new(Countdowns::new());

    let timers_for_choice = timers.clone();
    let storage_for_choice = storage.clone();
    let timers_for_document = timers.clone();
    let storage_for_document = storage.clone();
    let timers_for_quiz = timers;
    let storage_for_quiz = storage.clone();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveQuizChoice].endpoint(
                move |bot: Bot, dialogue: QuizDialogue, msg: Message| {
                    receive_quiz_choice(
                        timers_for_choice.clone(),
                        storage_for_choice.clone(),
                        bot,
                        dialogue,
                        msg,
                    )
                },
            ))
            .branch(dptree::case![State::ReceiveDocument].endpoint(
                move |bot: Bot, msg: Message| {
                    receive_document(
                        timers_for_document.clone(),
                        storage_for_document.clone(),
                        bot,
                        msg,
                    )
                },
            ))
            .branch(dptree::case![State::RunningQuiz { session }].endpoint(
                move |bot: Bot, session: QuizSession, msg: Message| {
                    running_quiz(
                        timers_for_quiz.clone(),
                        storage_for_quiz.clone(),
                        bot,
                        session,
                        msg,
                    )
                },
            )),
    )
    .dependencies(dptree::deps![storage])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

fn mode_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(PDF_QUIZ)],
        vec![KeyboardButton::new(FILE_QUIZ)],
        vec![KeyboardButton::new(PRACTICE_QUIZ)],
    ])
}

const GREETING_TEXT: &str =
    "Hi! I turn documents into quizzes. Send me a PDF with numbered multiple-choice \
     questions, a JSON/CSV quiz file, or try the built-in practice quiz.";

async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT)
        .reply_markup(mode_keyboard())
        .await?;

    dialogue.update(State::ReceiveQuizChoice).await?;
    Ok(())
}

async fn receive_quiz_choice(
    timers: Arc<Countdowns>,
    storage: SessionStorage,
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(PDF_QUIZ) => {
            bot.send_message(
                msg.chat.id,
                "Send me a PDF. I'll look for numbered questions with (a)-(d) options.",
            )
            .await?;
            dialogue.update(State::ReceiveDocument).await?;
            Ok(())
        }
        Some(FILE_QUIZ) => {
            bot.send_message(msg.chat.id, "Send me a .json or .csv quiz file.")
                .await?;
            dialogue.update(State::ReceiveDocument).await?;
            Ok(())
        }
        Some(PRACTICE_QUIZ) => {
            start_quiz(timers, storage, bot, msg.chat.id, loader::practice_quiz()).await
        }
        _ => {
            bot.send_message(msg.chat.id, "Please pick one of the options below.")
                .reply_markup(mode_keyboard())
                .await?;
            Ok(())
        }
    }
}

async fn receive_document(
    timers: Arc<Countdowns>,
    storage: SessionStorage,
    bot: Bot,
    msg: Message,
) -> HandlerResult {
    let chat = msg.chat.id;
    let Some(document) = msg.document() else {
        bot.send_message(chat, "Please attach a quiz file: a PDF, .json or .csv.")
            .await?;
        return Ok(());
    };

    let file = bot.get_file(document.file.id.clone()).await?;
    let mut buffer = Cursor::new(Vec::new());
    bot.download_file(&file.path, &mut buffer).await?;

    let questions = match load_document(document, &buffer.into_inner()) {
        Ok(questions) => questions,
        Err(err) => {
            log::error!("loading quiz from {:?} failed: {}", document.file_name, err);
            let notice = match err {
                SourceError::PdfExtraction(_) => {
                    "I couldn't read that PDF. Try exporting it again or use another file."
                        .to_string()
                }
                other => format!("That file didn't parse: {}", other),
            };
            bot.send_message(chat, notice).await?;
            return Ok(());
        }
    };

    if questions.is_empty() {
        bot.send_message(chat, "No questions found in that file.")
            .await?;
        return Ok(());
    }

    start_quiz(timers, storage, bot, chat, questions).await
}

/// Dispatches the uploaded document to the right loader. PDF goes through
/// text extraction plus the strict MCQ scanner; JSON and CSV are parsed
/// directly.
fn load_document(document: &Document, bytes: &[u8]) -> Result<Vec<Question>, SourceError> {
    let name = document
        .file_name
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let is_pdf = name.ends_with(".pdf")
        || document
            .mime_type
            .as_ref()
            .is_some_and(|m| m.essence_str() == "application/pdf");

    if is_pdf {
        let text = pdf::extract_text(bytes)?;
        return Ok(extract::extract(&text, Mode::Strict));
    }
    if name.ends_with(".json") {
        return loader::from_json(&String::from_utf8(bytes.to_vec())?);
    }
    if name.ends_with(".csv") {
        return loader::from_csv(&String::from_utf8(bytes.to_vec())?);
    }

    Err(SourceError::UnsupportedFile(if name.is_empty() {
        "file without a name".to_string()
    } else {
        name
    }))
}

async fn start_quiz(
    timers: Arc<Countdowns>,
    storage: SessionStorage,
    bot: Bot,
    chat: ChatId,
    questions: Vec<Question>,
) -> HandlerResult {
    let session = QuizSession::new(questions);
    log::info!(
        "chat {}: starting quiz with {} questions",
        chat.0,
        session.len()
    );

    bot.send_message(
        chat,
        format!(
            "Loaded {} questions. You have {} seconds per question. Let's go!",
            session.len(),
            question_seconds()
        ),
    )
    .await?;

    present_question(timers, storage, bot, chat, session).await
}

async fn running_quiz(
    timers: Arc<Countdowns>,
    storage: SessionStorage,
    bot: Bot,
    mut session: QuizSession,
    msg: Message,
) -> HandlerResult {
    let chat = msg.chat.id;
    let Some(text) = msg.text() else {
        bot.send_message(chat, "Use the keyboard below to answer.")
            .await?;
        return Ok(());
    };

    match text {
        NEXT_BUTTON => {
            session.advance();
            present_question(timers, storage, bot, chat, session).await
        }
        BACK_BUTTON => {
            if session.retreat() {
                present_question(timers, storage, bot, chat, session).await
            } else {
                bot.send_message(chat, "This is the first question.").await?;
                Ok(())
            }
        }
        STOP_BUTTON => {
            session.current = session.len();
            present_question(timers, storage, bot, chat, session).await
        }
        answer => {
            let chosen = session.current_question().and_then(|q| {
                (0..q.options.len()).find(|&i| option_label(i, &q.options[i]) == answer)
            });

            let Some(option) = chosen else {
                bot.send_message(chat, "Use the answer buttons below.").await?;
                return Ok(());
            };

            match session.select(option) {
                Some(Selection::Correct) => {
                    bot.send_message(chat, "✅ Correct!").await?;
                }
                Some(Selection::Incorrect) => {
                    // select() only reports Incorrect for keyed questions
                    let question = &session.questions[session.current];
                    let correct = question.answer.unwrap_or_default();
                    bot.send_message(
                        chat,
                        format!(
                            "❌ Not quite. The answer was {}",
                            option_label(correct, &question.options[correct])
                        ),
                    )
                    .await?;
                }
                Some(Selection::Unscored) => {
                    bot.send_message(chat, "📝 Noted. This question has no answer key.")
                        .await?;
                }
                None => {
                    bot.send_message(chat, "You already answered this one. Use Next or Back.")
                        .await?;
                    return Ok(());
                }
            }

            session.advance();
            present_question(timers, storage, bot, chat, session).await
        }
    }
}

/// Sends the current question (or the final summary) and re-arms the
/// per-chat countdown. Boxed because the countdown expiry path recurses
/// back into it.
fn present_question(
    timers: Arc<Countdowns>,
    storage: SessionStorage,
    bot: Bot,
    chat: ChatId,
    session: QuizSession,
) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>> {
    Box::pin(async move {
        let dialogue: QuizDialogue = Dialogue::new(storage.clone(), chat);

        let Some(question) = session.current_question().cloned() else {
            timers.disarm(chat).await;

            let summary = if session.scored_len() > 0 {
                format!(
                    "🏁 Quiz finished! You scored {} out of {}.",
                    session.score,
                    session.scored_len()
                )
            } else {
                format!(
                    "🏁 Quiz finished! You went through {} questions.",
                    session.len()
                )
            };
            bot.send_message(chat, format!("{}\n\nWhat next?", summary))
                .reply_markup(mode_keyboard())
                .await?;

            dialogue.update(State::ReceiveQuizChoice).await?;
            return Ok(());
        };

        let mut text = format!(
            "Question {}/{}\n\n{}",
            session.current + 1,
            session.len(),
            question.text
        );
        if question.options.is_empty() {
            text.push_str("\n\n(no answer options were found for this question)");
        }

        let mut rows: Vec<Vec<KeyboardButton>> = question
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| vec![KeyboardButton::new(option_label(i, option))])
            .collect();
        rows.push(vec![
            KeyboardButton::new(BACK_BUTTON),
            KeyboardButton::new(NEXT_BUTTON),
        ]);
        rows.push(vec![KeyboardButton::new(STOP_BUTTON)]);

        bot.send_message(chat, text)
            .reply_markup(KeyboardMarkup::new(rows))
            .await?;
        dialogue.update(State::RunningQuiz { session }).await?;

        let timers_for_expiry = timers.clone();
        let storage_for_expiry = storage.clone();
        let bot_for_expiry = bot.clone();
        timers
            .arm(chat, Duration::from_secs(question_seconds()), async move {
                if let Err(err) = question_timed_out(
                    timers_for_expiry,
                    storage_for_expiry,
                    bot_for_expiry,
                    chat,
                )
                .await
                {
                    log::error!("countdown handling for chat {} failed: {}", chat.0, err);
                }
            })
            .await;

        Ok(())
    })
}

/// Runs when a question's countdown expires: announce it, move the session
/// forward without recording an answer, and show the next question.
async fn question_timed_out(
    timers: Arc<Countdowns>,
    storage: SessionStorage,
    bot: Bot,
    chat: ChatId,
) -> HandlerResult {
    // This task must not abort itself when the next countdown is armed.
    timers.forget(chat).await;

    let dialogue: QuizDialogue = Dialogue::new(storage.clone(), chat);
    let Some(State::RunningQuiz { mut session }) = dialogue.get().await? else {
        return Ok(());
    };

    bot.send_message(
        chat,
        format!("⏱ Time's up for question {}!", session.current + 1),
    )
    .await?;

    session.on_timeout();
    present_question(timers, storage, bot, chat, session).await
}

fn option_label(index: usize, option: &str) -> String {
    let letter = (b'a' + index as u8) as char;
    format!("{}) {}", letter, option)
}

fn question_seconds() -> u64 {
    std::env::var("QUESTION_SECONDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_QUESTION_SECONDS)
}
