/**
 * Parsing of quizfiles, the portable JSON documents that seed a quiz store.
 */
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::common::{QuizError, Result};

#[derive(Debug, Deserialize)]
pub struct Quizfile {
    pub metadata: QuizfileMetadata,
    pub questions: Vec<QuizfileQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct QuizfileMetadata {
    pub description: String,
    pub shuffle_answers: bool,
    /// Optional in the file format.
    #[serde(default)]
    pub shuffle_questions_by_weight: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuizfileQuestion {
    pub text: String,
    #[serde(default)]
    pub postmortem: Option<String>,
    pub answers: Vec<QuizfileAnswer>,
}

#[derive(Debug, Deserialize)]
pub struct QuizfileAnswer {
    /// Answer texts are frequently bare numbers (years, quantities), so both
    /// JSON strings and JSON numbers are accepted here.
    #[serde(deserialize_with = "string_or_number")]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// Parse and validate the quizfile at `path`.
pub fn parse(path: &Path) -> Result<Quizfile> {
    let data = fs::read_to_string(path)
        .or(Err(QuizError::QuizfileNotFound(path.to_path_buf())))?;
    parse_str(&data)
}

pub fn parse_str(data: &str) -> Result<Quizfile> {
    let quizfile: Quizfile = serde_json::from_str(data).map_err(QuizError::Json)?;
    validate(&quizfile)?;
    Ok(quizfile)
}

/// Reject quizfiles that would produce unanswerable questions. Without at
/// least one correct answer no input has the right cardinality and the
/// session could never move past the question, and answers past the 26th
/// have no letter to select them by.
fn validate(quizfile: &Quizfile) -> Result<()> {
    for (i, question) in quizfile.questions.iter().enumerate() {
        let number = i + 1;
        if question.text.trim().is_empty() {
            return Err(quizfile_error(number, "question text is empty"));
        }
        if question.answers.is_empty() {
            return Err(quizfile_error(number, "question has no answers"));
        }
        if question.answers.len() > 26 {
            return Err(quizfile_error(number, "question has more than 26 answers"));
        }
        if !question.answers.iter().any(|a| a.is_correct) {
            return Err(quizfile_error(number, "question has no correct answer"));
        }
        if question.answers.iter().any(|a| a.text.trim().is_empty()) {
            return Err(quizfile_error(number, "answer text is empty"));
        }
    }
    Ok(())
}

fn quizfile_error(question: usize, message: &str) -> QuizError {
    QuizError::Quizfile { question, message: String::from(message) }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> ::std::result::Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom("expected a string or a number")),
    }
}
