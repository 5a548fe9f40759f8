/**
 * The question/answer model and the interactive quiz session.
 *
 * Questions are loaded from the store, ordered by the `selection` module and
 * then asked one at a time by `Quiz::take`, which validates the user's letter
 * input, reports the outcome and records attempt statistics back to the store.
 */
use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;

use crate::common::{QuizError, Result};
use crate::persistence::Store;
use crate::ui::{CmdUI, Readline};

/// Represents an entire quiz: its metadata row plus the ordered sequence of
/// questions for this session.
#[derive(Debug)]
pub struct Quiz {
    pub metadata: Metadata,
    pub questions: Vec<Question>,
}

/// The singleton metadata row of a quiz store.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub description: String,
    pub shuffle_answers: bool,
    pub shuffle_questions_by_weight: bool,
}

/// Represents a question.
#[derive(Debug, Clone)]
pub struct Question {
    /// Stable identity, assigned at import time (1-based, in file order).
    pub id: i64,
    pub text: String,
    /// Explanation shown after the question is answered, right or wrong.
    pub postmortem: Option<String>,
    pub answers: Vec<Answer>,
    pub attempted_count: i64,
    pub correct_count: i64,
    /// Disabled questions are excluded from sessions entirely.
    pub enabled: bool,
}

/// Represents a candidate answer.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Identity scoped within the question (1-based, in file order).
    pub id: i64,
    pub text: String,
    pub is_correct: bool,
    /// Positional label (A, B, C, ...) in the answers' current order. `None`
    /// until `assign_letters` has run; stale after any reorder until it runs
    /// again.
    pub letter: Option<char>,
}

impl Question {
    /// Overwrite every answer's letter with its positional label in the
    /// current order. Must be re-invoked after any reordering of the answers,
    /// since grading correlates submitted letters with answer identity through
    /// the letters assigned at display time. Only the first 26 answers get a
    /// letter; the importer rejects questions with more answers than that.
    pub fn assign_letters(&mut self) {
        for (i, answer) in self.answers.iter_mut().enumerate() {
            answer.letter = if i < 26 {
                Some((b'A' + i as u8) as char)
            } else {
                None
            };
        }
    }

    pub fn correct_answers(&self) -> Vec<&Answer> {
        self.answers.iter().filter(|a| a.is_correct).collect()
    }

    pub fn correct_answer_ids(&self) -> BTreeSet<i64> {
        self.answers.iter().filter(|a| a.is_correct).map(|a| a.id).collect()
    }

    /// The letters of the correct answers, joined with "and" for display.
    pub fn correct_letters(&self) -> String {
        let letters: Vec<String> = self
            .answers
            .iter()
            .filter(|a| a.is_correct)
            .filter_map(|a| a.letter)
            .map(|l| l.to_string())
            .collect();
        letters.join(" and ")
    }
}

/// The outcome of a graded response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// A response that could not be graded. Both cases re-prompt the same
/// question without touching any counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// The input contained a character that is not one of the current answer
    /// letters. Carries the trimmed, lower-cased input for the error message.
    ForeignLetters(String),
    /// The input named a different number of answers than the question has
    /// correct answers. Carries the required count.
    WrongCount(usize),
}

/// Validate `raw` against `question`'s current letters and grade it.
///
/// The set of letters present determines the chosen answers; repetition and
/// order of letters do not matter, and matching is case-insensitive.
pub fn check_response(question: &Question, raw: &str) -> ::std::result::Result<Verdict, ResponseError> {
    let input = raw.trim().to_lowercase();
    let valid: Vec<char> = question
        .answers
        .iter()
        .filter_map(|a| a.letter)
        .map(|l| l.to_ascii_lowercase())
        .collect();

    if !input.chars().all(|c| valid.contains(&c)) {
        return Err(ResponseError::ForeignLetters(input));
    }

    let chosen: BTreeSet<i64> = question
        .answers
        .iter()
        .filter(|a| {
            a.letter
                .map(|l| input.contains(l.to_ascii_lowercase()))
                .unwrap_or(false)
        })
        .map(|a| a.id)
        .collect();

    let correct = question.correct_answer_ids();
    if chosen.len() != correct.len() {
        return Err(ResponseError::WrongCount(correct.len()));
    }

    if chosen == correct {
        Ok(Verdict::Correct)
    } else {
        Ok(Verdict::Incorrect)
    }
}

/// Letter grades, mapped from the session's running percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_percent(percent: f64) -> Grade {
        if percent >= 90.0 {
            Grade::A
        } else if percent >= 80.0 {
            Grade::B
        } else if percent >= 70.0 {
            Grade::C
        } else if percent >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn is_passing(self) -> bool {
        match self {
            Grade::A | Grade::B | Grade::C => true,
            Grade::D | Grade::F => false,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let letter = match *self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{}", letter)
    }
}

/// Session-local counters, reset at the start of every session. Only used to
/// compute the live grade; durable statistics live in the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionScore {
    pub displayed: i64,
    pub correct: i64,
}

impl SessionScore {
    pub fn new() -> SessionScore {
        SessionScore { displayed: 0, correct: 0 }
    }

    pub fn record(&mut self, verdict: Verdict) {
        self.displayed += 1;
        if verdict == Verdict::Correct {
            self.correct += 1;
        }
    }

    pub fn percent(&self) -> f64 {
        (self.correct as f64 / self.displayed as f64) * 100.0
    }

    pub fn grade(&self) -> Grade {
        Grade::from_percent(self.percent())
    }
}

impl Quiz {
    /// Run the interactive session over the pre-ordered questions.
    ///
    /// Each question blocks until it receives a gradable response; invalid
    /// letters and wrong answer counts re-prompt without advancing. Counter
    /// increments for a question are attempted before the next question is
    /// presented, and a failed increment is reported and swallowed. Ctrl+C or
    /// Ctrl+D at any prompt ends the session early.
    pub fn take<W: Write, R: Readline>(
        &self,
        store: &Store,
        ui: &mut CmdUI<W, R>,
    ) -> Result<SessionScore> {
        if self.questions.is_empty() {
            return Err(QuizError::EmptyQuiz);
        }

        let mut score = SessionScore::new();
        for question in self.questions.iter() {
            ui.next()?;
            ui.question(question)?;

            let verdict = loop {
                let raw = match ui.prompt() {
                    Ok(Some(raw)) => raw,
                    Ok(None) => return Ok(score),
                    Err(QuizError::ReadlineInterrupted) => return Ok(score),
                    Err(e) => return Err(e),
                };
                match check_response(question, &raw) {
                    Ok(verdict) => break verdict,
                    Err(ResponseError::ForeignLetters(input)) => {
                        ui.invalid_response(&input)?;
                    },
                    Err(ResponseError::WrongCount(count)) => {
                        ui.wrong_count(count)?;
                    },
                }
            };

            let postmortem = question.postmortem.as_ref().map(|s| s.as_str());
            match verdict {
                Verdict::Correct => {
                    ui.correct(question, postmortem)?;
                    self.record_attempt(store, question, true, ui)?;
                },
                Verdict::Incorrect => {
                    ui.incorrect(question, postmortem)?;
                    self.record_attempt(store, question, false, ui)?;
                },
            }

            score.record(verdict);
            ui.grade(&score)?;
            match ui.acknowledge() {
                Ok(()) => {},
                Err(QuizError::ReadlineInterrupted) => return Ok(score),
                Err(e) => return Err(e),
            }
        }

        Ok(score)
    }

    /// Increment the durable counters for `question`. Store failures do not
    /// fail the question or the session; they are reported and the session
    /// continues with whatever statistics did commit.
    fn record_attempt<W: Write, R: Readline>(
        &self,
        store: &Store,
        question: &Question,
        correct: bool,
        ui: &mut CmdUI<W, R>,
    ) -> Result<()> {
        if let Err(e) = store.increment_attempted(question.id) {
            ui.warning(&format!("could not record the attempt ({})", e))?;
        }
        if correct {
            if let Err(e) = store.increment_correct(question.id) {
                ui.warning(&format!("could not record the correct answer ({})", e))?;
            }
        }
        Ok(())
    }
}
