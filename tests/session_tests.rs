/**
 * Session tests that drive `Quiz::take` with scripted input and a mock
 * writer, against an in-memory store.
 */
use regex::Regex;

use swot::common::{QuizError, Result};
use swot::parser;
use swot::persistence::Store;
use swot::quiz::{Quiz, SessionScore};
use swot::ui::{CmdUI, Readline};

const YEARS: &str = r#"
{
  "metadata": {"description": "years", "shuffle_answers": false},
  "questions": [
    {
      "text": "What year is it?",
      "postmortem": "Time flies.",
      "answers": [
        {"text": 2017},
        {"text": 2018},
        {"text": 2019, "is_correct": true}
      ]
    }
  ]
}
"#;

const PRIMES: &str = r#"
{
  "metadata": {"description": "primes", "shuffle_answers": false},
  "questions": [
    {
      "text": "Which of these are prime?",
      "answers": [
        {"text": "4"},
        {"text": "6"},
        {"text": "7", "is_correct": true},
        {"text": "11", "is_correct": true}
      ]
    }
  ]
}
"#;

const TWO_QUESTIONS: &str = r#"
{
  "metadata": {"description": "mixed", "shuffle_answers": false},
  "questions": [
    {
      "text": "What year is it?",
      "answers": [
        {"text": 2018},
        {"text": 2019, "is_correct": true}
      ]
    },
    {
      "text": "Which of these are prime?",
      "answers": [
        {"text": "4"},
        {"text": "7", "is_correct": true}
      ]
    }
  ]
}
"#;

#[test]
fn correct_answer_is_graded_and_recorded() {
    let store = seeded_store(YEARS);
    let (score, output) = run_session(&store, &["c", ""]);

    assert_in_order(
        &output,
        &[
            "(1) What year is it?",
            "A. 2017",
            "B. 2018",
            "C. 2019",
            "Correct! The answer was C.",
            "Time flies.",
            "Current grade: A (1/1 correct)",
            "You answered 1 of 1 questions correctly (100.0%).",
            "Final grade: A",
        ],
    );
    assert_eq!(score.displayed, 1);
    assert_eq!(score.correct, 1);
    assert_counters(&store, 1, 1, 1);
}

#[test]
fn incorrect_answer_restates_the_correct_letters() {
    let store = seeded_store(YEARS);
    let (score, output) = run_session(&store, &["a", ""]);

    assert_in_order(
        &output,
        &[
            "Incorrect. The correct answer was C.",
            "Time flies.",
            "RE: Current grade: F \\(0/1 correct\\)",
            "Final grade: F",
        ],
    );
    assert_eq!(score.displayed, 1);
    assert_eq!(score.correct, 0);
    assert_counters(&store, 1, 1, 0);
}

#[test]
fn foreign_letters_reprompt_without_recording() {
    let store = seeded_store(YEARS);
    let (score, output) = run_session(&store, &["xz", "c", ""]);

    assert_in_order(
        &output,
        &[
            "'xz' is not a valid answer.",
            "Correct! The answer was C.",
        ],
    );
    assert_eq!(score.displayed, 1);
    // The invalid attempt did not touch the counters.
    assert_counters(&store, 1, 1, 1);
}

#[test]
fn wrong_answer_count_reprompts_without_recording() {
    let store = seeded_store(PRIMES);
    let (score, output) = run_session(&store, &["a", "dc", ""]);

    assert_in_order(
        &output,
        &[
            "Please enter exactly 2 answer(s)",
            "Correct! The answers were C and D.",
            "Current grade: A (1/1 correct)",
        ],
    );
    assert_eq!(score.correct, 1);
    assert_counters(&store, 1, 1, 1);
}

#[test]
fn same_count_mismatch_is_incorrect() {
    let store = seeded_store(PRIMES);
    let (score, _) = run_session(&store, &["ab", ""]);

    assert_eq!(score.displayed, 1);
    assert_eq!(score.correct, 0);
    assert_counters(&store, 1, 1, 0);
}

#[test]
fn end_of_input_ends_the_session_early() {
    let store = seeded_store(TWO_QUESTIONS);
    // Answer the first question, acknowledge it, then run out of input at
    // the second question's prompt.
    let (score, output) = run_session(&store, &["b", ""]);

    assert_in_order(
        &output,
        &[
            "(1) What year is it?",
            "Correct! The answer was B.",
            "(2) Which of these are prime?",
        ],
    );
    assert_eq!(score.displayed, 1);
    assert_eq!(score.correct, 1);
    assert_counters(&store, 1, 1, 1);
    assert_counters(&store, 2, 0, 0);
}

#[test]
fn store_write_failures_warn_but_the_session_continues() {
    colored::control::set_override(false);

    let seeded = seeded_store(YEARS);
    let metadata = seeded.metadata().unwrap();
    let mut questions = seeded.questions().unwrap();
    for question in questions.iter_mut() {
        question.assign_letters();
    }
    let quiz = Quiz { metadata, questions };

    // No schema, so every counter increment fails.
    let broken = Store::open_in_memory().unwrap();
    let mut output = Vec::new();
    let reader = ScriptedInput {
        lines: vec![String::from("c"), String::new()],
        pos: 0,
    };
    let score = {
        let mut ui = CmdUI::new(&mut output, reader, false);
        quiz.take(&broken, &mut ui).unwrap()
    };
    let output = String::from_utf8_lossy(&output).to_string();

    assert_in_order(
        &output,
        &[
            "Correct! The answer was C.",
            "Warning: could not record the attempt",
            "Warning: could not record the correct answer",
            "Current grade: A (1/1 correct)",
        ],
    );
    assert_eq!(score.displayed, 1);
    assert_eq!(score.correct, 1);
}

#[test]
fn blank_lines_at_the_prompt_are_ignored() {
    let store = seeded_store(YEARS);
    let (score, _) = run_session(&store, &["", "  ", "c", ""]);

    assert_eq!(score.correct, 1);
    assert_counters(&store, 1, 1, 1);
}

struct ScriptedInput {
    lines: Vec<String>,
    pos: usize,
}

impl Readline for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> Result<String> {
        if self.pos < self.lines.len() {
            let line = self.lines[self.pos].clone();
            self.pos += 1;
            Ok(line)
        } else {
            Err(QuizError::ReadlineEof)
        }
    }
}

fn seeded_store(quizfile: &str) -> Store {
    let mut store = Store::open_in_memory().unwrap();
    store.create_schema().unwrap();
    let quizfile = parser::parse_str(quizfile).unwrap();
    store.import(&quizfile).unwrap();
    store
}

/// Run a session over the store's questions in id order, feeding `input` one
/// line at a time, and return the final score and everything written to the
/// mock terminal.
fn run_session(store: &Store, input: &[&str]) -> (SessionScore, String) {
    colored::control::set_override(false);

    let metadata = store.metadata().unwrap();
    let mut questions = store.questions().unwrap();
    for question in questions.iter_mut() {
        question.assign_letters();
    }
    let quiz = Quiz { metadata, questions };

    let mut output = Vec::new();
    let reader = ScriptedInput {
        lines: input.iter().map(|s| s.to_string()).collect(),
        pos: 0,
    };
    let score = {
        let mut ui = CmdUI::new(&mut output, reader, false);
        let score = quiz.take(store, &mut ui).unwrap();
        ui.results(&score).unwrap();
        score
    };
    (score, String::from_utf8_lossy(&output).to_string())
}

fn assert_counters(store: &Store, question_id: i64, attempted: i64, correct: i64) {
    let questions = store.questions().unwrap();
    let question = questions.iter().find(|q| q.id == question_id).unwrap();
    assert_eq!(question.attempted_count, attempted);
    assert_eq!(question.correct_count, correct);
}

fn assert_in_order(mock_stdout: &str, data: &[&str]) {
    let mut last_pos = 0;
    for datum in data {
        let pos = if datum.starts_with("RE: ") {
            let re = Regex::new(&datum[4..]).unwrap();
            re.find(&mock_stdout[last_pos..])
                .map(|m| m.start() + m.as_str().len())
        } else {
            mock_stdout[last_pos..].find(datum).map(|pos| pos + datum.len())
        };

        if let Some(end) = pos {
            last_pos += end;
        } else {
            panic!("Missing: {:?}; Contents of stdout: {:?}", datum, mock_stdout);
        }
    }
}
