/**
 * The command-line user interface for taking quizzes.
 *
 * `CmdUI` is generic over its writer and its line reader so the session loop
 * can be driven by scripted input in tests; the binary plugs in stdout and a
 * rustyline editor.
 */
use std::io::Write;

use colored::*;
use rustyline::error::ReadlineError;

use super::common::{QuizError, Result};
use super::iohelper::{prettyprint, prettyprint_colored};
use super::quiz::{Question, SessionScore};

/// A blocking read-line capability.
pub trait Readline {
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

impl<H: rustyline::Helper> Readline for rustyline::Editor<H> {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        match self.readline(prompt) {
            Ok(s) => Ok(s),
            Err(ReadlineError::Interrupted) => Err(QuizError::ReadlineInterrupted),
            Err(ReadlineError::Eof) => Err(QuizError::ReadlineEof),
            _ => Err(QuizError::ReadlineOther),
        }
    }
}

pub struct CmdUI<W: Write, R: Readline> {
    writer: W,
    reader: R,
    number: usize,
    clear_screen: bool,
}

impl<W: Write, R: Readline> CmdUI<W, R> {
    pub fn new(writer: W, reader: R, clear_screen: bool) -> Self {
        Self { writer, reader, number: 0, clear_screen }
    }

    /// Advance to the next question, clearing the screen when attached to a
    /// real terminal.
    pub fn next(&mut self) -> Result<()> {
        self.number += 1;
        if self.clear_screen {
            my_write!(self.writer, "\x1b[2J\x1b[1;1H")
        } else {
            my_write!(self.writer, "\n")
        }
    }

    /// Display the question text and its answers, each prefixed by its
    /// current letter.
    pub fn question(&mut self, question: &Question) -> Result<()> {
        let prefix = format!("({}) ", self.number);
        prettyprint_colored(
            &mut self.writer, &question.text, &prefix, None, Some(Color::Cyan),
        )?;
        my_write!(self.writer, "\n")?;
        for answer in question.answers.iter() {
            let prefix = format!("  {}. ", answer.letter.unwrap_or('?'));
            prettyprint(&mut self.writer, &answer.text, &prefix)?;
        }
        my_write!(self.writer, "\n")
    }

    /// Display a prompt and read a line continually until the user enters a
    /// line with at least one non-whitespace character. `Ok(None)` means the
    /// user hit Ctrl+D.
    pub fn prompt(&mut self) -> Result<Option<String>> {
        loop {
            match self.reader.read_line("> ") {
                Ok(response) => {
                    let response = response.trim();
                    if !response.is_empty() {
                        return Ok(Some(response.to_string()));
                    }
                },
                Err(QuizError::ReadlineEof) => {
                    return Ok(None);
                },
                Err(e) => {
                    return Err(e);
                },
            }
        }
    }

    /// Block until the user presses Enter. Any input is accepted; end of
    /// input counts as an acknowledgement.
    pub fn acknowledge(&mut self) -> Result<()> {
        my_writeln!(self.writer, "Press Enter to continue.")?;
        match self.reader.read_line("") {
            Ok(_) | Err(QuizError::ReadlineEof) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn correct(&mut self, question: &Question, postmortem: Option<&str>) -> Result<()> {
        let message = format!(
            "{} {}",
            "Correct!".green(),
            restate(question, "The answer was", "The answers were"),
        );
        prettyprint(&mut self.writer, &message, "")?;
        self.postmortem(postmortem)
    }

    pub fn incorrect(&mut self, question: &Question, postmortem: Option<&str>) -> Result<()> {
        let message = format!(
            "{} {}",
            "Incorrect.".red(),
            restate(question, "The correct answer was", "The correct answers were"),
        );
        prettyprint(&mut self.writer, &message, "")?;
        self.postmortem(postmortem)
    }

    fn postmortem(&mut self, postmortem: Option<&str>) -> Result<()> {
        if let Some(postmortem) = postmortem {
            my_write!(self.writer, "\n")?;
            prettyprint(&mut self.writer, postmortem, "")?;
        }
        Ok(())
    }

    pub fn invalid_response(&mut self, input: &str) -> Result<()> {
        let message = format!(
            "'{}' is not a valid answer. Enter letters from the list above, \
             e.g. 'C' or 'DA'.",
            input
        );
        prettyprint(&mut self.writer, &message, "")
    }

    pub fn wrong_count(&mut self, count: usize) -> Result<()> {
        let message = format!(
            "Please enter exactly {} answer(s), e.g. 'C' or 'DA'.",
            count
        );
        prettyprint(&mut self.writer, &message, "")
    }

    pub fn grade(&mut self, score: &SessionScore) -> Result<()> {
        my_writeln!(
            self.writer,
            "\nCurrent grade: {} ({}/{} correct)",
            colored_grade(score),
            score.correct,
            score.displayed
        )
    }

    /// The end-of-session summary.
    pub fn results(&mut self, score: &SessionScore) -> Result<()> {
        if score.displayed > 0 {
            my_write!(self.writer, "\n")?;
            my_writeln!(
                self.writer,
                "You answered {} of {} questions correctly ({}).",
                score.correct,
                score.displayed,
                format!("{:.1}%", score.percent()).cyan()
            )?;
            my_writeln!(self.writer, "Final grade: {}", colored_grade(score))?;
        }
        Ok(())
    }

    pub fn warning(&mut self, text: &str) -> Result<()> {
        prettyprint_colored(
            &mut self.writer, &format!("Warning: {}", text), "", Some(Color::Red), None,
        )
    }
}

fn restate(question: &Question, singular: &str, plural: &str) -> String {
    let letters = question.correct_letters();
    if question.correct_answers().len() > 1 {
        format!("{} {}.", plural, letters.green())
    } else {
        format!("{} {}.", singular, letters.green())
    }
}

fn colored_grade(score: &SessionScore) -> ColoredString {
    let grade = score.grade();
    if grade.is_passing() {
        grade.to_string().green()
    } else {
        grade.to_string().red()
    }
}
