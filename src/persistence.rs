/**
 * The SQLite quiz store: schema creation, quizfile import, question loading
 * and the per-question attempt counters.
 */
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use super::common::{Config, QuizError, Result};
use super::parser::Quizfile;
use super::quiz::{Answer, Metadata, Question};

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Store> {
        let conn = Connection::open(path).map_err(QuizError::Sql)?;
        Ok(Store { conn })
    }

    /// An in-memory store, used by the tests.
    pub fn open_in_memory() -> Result<Store> {
        let conn = Connection::open_in_memory().map_err(QuizError::Sql)?;
        Ok(Store { conn })
    }

    pub fn create_schema(&self) -> Result<()> {
        self.conn
            .execute(
                "
            CREATE TABLE metadata (
              description TEXT NOT NULL,
              shuffle_answers INTEGER NOT NULL DEFAULT 0,
              shuffle_questions_by_weight INTEGER NOT NULL DEFAULT 0,
              created_at TEXT NOT NULL
            )
            ",
                [],
            )
            .map_err(QuizError::Sql)?;
        self.conn
            .execute(
                "
            CREATE TABLE questions (
              id INTEGER NOT NULL PRIMARY KEY,
              text TEXT NOT NULL CHECK(text != ''),
              postmortem TEXT,
              attempted_count INTEGER NOT NULL DEFAULT 0,
              correct_count INTEGER NOT NULL DEFAULT 0,
              enabled INTEGER NOT NULL DEFAULT 1
            )
            ",
                [],
            )
            .map_err(QuizError::Sql)?;
        self.conn
            .execute(
                "
            CREATE TABLE answers (
              question_id INTEGER NOT NULL REFERENCES questions,
              id INTEGER NOT NULL,
              text TEXT NOT NULL CHECK(text != ''),
              is_correct INTEGER NOT NULL DEFAULT 0,
              PRIMARY KEY (question_id, id)
            )
            ",
                [],
            )
            .map_err(QuizError::Sql)?;
        Ok(())
    }

    /// Seed the store from a parsed quizfile in one transaction. Question ids
    /// are 1-based in file order; answer ids are 1-based within each question.
    pub fn import(&mut self, quizfile: &Quizfile) -> Result<()> {
        let tx = self.conn.transaction().map_err(QuizError::Sql)?;

        tx.execute(
            "INSERT INTO metadata
               (description, shuffle_answers, shuffle_questions_by_weight, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                quizfile.metadata.description,
                quizfile.metadata.shuffle_answers,
                quizfile.metadata.shuffle_questions_by_weight,
                chrono::Utc::now().to_rfc3339(),
            ],
        )
        .map_err(QuizError::Sql)?;

        for (i, question) in quizfile.questions.iter().enumerate() {
            let question_id = (i + 1) as i64;
            tx.execute(
                "INSERT INTO questions (id, text, postmortem) VALUES (?1, ?2, ?3)",
                params![question_id, question.text, question.postmortem],
            )
            .map_err(QuizError::Sql)?;

            for (j, answer) in question.answers.iter().enumerate() {
                tx.execute(
                    "INSERT INTO answers (question_id, id, text, is_correct)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![question_id, (j + 1) as i64, answer.text, answer.is_correct],
                )
                .map_err(QuizError::Sql)?;
            }
        }

        tx.commit().map_err(QuizError::Sql)
    }

    pub fn metadata(&self) -> Result<Metadata> {
        self.conn
            .query_row(
                "SELECT description, shuffle_answers, shuffle_questions_by_weight
                 FROM metadata",
                [],
                |row| {
                    Ok(Metadata {
                        description: row.get(0)?,
                        shuffle_answers: row.get::<_, i64>(1)? != 0,
                        shuffle_questions_by_weight: row.get::<_, i64>(2)? != 0,
                    })
                },
            )
            .map_err(QuizError::Sql)
    }

    /// Load every question with its answers attached, ordered by id.
    pub fn questions(&self) -> Result<Vec<Question>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, text, postmortem, attempted_count, correct_count, enabled
                 FROM questions ORDER BY id",
            )
            .map_err(QuizError::Sql)?;
        let mut rows = stmt.query([]).map_err(QuizError::Sql)?;

        let mut questions = Vec::new();
        let mut index_by_id = HashMap::new();
        while let Some(row) = rows.next().map_err(QuizError::Sql)? {
            let question = Question {
                id: row.get(0).map_err(QuizError::Sql)?,
                text: row.get(1).map_err(QuizError::Sql)?,
                postmortem: row.get(2).map_err(QuizError::Sql)?,
                attempted_count: row.get(3).map_err(QuizError::Sql)?,
                correct_count: row.get(4).map_err(QuizError::Sql)?,
                enabled: row.get::<_, i64>(5).map_err(QuizError::Sql)? != 0,
                answers: Vec::new(),
            };
            index_by_id.insert(question.id, questions.len());
            questions.push(question);
        }

        let mut stmt = self
            .conn
            .prepare(
                "SELECT question_id, id, text, is_correct
                 FROM answers ORDER BY question_id, id",
            )
            .map_err(QuizError::Sql)?;
        let mut rows = stmt.query([]).map_err(QuizError::Sql)?;

        while let Some(row) = rows.next().map_err(QuizError::Sql)? {
            let question_id: i64 = row.get(0).map_err(QuizError::Sql)?;
            let answer = Answer {
                id: row.get(1).map_err(QuizError::Sql)?,
                text: row.get(2).map_err(QuizError::Sql)?,
                is_correct: row.get::<_, i64>(3).map_err(QuizError::Sql)? != 0,
                letter: None,
            };
            if let Some(&index) = index_by_id.get(&question_id) {
                questions[index].answers.push(answer);
            }
        }

        Ok(questions)
    }

    pub fn increment_attempted(&self, question_id: i64) -> Result<()> {
        self.conn
            .execute(
                "UPDATE questions SET attempted_count = attempted_count + 1 WHERE id = ?1",
                params![question_id],
            )
            .map_err(QuizError::Sql)?;
        Ok(())
    }

    pub fn increment_correct(&self, question_id: i64) -> Result<()> {
        self.conn
            .execute(
                "UPDATE questions SET correct_count = correct_count + 1 WHERE id = ?1",
                params![question_id],
            )
            .map_err(QuizError::Sql)?;
        Ok(())
    }
}

/// Return the directory that holds the quiz store databases.
pub fn get_store_dir(config: &Config) -> PathBuf {
    let mut dirpath = config.app_dir.clone();
    dirpath.push("databases");
    dirpath
}

/// Return the path to the database for the store with the given name.
pub fn get_store_path(config: &Config, name: &str) -> PathBuf {
    let mut path = get_store_dir(config);
    path.push(format!("{}.db", name));
    path
}

/// Create the application directory and its subdirectories if they don't
/// exist.
pub fn require_app_dir(config: &Config) -> Result<()> {
    make_directory(&config.app_dir).or(Err(QuizError::CannotMakeAppDir))?;
    make_directory(&get_store_dir(config)).or(Err(QuizError::CannotMakeAppDir))?;
    Ok(())
}

/// Return the names of all existing quiz stores, sorted.
pub fn list_stores(config: &Config) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(iter) = get_store_dir(config).read_dir() {
        for entry in iter {
            if let Ok(entry) = entry {
                let path = entry.path();
                if path.extension().map(|e| e == "db").unwrap_or(false) {
                    if let Some(stem) = path.file_stem() {
                        names.push(String::from(stem.to_string_lossy()));
                    }
                }
            }
        }
    }
    names.sort();
    names
}

fn make_directory(path: &Path) -> ::std::result::Result<(), std::io::Error> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    const QUIZFILE: &str = r#"
    {
      "metadata": {"description": "years", "shuffle_answers": false},
      "questions": [
        {
          "text": "What year is it?",
          "postmortem": "It's 2019!",
          "answers": [
            {"text": 2017},
            {"text": 2018},
            {"text": 2019, "is_correct": true}
          ]
        },
        {
          "text": "Which of these are numbers?",
          "answers": [
            {"text": "A"},
            {"text": "B"},
            {"text": 1, "is_correct": true},
            {"text": 2, "is_correct": true}
          ]
        }
      ]
    }
    "#;

    #[test]
    fn import_and_load_round_trip() {
        let store = seeded_store();

        let metadata = store.metadata().unwrap();
        assert_eq!(metadata.description, "years");
        assert!(!metadata.shuffle_answers);
        assert!(!metadata.shuffle_questions_by_weight);

        let questions = store.questions().unwrap();
        assert_eq!(questions.len(), 2);

        let first = &questions[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.text, "What year is it?");
        assert_eq!(first.postmortem, Some(String::from("It's 2019!")));
        assert_eq!(first.attempted_count, 0);
        assert_eq!(first.correct_count, 0);
        assert!(first.enabled);

        let ids: Vec<i64> = first.answers.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(first.answers[2].is_correct);

        let second = &questions[1];
        assert_eq!(second.id, 2);
        // Answer ids restart at 1 for each question.
        assert_eq!(second.answers[0].id, 1);
        assert_eq!(second.correct_answer_ids().len(), 2);
    }

    #[test]
    fn counters_increment_independently() {
        let store = seeded_store();

        store.increment_attempted(1).unwrap();
        store.increment_attempted(1).unwrap();
        store.increment_correct(1).unwrap();

        let questions = store.questions().unwrap();
        assert_eq!(questions[0].attempted_count, 2);
        assert_eq!(questions[0].correct_count, 1);
        assert_eq!(questions[1].attempted_count, 0);
        assert_eq!(questions[1].correct_count, 0);
    }

    #[test]
    fn empty_store_loads_no_questions() {
        let store = Store::open_in_memory().unwrap();
        store.create_schema().unwrap();
        assert!(store.questions().unwrap().is_empty());
    }

    fn seeded_store() -> Store {
        let mut store = Store::open_in_memory().unwrap();
        store.create_schema().unwrap();
        let quizfile = parser::parse_str(QUIZFILE).unwrap();
        store.import(&quizfile).unwrap();
        store
    }
}
