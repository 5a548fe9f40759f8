/**
 * Take multiple-choice quizzes from the command line, with attempt statistics
 * kept in a local SQLite database.
 */
#[macro_use]
pub mod iohelper;

pub mod common;
pub mod parser;
pub mod persistence;
pub mod quiz;
pub mod selection;
pub mod ui;
