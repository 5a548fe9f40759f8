/**
 * Definitions of data structures used by several modules: `QuizError`, the
 * startup configuration and the structs that hold command-line arguments.
 */
use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use structopt::StructOpt;

pub type Result<T> = ::std::result::Result<T, QuizError>;

#[derive(Debug)]
pub enum QuizError {
    /// For when the application directory cannot be created.
    CannotMakeAppDir,
    /// For when the user requests a quiz store that does not exist.
    QuizNotFound(String),
    /// For when no store name was given and none could be inferred.
    NoQuizSelected,
    /// For when the quizfile to import does not exist.
    QuizfileNotFound(PathBuf),
    /// For when an import was requested with no quizfile path at all.
    QuizfileNotSpecified,
    /// For when an import would overwrite an existing store.
    StoreExists(String),
    /// For semantic errors in an otherwise well-formed quizfile.
    Quizfile { question: usize, message: String },
    /// For JSON errors.
    Json(serde_json::Error),
    /// For database errors.
    Sql(rusqlite::Error),
    Io(io::Error),
    ReadlineInterrupted,
    ReadlineEof,
    ReadlineOther,
    EmptyQuiz,
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            QuizError::CannotMakeAppDir => {
                write!(f, "unable to create application directory")
            },
            QuizError::QuizNotFound(ref name) => {
                write!(f, "could not find quiz store named '{}'", name)
            },
            QuizError::NoQuizSelected => {
                write!(
                    f,
                    "no quiz store selected (pass a name, or set SWOT_QUIZFILE \
                     to import one)"
                )
            },
            QuizError::QuizfileNotFound(ref path) => {
                write!(f, "could not find quizfile '{}'", path.to_string_lossy())
            },
            QuizError::QuizfileNotSpecified => {
                write!(
                    f,
                    "no quizfile specified (pass a path or set SWOT_QUIZFILE)"
                )
            },
            QuizError::StoreExists(ref name) => {
                write!(
                    f,
                    "a quiz store named '{}' already exists (pass --force to \
                     replace it)",
                    name
                )
            },
            QuizError::Quizfile { question, ref message } => {
                write!(f, "invalid quizfile: question {}: {}", question, message)
            },
            QuizError::Json(ref err) => {
                write!(f, "could not parse JSON ({})", err)
            },
            QuizError::Sql(ref err) => {
                write!(f, "database error ({})", err)
            },
            QuizError::Io(ref err) => {
                write!(f, "IO error ({})", err)
            },
            QuizError::EmptyQuiz => {
                write!(f, "the quiz store has no questions")
            },
            QuizError::ReadlineInterrupted => {
                Ok(())
            },
            QuizError::ReadlineEof => {
                Ok(())
            },
            QuizError::ReadlineOther => {
                write!(f, "error while reading input")
            },
        }
    }
}

impl error::Error for QuizError {
    fn cause(&self) -> Option<&dyn error::Error> {
        match *self {
            QuizError::Json(ref err) => Some(err),
            QuizError::Sql(ref err) => Some(err),
            QuizError::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

pub fn is_broken_pipe(e: &QuizError) -> bool {
    if let QuizError::Io(e) = e {
        if let io::ErrorKind::BrokenPipe = e.kind() {
            return true;
        }
    }
    false
}

/// The application's startup configuration, constructed once in `main`. No
/// other module reads environment variables or global state.
#[derive(Debug)]
pub struct Config {
    /// Directory that holds the `databases` subdirectory of quiz stores.
    pub app_dir: PathBuf,
    /// Quizfile named by the SWOT_QUIZFILE environment variable, if set.
    pub quizfile: Option<PathBuf>,
}

/// Holds the command-line configuration for the application.
#[derive(StructOpt)]
#[structopt(name = "swot", about = "Take multiple-choice quizzes from the command line.")]
pub struct Options {
    /// Look for quiz stores in a particular directory.
    #[structopt(short = "d", long = "directory")]
    pub directory: Option<PathBuf>,
    /// Do not emit colorized output.
    #[structopt(long = "no-color")]
    pub no_color: bool,
    #[structopt(subcommand)]
    pub cmd: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// Take a quiz.
    #[structopt(name = "take")]
    Take(TakeOptions),
    /// Import a quizfile into a new quiz store.
    #[structopt(name = "import")]
    Import(ImportOptions),
    /// List available quiz stores.
    #[structopt(name = "ls")]
    Ls,
    /// Print the file path of a quiz store.
    #[structopt(name = "path")]
    Path(PathOptions),
    /// Delete a quiz store.
    #[structopt(name = "rm")]
    Rm(RmOptions),
}

#[derive(StructOpt)]
pub struct TakeOptions {
    /// Name of the quiz store to use. May be omitted when only one exists.
    pub name: Option<String>,
}

#[derive(StructOpt)]
pub struct ImportOptions {
    /// Path to the quizfile. Defaults to the SWOT_QUIZFILE environment
    /// variable.
    pub path: Option<PathBuf>,
    /// Name for the new store. Defaults to the quizfile's base name.
    #[structopt(long = "name")]
    pub name: Option<String>,
    /// Replace the store if it already exists.
    #[structopt(short = "f", long = "force")]
    pub force: bool,
}

#[derive(StructOpt)]
pub struct PathOptions {
    /// The name of the quiz store.
    pub name: String,
    /// Display the path that would be used even if the store does not exist.
    #[structopt(short = "f", long = "force")]
    pub force: bool,
}

#[derive(StructOpt)]
pub struct RmOptions {
    /// The name of the quiz store to delete.
    pub name: String,
    /// Delete without prompting for confirmation.
    #[structopt(short = "f", long = "force")]
    pub force: bool,
}
