/**
 * Take multiple-choice quizzes from the command line.
 */
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use colored::*;
use structopt::StructOpt;

use swot::common::{
    is_broken_pipe, Command, Config, ImportOptions, Options, PathOptions, QuizError, Result,
    RmOptions, TakeOptions,
};
use swot::my_writeln;
use swot::parser;
use swot::persistence::{self, Store};
use swot::quiz::Quiz;
use swot::selection;
use swot::ui::CmdUI;

fn main() {
    let options = Options::from_args();

    if options.no_color {
        colored::control::set_override(false);
    }

    let config = match make_config(&options) {
        Ok(config) => config,
        Err(e) => fatal(&e),
    };

    let result = match options.cmd {
        Command::Take(ref take_options) => main_take(&config, take_options),
        Command::Import(ref import_options) => main_import(&config, import_options),
        Command::Ls => main_ls(&config),
        Command::Path(ref path_options) => main_path(&config, path_options),
        Command::Rm(ref rm_options) => main_rm(&config, rm_options),
    };

    if let Err(e) = result {
        if !is_broken_pipe(&e) {
            fatal(&e);
        }
    }
}

fn fatal(e: &QuizError) -> ! {
    eprintln!("{}: {}", "Error".red(), e);
    ::std::process::exit(2);
}

/// Gather everything from the environment in one place. The rest of the
/// program only sees the resulting `Config`.
fn make_config(options: &Options) -> Result<Config> {
    let app_dir = match options.directory {
        Some(ref dir) => dir.clone(),
        None => {
            let mut dir = dirs::data_dir().ok_or(QuizError::CannotMakeAppDir)?;
            dir.push("swot");
            dir
        },
    };
    let quizfile = env::var_os("SWOT_QUIZFILE").map(PathBuf::from);
    Ok(Config { app_dir, quizfile })
}

/// The main function for the `take` subcommand.
fn main_take(config: &Config, options: &TakeOptions) -> Result<()> {
    persistence::require_app_dir(config)?;

    let name = resolve_store_name(config, options)?;
    let path = persistence::get_store_path(config, &name);
    if !path.exists() {
        return Err(QuizError::QuizNotFound(name));
    }

    let store = Store::open(&path)?;
    let metadata = store.metadata()?;
    let questions = selection::organize(store.questions()?, &metadata);

    let quiz = Quiz { metadata, questions };
    let mut ui = CmdUI::new(std::io::stdout(), rustyline::Editor::<()>::new(), true);
    let score = quiz.take(&store, &mut ui)?;
    ui.results(&score)
}

/// Decide which store a bare `swot take` refers to: the only existing store
/// if there is exactly one, otherwise a fresh import of the quizfile named by
/// SWOT_QUIZFILE.
fn resolve_store_name(config: &Config, options: &TakeOptions) -> Result<String> {
    if let Some(ref name) = options.name {
        return Ok(name.clone());
    }

    let mut stores = persistence::list_stores(config);
    if stores.len() == 1 {
        return Ok(stores.remove(0));
    }

    if stores.is_empty() {
        if let Some(ref quizfile) = config.quizfile {
            let quizfile = quizfile.clone();
            return import_quizfile(config, &quizfile, None, false);
        }
    }

    Err(QuizError::NoQuizSelected)
}

/// The main function for the `import` subcommand.
fn main_import(config: &Config, options: &ImportOptions) -> Result<()> {
    persistence::require_app_dir(config)?;

    let path = match options.path {
        Some(ref path) => path.clone(),
        None => config
            .quizfile
            .clone()
            .ok_or(QuizError::QuizfileNotSpecified)?,
    };

    import_quizfile(
        config,
        &path,
        options.name.as_ref().map(|s| s.as_str()),
        options.force,
    )?;
    Ok(())
}

/// Parse a quizfile and seed a new store with it, returning the store's name.
fn import_quizfile(
    config: &Config,
    path: &Path,
    name: Option<&str>,
    force: bool,
) -> Result<String> {
    let name = match name {
        Some(name) => String::from(name),
        None => path
            .file_stem()
            .map(|stem| String::from(stem.to_string_lossy()))
            .ok_or_else(|| QuizError::QuizfileNotFound(path.to_path_buf()))?,
    };

    let quizfile = parser::parse(path)?;

    let store_path = persistence::get_store_path(config, &name);
    if store_path.exists() {
        if force {
            fs::remove_file(&store_path).map_err(QuizError::Io)?;
        } else {
            return Err(QuizError::StoreExists(name));
        }
    }

    let mut store = Store::open(&store_path)?;
    store.create_schema()?;
    store.import(&quizfile)?;

    let mut stdout = std::io::stdout();
    my_writeln!(
        stdout,
        "Imported {} question(s) into '{}'.",
        quizfile.questions.len(),
        name
    )?;
    Ok(name)
}

/// The main function for the `ls` subcommand.
fn main_ls(config: &Config) -> Result<()> {
    let names = persistence::list_stores(config);
    let mut stdout = std::io::stdout();
    if names.is_empty() {
        my_writeln!(stdout, "No quiz stores found.")?;
    } else {
        my_writeln!(stdout, "Available quiz stores:")?;
        for name in names.iter() {
            my_writeln!(stdout, "  {}", name)?;
        }
    }
    Ok(())
}

/// The main function for the `path` subcommand.
fn main_path(config: &Config, options: &PathOptions) -> Result<()> {
    let path = persistence::get_store_path(config, &options.name);
    if path.exists() || options.force {
        let mut stdout = std::io::stdout();
        my_writeln!(stdout, "{}", path.as_path().to_string_lossy())?;
        Ok(())
    } else {
        Err(QuizError::QuizNotFound(options.name.clone()))
    }
}

/// The main function for the `rm` subcommand.
fn main_rm(config: &Config, options: &RmOptions) -> Result<()> {
    let path = persistence::get_store_path(config, &options.name);
    if path.exists() {
        let prompt = format!("Are you sure you want to delete '{}'? ", options.name);
        if options.force || confirm(&prompt) {
            fs::remove_file(&path).map_err(QuizError::Io)?;
        }
        Ok(())
    } else {
        Err(QuizError::QuizNotFound(options.name.clone()))
    }
}

fn confirm(message: &str) -> bool {
    let mut editor = rustyline::Editor::<()>::new();
    match editor.readline(message) {
        Ok(response) => response.trim_start().to_lowercase().starts_with('y'),
        Err(_) => false,
    }
}
