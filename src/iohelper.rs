/**
 * Helper macros and functions for output.
 */
use std::io::Write;

use colored::*;

use super::common::{QuizError, Result};

#[macro_export]
macro_rules! my_writeln {
    ($dst:expr, $($arg:tt)*) => (
        writeln!($dst, $($arg)*).map_err(QuizError::Io)
    );
}

#[macro_export]
macro_rules! my_write {
    ($dst:expr, $($arg:tt)*) => (
        write!($dst, $($arg)*).map_err(QuizError::Io)
    );
}

/// Print `message` to the writer, breaking lines according to the current
/// width of the terminal. Prepend `prefix` to the first line and indent all
/// subsequent lines by its length.
pub fn prettyprint<W: Write>(writer: &mut W, message: &str, prefix: &str) -> Result<()> {
    prettyprint_colored(writer, message, prefix, None, None)
}

pub fn prettyprint_colored<W: Write>(
    writer: &mut W,
    message: &str,
    prefix: &str,
    message_color: Option<Color>,
    prefix_color: Option<Color>,
) -> Result<()> {
    let width = textwrap::termwidth().saturating_sub(prefix.len());
    let mut lines = textwrap::wrap_iter(message, width);

    if let Some(first_line) = lines.next() {
        let colored_prefix = color_optional(&prefix, prefix_color);
        let colored_line = color_optional(&first_line, message_color);
        my_writeln!(writer, "{}{}", colored_prefix, colored_line)?;
    }

    let indent = " ".repeat(prefix.len());
    for line in lines {
        let colored_line = color_optional(&line, message_color);
        my_writeln!(writer, "{}{}", indent, colored_line)?;
    }
    Ok(())
}

fn color_optional(text: &str, color: Option<Color>) -> ColoredString {
    if let Some(color) = color {
        text.color(color)
    } else {
        text.normal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_wider_than_the_terminal_does_not_panic() {
        let prefix = " ".repeat(500);
        let mut output = Vec::new();
        prettyprint(&mut output, "hello world", &prefix).unwrap();
        assert!(String::from_utf8_lossy(&output).contains("hello"));
    }
}
