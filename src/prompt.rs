use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::error::{InputError, SetupError};
use crate::site::parse_yes_no;

/// Line-oriented conversation with the operator
pub trait Prompter {
    /// Show `question` and read one line. `None` means input is closed.
    fn ask(&mut self, question: &str) -> Result<Option<String>>;

    /// Show an informational line
    fn say(&mut self, message: &str);
}

/// Prompter bound to the process's stdin/stdout
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{} ", question)?;
        stdout.flush()?;

        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            println!();
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Ask until `parse` accepts the answer.
///
/// A blank answer is replaced by `default` when one is given; the default
/// goes through `parse` like anything typed.
pub fn prompt_until_valid<T, F>(
    prompter: &mut dyn Prompter,
    question: &str,
    default: Option<&str>,
    parse: F,
) -> Result<T, SetupError>
where
    F: Fn(&str) -> Result<T, InputError>,
{
    let question = match default {
        Some(d) if !d.is_empty() => format!("{} [{}]:", question, d),
        _ => format!("{}:", question),
    };

    loop {
        let answer = prompter
            .ask(&question)?
            .ok_or_else(|| SetupError::Cancelled("input closed".into()))?;

        let answer = match default {
            Some(d) if answer.trim().is_empty() => d.to_string(),
            _ => answer,
        };

        match parse(&answer) {
            Ok(value) => return Ok(value),
            Err(e) => prompter.say(&format!("✗ {}", e)),
        }
    }
}

/// Yes/no question; blank takes `default`
pub fn confirm(
    prompter: &mut dyn Prompter,
    question: &str,
    default: bool,
) -> Result<bool, SetupError> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let question = format!("{} {}", question, hint);

    prompt_until_valid(prompter, &question, None, |answer| match parse_yes_no(answer) {
        Err(InputError::Empty) => Ok(default),
        other => other,
    })
}
