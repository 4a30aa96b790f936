//! Interactive prompting over stdin.
//!
//! Implements the engine's input collaborator for a terminal: plain
//! line-based input, a numbered choice list for parameters with allowed
//! values, and no-echo reads for sensitive parameters.

use std::io::{stdin, stdout, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use switchyard_core::error::Result;
use switchyard_core::prompt::PromptInput;
use switchyard_core::value::Value;

/// Prompter that asks on stdout and reads answers from stdin.
#[derive(Default)]
pub struct StdinPrompter;

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // Disable raw mode on drop
        let _ = disable_raw_mode();
    }
}

impl StdinPrompter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PromptInput for StdinPrompter {
    fn solicit(
        &mut self,
        prompt_text: &str,
        hide_echo: bool,
        choices: Option<&[Value]>,
    ) -> Result<String> {
        if let Some(choices) = choices {
            print_choices(choices);
        }

        print!("{prompt_text}: ");
        stdout().flush()?;

        let answer = if hide_echo {
            read_without_echo()?
        } else {
            read_line()?
        };

        // A number picks from the choice list; anything else passes through
        // for the engine to validate
        if let Some(choices) = choices {
            if let Ok(index) = answer.trim().parse::<usize>() {
                if (1..=choices.len()).contains(&index) {
                    return Ok(choices[index - 1].to_string());
                }
            }
        }

        Ok(answer)
    }
}

fn print_choices(choices: &[Value]) {
    for (index, choice) in choices.iter().enumerate() {
        println!("  {}) {}", index + 1, choice);
    }
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Read a line without echoing typed characters back to the terminal.
fn read_without_echo() -> Result<String> {
    enable_raw_mode()?;
    let _guard = RawModeGuard;

    let mut buffer = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Enter => break,
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::Interrupted,
                        "input interrupted",
                    )
                    .into());
                }
                KeyCode::Char(character) => buffer.push(character),
                _ => {}
            }
        }
    }

    println!();
    Ok(buffer.trim().to_string())
}
