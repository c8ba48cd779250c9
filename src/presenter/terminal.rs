use std::io::{self, BufRead, Write};

use tracing::debug;

use super::{render, Choice, Dialog, DismissReason, FormInput, Surface};

/// Prints dialogs to stdout and reads the choice from stdin.
///
/// With no terminal on stdin every dialog is dismissed, so scripted runs never block.
pub struct TerminalSurface {
    interactive: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            interactive: atty::is(atty::Stream::Stdin),
        }
    }

    /// Force non-interactive behaviour regardless of stdin.
    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    fn read_line(prompt: &str) -> Option<String> {
        print!("{}", prompt);
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    fn read_fields(dialog: &Dialog) -> Option<FormInput> {
        let mut input = FormInput::new();
        for field in &dialog.fields {
            let prompt = if field.value.is_empty() {
                format!("{}: ", field.label)
            } else {
                format!("{} [{}]: ", field.label, field.value)
            };
            let line = Self::read_line(&prompt)?;
            if !line.is_empty() {
                input.insert(field.name.clone(), line);
            }
        }
        Some(input)
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TerminalSurface {
    fn show(&mut self, dialog: &Dialog) -> Choice {
        println!("{}", render(dialog));

        if !self.interactive {
            debug!(title = %dialog.title, "No terminal attached, dismissing dialog");
            return Choice::Dismissed(DismissReason::NoUser);
        }

        let input = if dialog.fields.is_empty() {
            FormInput::new()
        } else {
            match Self::read_fields(dialog) {
                Some(input) => input,
                None => return Choice::Dismissed(DismissReason::CloseControl),
            }
        };

        loop {
            let Some(line) = Self::read_line("Choose an action (empty to close): ") else {
                return Choice::Dismissed(DismissReason::CloseControl);
            };
            let line = line.trim();
            if line.is_empty() || line.eq_ignore_ascii_case("q") {
                return Choice::Dismissed(DismissReason::CloseControl);
            }
            match line.parse::<usize>() {
                Ok(n) if n >= 1 && n <= dialog.actions.len() => {
                    return Choice::Selected {
                        action: dialog.actions[n - 1].key.clone(),
                        input,
                    };
                }
                _ => println!("Enter a number between 1 and {}", dialog.actions.len()),
            }
        }
    }

    fn release(&mut self) {
        let _ = io::stdout().flush();
    }
}
