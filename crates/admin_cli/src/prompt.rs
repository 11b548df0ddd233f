//! Masked password entry.
//!
//! [`MaskedLine`] holds the key handling so it can be driven without a
//! terminal; [`read_masked`] wires it to crossterm in raw mode.

use std::io::Write;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};

use crate::AdminResult;

/// What the terminal should do after a key press.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Keystroke {
    Masked,
    Erased,
    Ignored,
    Submitted,
    Cancelled,
}

#[derive(Debug, Default)]
pub(crate) struct MaskedLine {
    input: String,
}

impl MaskedLine {
    pub(crate) fn press(&mut self, key: KeyEvent) -> Keystroke {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => Keystroke::Submitted,
            KeyCode::Esc => Keystroke::Cancelled,
            KeyCode::Char('c' | 'd') if control => Keystroke::Cancelled,
            KeyCode::Backspace => match self.input.pop() {
                Some(_) => Keystroke::Erased,
                None => Keystroke::Ignored,
            },
            KeyCode::Char(ch) if !control => {
                self.input.push(ch);
                Keystroke::Masked
            }
            _ => Keystroke::Ignored,
        }
    }

    pub(crate) fn into_inner(self) -> String {
        self.input
    }
}

struct RawMode;

impl RawMode {
    fn enable() -> AdminResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads one line from the terminal, echoing `*` per character.
pub(crate) fn read_masked(label: &str) -> AdminResult<String> {
    let _raw = RawMode::enable()?;
    let mut err = std::io::stderr();
    execute!(
        err,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(label)
    )?;

    let mut line = MaskedLine::default();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match line.press(key) {
            Keystroke::Masked => execute!(err, Print('*'))?,
            Keystroke::Erased => {
                execute!(err, cursor::MoveLeft(1), Print(' '), cursor::MoveLeft(1))?;
            }
            Keystroke::Ignored => {}
            Keystroke::Submitted => {
                execute!(err, Print("\r\n"))?;
                return Ok(line.into_inner());
            }
            Keystroke::Cancelled => {
                execute!(err, Print("\r\n"))?;
                return Err("password entry cancelled".into());
            }
        }
        err.flush()?;
    }
}

/// Asks for a password and its confirmation until both match.
///
/// `read` is called with the label to show; `warn` receives the reason an
/// attempt was refused.
pub(crate) fn new_password(
    attempts: usize,
    mut read: impl FnMut(&str) -> AdminResult<String>,
    mut warn: impl FnMut(&str),
) -> AdminResult<String> {
    for _ in 0..attempts {
        let password = read("New password: ")?;
        if password.is_empty() {
            warn("The password must not be empty.");
            continue;
        }
        if read("Repeat password: ")? == password {
            return Ok(password);
        }
        warn("The passwords differ.");
    }
    Err(format!("no matching password after {attempts} attempts").into())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn masked_line_edits_and_submits() {
        let mut line = MaskedLine::default();
        assert_eq!(line.press(key(KeyCode::Backspace)), Keystroke::Ignored);
        for ch in "pass".chars() {
            assert_eq!(line.press(key(KeyCode::Char(ch))), Keystroke::Masked);
        }
        assert_eq!(line.press(key(KeyCode::Backspace)), Keystroke::Erased);
        assert_eq!(line.press(key(KeyCode::Left)), Keystroke::Ignored);
        assert_eq!(line.press(key(KeyCode::Enter)), Keystroke::Submitted);
        assert_eq!(line.into_inner(), "pas");
    }

    #[test]
    fn control_keys_cancel_instead_of_typing() {
        let mut line = MaskedLine::default();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(line.press(ctrl_c), Keystroke::Cancelled);
        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(line.press(ctrl_a), Keystroke::Ignored);
        assert_eq!(line.into_inner(), "");
    }

    #[test]
    fn password_needs_a_matching_confirmation() {
        let mut answers: VecDeque<&str> = ["", "one", "two", "three", "three"].into();
        let mut warnings = Vec::new();
        let password = new_password(
            3,
            |_| Ok(answers.pop_front().unwrap_or_default().to_string()),
            |reason| warnings.push(reason.to_string()),
        )
        .unwrap();
        assert_eq!(password, "three");
        assert_eq!(
            warnings,
            ["The password must not be empty.", "The passwords differ."]
        );
    }

    #[test]
    fn password_attempts_run_out() {
        let result = new_password(2, |_| Ok(String::new()), |_| {});
        assert!(result.is_err());
    }
}
