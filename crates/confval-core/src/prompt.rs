//! Interactive prompts
//!
//! A [`Prompter`] shows a label and returns one line of input. The label is
//! built from [`PromptOptions`]; when the user enters nothing the configured
//! default string is used, and if there is none the answer is empty, which
//! sources treat as absence. Prompts that mask their default or hide typing
//! are secret: errors about their answers never show the answer.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::error::{Error, Result, MASK};

/// How to present a prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptOptions {
    /// Text shown to the user
    pub prompt: String,
    /// Shown in brackets and returned when the user enters nothing
    pub default_str: Option<String>,
    /// Show the default as `********` (for secrets)
    pub mask_default: bool,
    /// Omit the `:` after the prompt text
    pub skip_trailing_colon: bool,
    /// Do not echo what the user types
    pub hide_typing: bool,
}

impl PromptOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_default_str(mut self, default: impl Into<String>) -> Self {
        self.default_str = Some(default.into());
        self
    }

    pub fn mask_default(mut self) -> Self {
        self.mask_default = true;
        self
    }

    pub fn skip_trailing_colon(mut self) -> Self {
        self.skip_trailing_colon = true;
        self
    }

    pub fn hide_typing(mut self) -> Self {
        self.hide_typing = true;
        self
    }

    /// Whether answers must be kept out of error messages
    pub fn is_secret(&self) -> bool {
        self.mask_default || self.hide_typing
    }

    /// The full label, e.g. `Replicas [1]: `
    pub fn label(&self) -> String {
        let mut label = self.prompt.clone();
        if let Some(default) = self.default_str.as_deref().filter(|d| !d.is_empty()) {
            let shown = if self.mask_default { MASK } else { default };
            label.push_str(&format!(" [{}]", shown));
        }
        if !self.skip_trailing_colon {
            label.push(':');
        }
        label.push(' ');
        label
    }
}

/// Reads one line of user input
pub trait Prompter: Send + Sync {
    /// Show the prompt and return the raw line, without its line terminator.
    /// End of input yields an empty string.
    fn read_line(&self, options: &PromptOptions) -> io::Result<String>;
}

/// Prompts on stderr and reads from stdin. With `hide_typing` the terminal
/// is switched to raw mode so keystrokes are not echoed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn read_line(&self, options: &PromptOptions) -> io::Result<String> {
        let mut stderr = io::stderr().lock();
        stderr.write_all(options.label().as_bytes())?;
        stderr.flush()?;

        if options.hide_typing {
            enable_raw_mode()?;
            let line = read_hidden();
            disable_raw_mode()?;
            stderr.write_all(b"\n")?;
            return line;
        }

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

/// Collect key presses until Enter. Must run in raw mode.
fn read_hidden() -> io::Result<String> {
    let mut line = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(line),
            KeyCode::Char('c') | KeyCode::Char('d')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "input cancelled"));
            }
            KeyCode::Char(c) => line.push(c),
            KeyCode::Backspace => {
                line.pop();
            }
            _ => {}
        }
    }
}

/// Answers prompts from a fixed queue. Once the queue is exhausted every
/// answer is empty.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    labels: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            labels: Mutex::new(Vec::new()),
        }
    }

    /// Labels shown so far, in order
    pub fn labels(&self) -> Vec<String> {
        self.labels
            .lock()
            .map(|labels| labels.clone())
            .unwrap_or_default()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&self, options: &PromptOptions) -> io::Result<String> {
        if let Ok(mut labels) = self.labels.lock() {
            labels.push(options.label());
        }
        let mut answers = self
            .answers
            .lock()
            .map_err(|_| io::Error::other("scripted prompter lock poisoned"))?;
        Ok(answers.pop_front().unwrap_or_default())
    }
}

/// Ask once, falling back to the default string on empty input
pub fn ask(prompter: &dyn Prompter, options: &PromptOptions) -> Result<String> {
    let line = prompter
        .read_line(options)
        .map_err(|e| Error::prompt(e.to_string()))?;
    if line.is_empty() {
        return Ok(options.default_str.clone().unwrap_or_default());
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_label_formats() {
        assert_eq!(PromptOptions::new("Replicas").label(), "Replicas: ");
        assert_eq!(
            PromptOptions::new("Replicas").with_default_str("1").label(),
            "Replicas [1]: "
        );
        assert_eq!(
            PromptOptions::new("Token")
                .with_default_str("s3cr3t")
                .mask_default()
                .label(),
            "Token [********]: "
        );
        assert_eq!(
            PromptOptions::new("Continue?").skip_trailing_colon().label(),
            "Continue? "
        );
        // Hidden typing does not change the label
        assert_eq!(
            PromptOptions::new("Password").hide_typing().label(),
            "Password: "
        );
    }

    #[test]
    fn test_secret_prompts() {
        assert!(!PromptOptions::new("Replicas").with_default_str("1").is_secret());
        assert!(PromptOptions::new("Token").with_default_str("x").mask_default().is_secret());
        assert!(PromptOptions::new("Password").hide_typing().is_secret());
    }

    #[test]
    fn test_ask_returns_answer() {
        let prompter = ScriptedPrompter::new(["3"]);
        let options = PromptOptions::new("Replicas").with_default_str("1");
        assert_eq!(ask(&prompter, &options).unwrap(), "3");
        assert_eq!(prompter.labels(), vec!["Replicas [1]: ".to_string()]);
    }

    #[test]
    fn test_ask_empty_uses_default_str() {
        let prompter = ScriptedPrompter::new([""]);
        let options = PromptOptions::new("Replicas").with_default_str("1");
        assert_eq!(ask(&prompter, &options).unwrap(), "1");
    }

    #[test]
    fn test_ask_empty_without_default_is_empty() {
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert_eq!(ask(&prompter, &PromptOptions::new("Name")).unwrap(), "");
    }

    struct BrokenPrompter;

    impl Prompter for BrokenPrompter {
        fn read_line(&self, _options: &PromptOptions) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed"))
        }
    }

    #[test]
    fn test_ask_read_failure() {
        let err = ask(&BrokenPrompter, &PromptOptions::new("Name")).unwrap_err();
        assert_eq!(err.to_string(), "failed to read prompt: stdin closed");
    }
}
