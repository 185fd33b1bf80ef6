//! Operator interaction.
//!
//! [`Prompter`] is the seam between workflows and the terminal. The binary
//! supplies a console implementation; tests drive workflows with
//! [`ScriptedPrompter`].

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{NavError, NavResult};
use crate::selection::{parse_selection, parse_text, parse_yes, Controls, Selection, TextInput};

/// Terminal operations used by workflows.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Start a new screen with `title`.
    fn heading(&self, title: &str);

    /// Show one line of output.
    fn say(&self, text: &str);

    /// Show a problem the operator should notice.
    fn warn(&self, text: &str);

    /// Read one line. With `initial`, the line starts prefilled and an
    /// unchanged answer returns it.
    async fn ask(&self, prompt: &str, initial: Option<&str>) -> NavResult<String>;

    /// Ask a yes/no question.
    async fn confirm(&self, question: &str) -> NavResult<bool>;
}

/// Ask until the answer is an acceptable choice in `[min, max]`.
///
/// Rejected input is reported and re-prompted; it never leaves this loop.
pub async fn choose(
    prompter: &dyn Prompter,
    prompt: &str,
    min: usize,
    max: usize,
    controls: Controls,
) -> NavResult<Selection> {
    let hint = controls.hint();
    let prompt = if hint.is_empty() {
        prompt.to_string()
    } else {
        format!("{prompt} ({hint})")
    };
    loop {
        let answer = prompter.ask(&prompt, None).await?;
        match parse_selection(&answer, min, max, controls) {
            Selection::Rejected(reason) => {
                tracing::debug!(input = %answer, ?reason, "selection rejected");
                prompter.warn(&reason.to_string());
            }
            selection => return Ok(selection),
        }
    }
}

/// Ask until the answer is non-empty text or a navigation token.
pub async fn ask_text(prompter: &dyn Prompter, prompt: &str) -> NavResult<TextInput> {
    loop {
        match parse_text(&prompter.ask(prompt, None).await?) {
            TextInput::Text(text) if text.is_empty() => prompter.warn("A value is required"),
            input => return Ok(input),
        }
    }
}

/// A [`Prompter`] that answers from a fixed script and records everything
/// shown.
///
/// Running out of answers is a [`NavError::Prompt`], like a closed stdin.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    transcript: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            transcript: Mutex::new(Vec::new()),
        }
    }

    /// Every line shown or asked so far.
    pub fn transcript(&self) -> Vec<String> {
        self.transcript.lock().expect("lock poisoned").clone()
    }

    /// Whether any transcript line contains `needle`.
    pub fn saw(&self, needle: &str) -> bool {
        self.transcript
            .lock()
            .expect("lock poisoned")
            .iter()
            .any(|line| line.contains(needle))
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.lock().expect("lock poisoned").len()
    }

    fn record(&self, line: String) {
        self.transcript.lock().expect("lock poisoned").push(line);
    }

    fn next_answer(&self, prompt: &str) -> NavResult<String> {
        self.answers
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .ok_or_else(|| NavError::Prompt(format!("script exhausted at {prompt:?}")))
    }
}

impl std::fmt::Debug for ScriptedPrompter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedPrompter")
            .field("remaining", &self.remaining())
            .field("lines", &self.transcript.lock().expect("lock poisoned").len())
            .finish()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    fn heading(&self, title: &str) {
        self.record(format!("== {title} =="));
    }

    fn say(&self, text: &str) {
        self.record(text.to_string());
    }

    fn warn(&self, text: &str) {
        self.record(format!("! {text}"));
    }

    async fn ask(&self, prompt: &str, initial: Option<&str>) -> NavResult<String> {
        let answer = self.next_answer(prompt)?;
        let answer = match initial {
            Some(initial) if answer.is_empty() => initial.to_string(),
            _ => answer,
        };
        self.record(format!("{prompt} > {answer}"));
        Ok(answer)
    }

    async fn confirm(&self, question: &str) -> NavResult<bool> {
        let answer = self.next_answer(question)?;
        self.record(format!("{question} [y/n] > {answer}"));
        Ok(parse_yes(&answer))
    }
}
