//! Terminal prompter backed by `dialoguer`.

use async_trait::async_trait;
use atlas_nav::{NavError, NavResult, Prompter};
use colored::Colorize;
use dialoguer::{Confirm, Input};

/// Prompts on the controlling terminal.
///
/// dialoguer blocks, so every read runs under `block_in_place` to keep the
/// album preload and other tasks moving on the remaining workers.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl ConsolePrompter {
    pub fn new() -> Self {
        Self
    }
}

fn prompt_error(e: dialoguer::Error) -> NavError {
    NavError::Prompt(format!("terminal input failed: {e}"))
}

#[async_trait]
impl Prompter for ConsolePrompter {
    fn heading(&self, title: &str) {
        println!();
        println!("{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(title.chars().count()).bright_cyan());
    }

    fn say(&self, text: &str) {
        println!("{text}");
    }

    fn warn(&self, text: &str) {
        println!("{} {}", "!".yellow().bold(), text.yellow());
    }

    async fn ask(&self, prompt: &str, initial: Option<&str>) -> NavResult<String> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(initial) = initial {
            input = input.with_initial_text(initial);
        }
        tokio::task::block_in_place(|| input.interact_text()).map_err(prompt_error)
    }

    async fn confirm(&self, question: &str) -> NavResult<bool> {
        let confirm = Confirm::new().with_prompt(question).default(false);
        tokio::task::block_in_place(|| confirm.interact()).map_err(prompt_error)
    }
}
