//! Interactive prompts

use dialoguer::{Confirm, Input, Password};

use crate::types::{Result, TglError};

/// Source of user answers
pub trait Prompter {
    /// Free text, may be empty
    fn input(&self, prompt: &str) -> Result<String>;

    /// Hidden text, may be empty
    fn password(&self, prompt: &str) -> Result<String>;

    /// y/N question, defaulting to no
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Prompts on the controlling terminal
pub struct TerminalPrompter;

fn prompt_error(e: dialoguer::Error) -> TglError {
    TglError::Prompt(e.to_string())
}

impl Prompter for TerminalPrompter {
    fn input(&self, prompt: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)
    }

    fn password(&self, prompt: &str) -> Result<String> {
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(prompt_error)
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(prompt_error)
    }
}

/// Replays canned answers in order
#[cfg(test)]
pub(crate) struct ScriptedPrompter {
    answers: std::cell::RefCell<std::collections::VecDeque<String>>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: std::cell::RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, prompt: &str) -> Result<String> {
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| TglError::Prompt(format!("no scripted answer for '{}'", prompt)))
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn input(&self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    fn password(&self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        Ok(self.next(prompt)?.eq_ignore_ascii_case("y"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_prompter_replays_in_order() {
        let prompter = ScriptedPrompter::new(&["first", "y", "n"]);
        assert_eq!(prompter.input("a").unwrap(), "first");
        assert!(prompter.confirm("b").unwrap());
        assert!(!prompter.confirm("c").unwrap());
        assert_eq!(prompter.remaining(), 0);
        assert!(matches!(prompter.input("d"), Err(TglError::Prompt(_))));
    }
}
