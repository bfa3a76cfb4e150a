//! Prompt for the cmdargs REPL

use std::borrow::Cow;

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

use crate::parser::Tokenizer;

/// REPL prompt showing the active tokenizer policy
pub struct ArgsPrompt {
    tokenizer: Tokenizer,
}

impl ArgsPrompt {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }
}

impl Prompt for ArgsPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        match self.tokenizer {
            Tokenizer::LenientQuoted => "cmdargs> ".into(),
            other => format!("cmdargs [{other}]> ").into(),
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        "".into()
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        "... ".into()
    }

    /// Render the history search prompt
    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompt() {
        let prompt = ArgsPrompt::new(Tokenizer::LenientQuoted);
        assert_eq!(prompt.render_prompt_left(), "cmdargs> ");
    }

    #[test]
    fn test_prompt_names_other_tokenizers() {
        let prompt = ArgsPrompt::new(Tokenizer::Raw);
        assert_eq!(prompt.render_prompt_left(), "cmdargs [raw]> ");
    }

    #[test]
    fn test_right_prompt_empty() {
        let prompt = ArgsPrompt::new(Tokenizer::LenientQuoted);
        assert_eq!(prompt.render_prompt_right(), "");
        assert_eq!(prompt.render_prompt_indicator(PromptEditMode::Default), "");
    }
}
