use crate::commands::dispatcher::CommandDispatcher;
use crate::core::error::HomechatError;

use console::style;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::{self, MatchingBracketValidator, Validator};
use rustyline::{CompletionType, Config, Context, EditMode, Editor, Helper};
use std::borrow::Cow;
use std::path::PathBuf;

/// Completes slash commands from the command registry.
pub struct CommandCompleter {
    commands: CommandDispatcher,
}

impl CommandCompleter {
    pub fn new(commands: CommandDispatcher) -> Self {
        Self { commands }
    }

    fn candidates(&self, line: &str, pos: usize) -> Vec<Pair> {
        let Some(typed) = line.get(1..pos).filter(|_| line.starts_with('/')) else {
            return Vec::new();
        };
        if typed.contains(char::is_whitespace) {
            return Vec::new();
        }
        self.commands
            .get_command_names()
            .into_iter()
            .filter(|cmd| cmd.starts_with(typed))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd,
            })
            .collect()
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // 1 is the position after '/'
        Ok((1, self.candidates(line, pos)))
    }
}

pub struct ChatHelper {
    completer: CommandCompleter,
    highlighter: MatchingBracketHighlighter,
    hinter: HistoryHinter,
    validator: MatchingBracketValidator,
}

impl ChatHelper {
    pub fn new(commands: CommandDispatcher) -> Self {
        Self {
            completer: CommandCompleter::new(commands),
            highlighter: MatchingBracketHighlighter::new(),
            hinter: HistoryHinter {},
            validator: MatchingBracketValidator::new(),
        }
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.completer.complete(line, pos, ctx)
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(style(hint).dim().to_string())
    }

    fn highlight_candidate<'c>(
        &self,
        candidate: &'c str,
        completion: CompletionType,
    ) -> Cow<'c, str> {
        self.highlighter.highlight_candidate(candidate, completion)
    }
}

impl Validator for ChatHelper {
    fn validate(
        &self,
        ctx: &mut validate::ValidationContext,
    ) -> rustyline::Result<validate::ValidationResult> {
        self.validator.validate(ctx)
    }

    fn validate_while_typing(&self) -> bool {
        self.validator.validate_while_typing()
    }
}

fn history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".homechat")
        .join("input_history.txt")
}

pub fn create_editor(
    commands: CommandDispatcher,
) -> Result<Editor<ChatHelper, FileHistory>, HomechatError> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| HomechatError::Input(format!("Failed to create line editor: {}", e)))?;
    editor.set_helper(Some(ChatHelper::new(commands)));
    // Missing on first run.
    let _ = editor.load_history(&history_path());

    Ok(editor)
}

/// Reads one line. `None` means the user asked to leave (Ctrl-C or Ctrl-D).
pub fn read_input(
    editor: &mut Editor<ChatHelper, FileHistory>,
) -> Result<Option<String>, HomechatError> {
    let prompt = style("> ").bold().cyan().to_string();
    match editor.readline(&prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                editor
                    .add_history_entry(line.as_str())
                    .map_err(|e| HomechatError::Input(format!("Failed to add history entry: {}", e)))?;
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!("Exiting...");
            Ok(None)
        }
        Err(err) => Err(HomechatError::Input(format!("Input error: {}", err))),
    }
}

pub fn save_history(editor: &mut Editor<ChatHelper, FileHistory>) -> Result<(), HomechatError> {
    let path = history_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    editor
        .save_history(&path)
        .map_err(|e| HomechatError::Input(format!("Failed to save history: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_command_registry;

    fn names(pairs: Vec<Pair>) -> Vec<String> {
        pairs.into_iter().map(|p| p.replacement).collect()
    }

    #[test]
    fn completes_slash_commands_by_prefix() {
        let completer = CommandCompleter::new(create_command_registry());
        assert_eq!(names(completer.candidates("/h", 2)), vec!["help", "home"]);
        assert_eq!(names(completer.candidates("/q", 2)), vec!["quit"]);
    }

    #[test]
    fn plain_text_gets_no_candidates() {
        let completer = CommandCompleter::new(create_command_registry());
        assert!(completer.candidates("hello", 5).is_empty());
        assert!(completer.candidates("/model gpt", 10).is_empty());
    }
}
