use super::ChatState;
use crate::core::error::HomechatError;
use crate::display::{self, DisplayMode};

use console::style;

pub trait CommandHandler {
    fn execute(&self, state: &mut ChatState, args: &[&str])
    -> Result<Option<String>, HomechatError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct HelpCommand;
pub struct ClearCommand;
pub struct ModelCommand;
pub struct HomeCommand;
pub struct DisplayCommand;

impl CommandHandler for QuitCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, HomechatError> {
        state.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit - Exit the chat session"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, HomechatError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = [
            title.to_string(),
            QuitCommand.help().to_string(),
            HelpCommand.help().to_string(),
            ClearCommand.help().to_string(),
            ModelCommand.help().to_string(),
            HomeCommand.help().to_string(),
            DisplayCommand.help().to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "/help - Show available commands"
    }
}

impl CommandHandler for ClearCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, HomechatError> {
        state.conversation.reset();
        Ok(Some("Chat history cleared.".to_string()))
    }

    fn help(&self) -> &'static str {
        "/clear - Clear conversation history"
    }
}

impl CommandHandler for ModelCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        args: &[&str],
    ) -> Result<Option<String>, HomechatError> {
        match args.first() {
            None => Ok(Some(format!(
                "Current model: {}",
                state.conversation.model()
            ))),
            Some(model) => {
                state.conversation.set_model(model);
                Ok(Some(format!(
                    "Model changed to: {}",
                    state.conversation.model()
                )))
            }
        }
    }

    fn help(&self) -> &'static str {
        "/model <name> - Show or change the current model"
    }
}

impl CommandHandler for HomeCommand {
    fn execute(
        &self,
        state: &mut ChatState,
        _args: &[&str],
    ) -> Result<Option<String>, HomechatError> {
        Ok(Some(display::format_lamps(&state.home.snapshot())))
    }

    fn help(&self) -> &'static str {
        "/home - Show every lamp and whether it is on"
    }
}

impl CommandHandler for DisplayCommand {
    fn execute(
        &self,
        _state: &mut ChatState,
        args: &[&str],
    ) -> Result<Option<String>, HomechatError> {
        let Some(mode) = args.first() else {
            return Ok(Some(
                "Usage: /display <mode> where mode is: verbose, minimal, hidden, or help"
                    .to_string(),
            ));
        };

        match *mode {
            "verbose" => {
                display::set_display_mode(DisplayMode::Verbose);
                Ok(Some(
                    "Display mode set to verbose - showing tool arguments and results".to_string(),
                ))
            }
            "minimal" => {
                display::set_display_mode(DisplayMode::Minimal);
                Ok(Some(
                    "Display mode set to minimal - showing basic tool activity".to_string(),
                ))
            }
            "hidden" => {
                display::set_display_mode(DisplayMode::Hidden);
                Ok(Some(
                    "Display mode set to hidden - hiding all tool activity".to_string(),
                ))
            }
            "help" => {
                display::display_mode_help();
                Ok(None)
            }
            _ => Ok(Some(
                "Unknown display mode. Use: verbose, minimal, hidden, or help".to_string(),
            )),
        }
    }

    fn help(&self) -> &'static str {
        "/display <mode> - Control tool activity visibility (verbose/minimal/hidden/help)"
    }
}
