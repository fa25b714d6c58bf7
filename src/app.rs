use crate::cli::Args;
use crate::commands::{ChatState, dispatcher::CommandDispatcher};
use crate::core::error::HomechatError;
use crate::display;
use crate::input;
use is_terminal::IsTerminal;
use std::io::{self, Read};
use tracing::debug;

pub struct Application {
    pub args: Args,
    pub state: ChatState,
    pub command_dispatcher: CommandDispatcher,
}

/// Combines the positional query with whatever was piped on stdin.
pub fn compose_query(query: Option<&str>, context: Option<&str>) -> Option<String> {
    match (query, context.filter(|c| !c.trim().is_empty())) {
        (Some(q), Some(ctx)) => Some(format!("<pipe>{}</pipe>\n\n{}", ctx, q)),
        (None, Some(ctx)) => Some(format!("<pipe>{}</pipe>", ctx)),
        (Some(q), None) => Some(q.to_string()),
        (None, None) => None,
    }
}

impl Application {
    pub fn new(args: Args, state: ChatState, command_dispatcher: CommandDispatcher) -> Self {
        Self {
            args,
            state,
            command_dispatcher,
        }
    }

    pub async fn run(&mut self) -> Result<(), HomechatError> {
        let context = if !io::stdin().is_terminal() {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| HomechatError::Input(format!("Failed to read from stdin: {}", e)))?;
            Some(buffer)
        } else {
            None
        };

        let query = compose_query(self.args.query.as_deref(), context.as_deref());
        match query {
            Some(query) if !self.args.chat => self.handle_single_turn(&query).await,
            query => self.handle_continuous_chat_mode(query).await,
        }
    }

    async fn handle_single_turn(&mut self, query: &str) -> Result<(), HomechatError> {
        let report = self.state.conversation.send(query).await?;
        display::display_tool_activity(&report.tools);
        display::display_reply(&report.reply);
        Ok(())
    }

    /// Runs one turn and shows its outcome. Failures are reported and the
    /// session goes on.
    async fn chat_turn(&mut self, input: &str) {
        match self.state.conversation.send(input).await {
            Ok(report) => {
                display::display_tool_activity(&report.tools);
                display::display_reply(&report.reply);
            }
            Err(e) => display::display_error(&e),
        }
    }

    fn handle_command(&mut self, line: &str) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((command, args)) = parts.split_first() else {
            return;
        };

        debug!(command, "slash command");
        match self
            .command_dispatcher
            .execute(command, args, &mut self.state)
        {
            Ok(Some(output)) => println!("{}", output),
            Ok(None) => {}
            Err(e) => eprintln!("Error executing command: {}", e),
        }
    }

    async fn handle_continuous_chat_mode(
        &mut self,
        first: Option<String>,
    ) -> Result<(), HomechatError> {
        println!(
            "Entering chat mode with {}. Type '/help' for available commands. Press Ctrl+D or type /quit to exit.",
            self.state.conversation.model()
        );

        if let Some(first) = first {
            self.chat_turn(&first).await;
        }

        let mut editor = input::create_editor(self.command_dispatcher.clone())?;

        while self.state.should_continue {
            let Some(line) = input::read_input(&mut editor)? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match line.strip_prefix('/') {
                Some(command) => self.handle_command(command),
                None => self.chat_turn(line).await,
            }
        }

        input::save_history(&mut editor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piped_context_is_wrapped() {
        assert_eq!(
            compose_query(Some("summarise"), Some("log line")).as_deref(),
            Some("<pipe>log line</pipe>\n\nsummarise")
        );
        assert_eq!(
            compose_query(None, Some("log line")).as_deref(),
            Some("<pipe>log line</pipe>")
        );
    }

    #[test]
    fn blank_pipe_is_ignored() {
        assert_eq!(compose_query(Some("hi"), Some("  \n")).as_deref(), Some("hi"));
        assert_eq!(compose_query(None, None), None);
    }
}
