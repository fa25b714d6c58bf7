//! One conversation with the chat service.
//!
//! A turn runs `Idle -> AwaitingModel(with tools) -> Dispatching ->
//! AwaitingModel(final) -> Idle`; only dispatch is skipped when the first
//! reply requests no tools. The final call always goes out without tools. Messages produced during a turn are
//! staged and committed to the history only when the turn completes, so a
//! failed chat-service call leaves the history exactly as it was.

use crate::core::error::HomechatError;
use crate::providers::{ChatProvider, Message};
use crate::tools::{ToolDescriptor, ToolDispatcher, ToolOutcome};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_CHAT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    AwaitingModel { with_tools: bool },
    Dispatching,
}

/// What a completed turn produced, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub reply: String,
    pub tools: Vec<ToolOutcome>,
}

pub struct Conversation {
    provider: Box<dyn ChatProvider>,
    dispatcher: ToolDispatcher,
    system_prompt: String,
    history: Vec<Message>,
    chat_timeout: Duration,
    phase: TurnPhase,
}

impl Conversation {
    pub fn new(
        provider: Box<dyn ChatProvider>,
        dispatcher: ToolDispatcher,
        system_prompt: impl Into<String>,
    ) -> Self {
        let system_prompt = system_prompt.into();
        Self {
            provider,
            dispatcher,
            history: vec![Message::system(system_prompt.clone())],
            system_prompt,
            chat_timeout: DEFAULT_CHAT_TIMEOUT,
            phase: TurnPhase::Idle,
        }
    }

    pub fn with_chat_timeout(mut self, timeout: Duration) -> Self {
        self.chat_timeout = timeout;
        self
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn set_model(&mut self, model: &str) {
        self.provider.set_model(model);
    }

    /// Drops everything but the system prompt.
    pub fn reset(&mut self) {
        self.history = vec![Message::system(self.system_prompt.clone())];
    }

    /// Runs one turn for `input`.
    ///
    /// Tool failures are handed to the model and never fail the turn. A
    /// chat-service failure aborts it and nothing from the turn is kept.
    pub async fn send(&mut self, input: &str) -> Result<TurnReport, HomechatError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(HomechatError::Input("message is empty".to_string()));
        }

        let result = self.run_turn(input).await;
        self.enter(TurnPhase::Idle);

        match result {
            Ok((staged, report)) => {
                self.history.extend(staged);
                Ok(report)
            }
            Err(e) => {
                warn!(error = %e, "turn aborted, history left unchanged");
                Err(e)
            }
        }
    }

    async fn run_turn(
        &mut self,
        input: &str,
    ) -> Result<(Vec<Message>, TurnReport), HomechatError> {
        let committed = self.history.len();
        let mut messages = self.history.clone();
        messages.push(Message::user(input));

        self.enter(TurnPhase::AwaitingModel { with_tools: true });
        let reply = self
            .call_model(&messages, Some(self.dispatcher.catalog()))
            .await?;

        // A plain first reply is a draft: the final call answers, so it is not kept.
        let outcomes = if reply.tool_calls.is_empty() {
            debug!("no tool calls requested, skipping dispatch");
            Vec::new()
        } else {
            let calls = reply.tool_calls.clone();
            messages.push(reply);

            self.enter(TurnPhase::Dispatching);
            info!(count = calls.len(), "dispatching tool calls");
            self.dispatcher.dispatch(&calls, &mut messages).await
        };

        self.enter(TurnPhase::AwaitingModel { with_tools: false });
        let answer = self.call_model(&messages, None).await?;
        if !answer.tool_calls.is_empty() {
            warn!(
                count = answer.tool_calls.len(),
                "ignoring tool calls in final reply"
            );
        }

        let report = TurnReport {
            reply: answer.content.clone(),
            tools: outcomes,
        };
        messages.push(Message::assistant(answer.content));
        Ok((messages.split_off(committed), report))
    }

    async fn call_model(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDescriptor]>,
    ) -> Result<Message, HomechatError> {
        match tokio::time::timeout(self.chat_timeout, self.provider.chat(messages, tools)).await {
            Ok(reply) => reply,
            Err(_) => Err(HomechatError::Service(format!(
                "chat service did not answer within {:?}",
                self.chat_timeout
            ))),
        }
    }

    fn enter(&mut self, phase: TurnPhase) {
        debug!(from = ?self.phase, to = ?phase, "turn phase");
        self.phase = phase;
    }
}
