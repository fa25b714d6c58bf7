use super::registry::ToolRegistry;
use super::{ToolCallRequest, ToolDescriptor, ToolName};
use crate::core::error::ToolError;
use crate::home::DEFAULT_LAMP;
use crate::providers::Message;
use futures::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Lamp a call would read or change, when its arguments name one.
fn lamp_target(call: &ToolCallRequest) -> Option<String> {
    let tool = ToolName::from_name(&call.name)?;
    let args = tool.descriptor().validate(&call.arguments).ok()?;
    let name = args.get("name").and_then(Value::as_str);
    match tool {
        ToolName::AddLamp => name.map(str::to_string),
        ToolName::ToggleLamp => Some(name.unwrap_or(DEFAULT_LAMP).to_string()),
        _ => None,
    }
}

pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one tool call, paired with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub call: ToolCallRequest,
    pub result: Result<String, ToolError>,
}

impl ToolOutcome {
    pub fn is_error(&self) -> bool {
        self.result.is_err()
    }

    /// Text handed back to the model.
    pub fn content(&self) -> String {
        match &self.result {
            Ok(output) => output.clone(),
            Err(e) => format!("Error: {}", e),
        }
    }

    pub fn to_message(&self) -> Message {
        Message::tool(self.content(), self.call.id.clone())
    }
}

/// Resolves the model's tool calls against the registry and runs them.
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &[ToolDescriptor] {
        self.registry.catalog()
    }

    /// Runs a single call. Every failure mode comes back as a `ToolError`.
    pub async fn execute(&self, call: &ToolCallRequest) -> Result<String, ToolError> {
        let (descriptor, handler) = self.registry.resolve(&call.name)?;
        let args = descriptor.validate(&call.arguments)?;

        debug!(tool = %call.name, id = ?call.id, "invoking tool");
        match tokio::time::timeout(self.timeout, handler.call(&args)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::failure(
                descriptor.name(),
                format!("timed out after {:?}", self.timeout),
            )),
        }
    }

    /// Runs all calls concurrently, except that calls touching the same lamp
    /// run one after another in request order. Outcomes are returned in
    /// request order, whatever order the handlers finish in.
    pub async fn execute_all(&self, calls: &[ToolCallRequest]) -> Vec<ToolOutcome> {
        let mut lanes: Vec<Vec<usize>> = Vec::new();
        let mut lane_for_lamp: HashMap<String, usize> = HashMap::new();
        for (index, call) in calls.iter().enumerate() {
            match lamp_target(call) {
                Some(lamp) => match lane_for_lamp.get(&lamp) {
                    Some(&lane) => lanes[lane].push(index),
                    None => {
                        lane_for_lamp.insert(lamp, lanes.len());
                        lanes.push(vec![index]);
                    }
                },
                None => lanes.push(vec![index]),
            }
        }

        let finished = join_all(lanes.iter().map(|lane| async move {
            let mut outcomes = Vec::with_capacity(lane.len());
            for &index in lane {
                outcomes.push((index, self.run(&calls[index]).await));
            }
            outcomes
        }))
        .await;

        let mut slots: Vec<Option<ToolOutcome>> = vec![None; calls.len()];
        for (index, outcome) in finished.into_iter().flatten() {
            slots[index] = Some(outcome);
        }
        slots.into_iter().flatten().collect()
    }

    async fn run(&self, call: &ToolCallRequest) -> ToolOutcome {
        let result = self.execute(call).await;
        if let Err(e) = &result {
            warn!(tool = %call.name, error = %e, "tool call failed");
        }
        ToolOutcome {
            call: call.clone(),
            result,
        }
    }

    /// Executes `calls` and appends exactly one `tool` message per call to
    /// `history`, in request order.
    pub async fn dispatch(
        &self,
        calls: &[ToolCallRequest],
        history: &mut Vec<Message>,
    ) -> Vec<ToolOutcome> {
        let outcomes = self.execute_all(calls).await;
        history.extend(outcomes.iter().map(ToolOutcome::to_message));
        outcomes
    }
}
