//! Dispatch bridge between the remote agent's tool calls and local services
//!
//! The bridge is a strictly sequential event processor: it validates each
//! incoming tool call, runs the matching handler exactly once, and turns any
//! failure into a textual error result keyed by the originating call id. It is
//! the single point where errors become user-facing strings; nothing past
//! this boundary can crash the session.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::registry::FunctionRegistry;

/// Functions that put the conversation into ordering mode
const ORDERING_FUNCTIONS: [&str; 2] = ["start_new_order", "add_item_to_order"];

/// Functions that close out an in-progress order
const ORDER_CLOSING_FUNCTIONS: [&str; 2] = ["process_payment", "cancel_order"];

/// Functions that put the conversation into robot-control mode
const ROBOT_FUNCTIONS: [&str; 5] = [
    "move_forward",
    "move_backward",
    "turn_left",
    "turn_right",
    "stop",
];

/// Advisory conversation mode
///
/// Updated heuristically from which functions run. Context for the agent
/// only; it never gates which functions may be called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    #[default]
    General,
    Ordering,
    RobotControl,
}

impl ConversationMode {
    /// Wire/display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Ordering => "ordering",
            Self::RobotControl => "robot_control",
        }
    }

    /// Parse from user text
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "general" => Some(Self::General),
            "ordering" => Some(Self::Ordering),
            "robot_control" => Some(Self::RobotControl),
            _ => None,
        }
    }
}

/// Advisory conversation context shared between the bridge and the
/// `switch_mode` handler
#[derive(Debug, Default, Clone)]
pub struct ConversationContext {
    /// Current mode
    pub mode: ConversationMode,

    /// True between starting an order and paying for or cancelling it
    pub ordering_in_progress: bool,

    /// Total dispatches handled this session
    pub interaction_count: u64,
}

/// Result of one dispatched tool call, keyed by the originating call id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Call id from the external event, echoed back for correlation
    pub call_id: String,

    /// Handler output, or the error message on failure
    pub output: String,

    /// Whether the call succeeded
    pub ok: bool,
}

impl ToolResult {
    fn success(call_id: &str, output: String) -> Self {
        Self {
            call_id: call_id.to_string(),
            output,
            ok: true,
        }
    }

    fn failure(call_id: &str, message: String) -> Self {
        Self {
            call_id: call_id.to_string(),
            output: message,
            ok: false,
        }
    }
}

/// The function-calling dispatch bridge
pub struct DispatchBridge {
    registry: FunctionRegistry,
    context: Arc<Mutex<ConversationContext>>,
    /// Call ids already executed; repeats are rejected, never replayed
    seen_call_ids: HashSet<String>,
}

impl DispatchBridge {
    /// Create a bridge over a fully populated registry
    #[must_use]
    pub fn new(registry: FunctionRegistry, context: Arc<Mutex<ConversationContext>>) -> Self {
        Self {
            registry,
            context,
            seen_call_ids: HashSet::new(),
        }
    }

    /// The registry this bridge dispatches into
    #[must_use]
    pub const fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Snapshot of the advisory conversation context
    pub async fn context(&self) -> ConversationContext {
        self.context.lock().await.clone()
    }

    /// Dispatch one tool call
    ///
    /// Every outcome, including unknown functions and handler failures, is
    /// returned as a `ToolResult` carrying the call id; this method never
    /// fails. Each call id executes at most once: a repeat is rejected with
    /// an error result.
    pub async fn dispatch(&mut self, name: &str, raw_arguments: &str, call_id: &str) -> ToolResult {
        tracing::info!(name, call_id, "dispatching tool call");

        if !self.seen_call_ids.insert(call_id.to_string()) {
            tracing::warn!(call_id, "rejected replayed call id");
            return ToolResult::failure(
                call_id,
                format!("call id {call_id} was already executed"),
            );
        }

        let Some(registration) = self.registry.get(name) else {
            tracing::warn!(name, call_id, "unknown function");
            return ToolResult::failure(call_id, format!("unknown function: {name}"));
        };

        // Absent arguments are treated as an empty object, like the source
        // event stream does for zero-parameter functions
        let args: serde_json::Value = if raw_arguments.trim().is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            match serde_json::from_str(raw_arguments) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(name, call_id, error = %e, "malformed arguments");
                    return ToolResult::failure(call_id, format!("malformed arguments: {e}"));
                }
            }
        };

        if let Err(e) = registration.schema().validate(&args) {
            tracing::warn!(name, call_id, error = %e, "argument validation failed");
            return ToolResult::failure(call_id, e.to_string());
        }

        let result = match registration.invoke(args).await {
            Ok(output) => {
                tracing::debug!(name, call_id, "tool call succeeded");
                ToolResult::success(call_id, output)
            }
            Err(e) => {
                tracing::warn!(name, call_id, error = %e, "tool call failed");
                ToolResult::failure(call_id, e.to_string())
            }
        };

        self.update_context(name, result.ok).await;
        result
    }

    /// Best-effort conversation-mode heuristic, applied after successful
    /// calls
    async fn update_context(&self, name: &str, ok: bool) {
        let mut context = self.context.lock().await;
        context.interaction_count += 1;
        if !ok {
            return;
        }

        if ORDERING_FUNCTIONS.contains(&name) {
            context.mode = ConversationMode::Ordering;
            context.ordering_in_progress = true;
        } else if ORDER_CLOSING_FUNCTIONS.contains(&name) {
            context.ordering_in_progress = false;
        } else if ROBOT_FUNCTIONS.contains(&name) {
            context.mode = ConversationMode::RobotControl;
        }
    }
}
