//! Shared helpers for integration tests

use cafebot_gateway::{Config, Session, ToolResult};

/// A session with all simulated delays disabled
pub fn session() -> Session {
    Session::new(&Config::instant()).expect("session construction")
}

/// Dispatch one call with a fresh call id
pub async fn call(session: &mut Session, name: &str, args: &str) -> ToolResult {
    let call_id = uuid::Uuid::new_v4().to_string();
    session.dispatch(name, args, &call_id).await
}

/// Dispatch and assert success, returning the output text
pub async fn call_ok(session: &mut Session, name: &str, args: &str) -> String {
    let result = call(session, name, args).await;
    assert!(result.ok, "{name} failed: {}", result.output);
    result.output
}
