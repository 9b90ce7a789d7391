//! End-to-end dispatch tests over a full session

mod common;

use cafebot_gateway::ConversationMode;
use common::{call, call_ok, session};

#[tokio::test]
async fn full_order_flow_for_one_customer() {
    let mut session = session();

    call_ok(&mut session, "display_welcome_screen", "{}").await;

    let out = call_ok(
        &mut session,
        "start_new_order",
        r#"{"customer_name": "Sarah"}"#,
    )
    .await;
    assert!(out.contains("Sarah"));
    assert!(out.contains("ORD0001"));

    let out = call_ok(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "latte", "quantity": 2, "customizations": ["oat_milk"]}"#,
    )
    .await;
    assert!(out.contains("2x Latte"));
    assert!(out.contains("oat_milk"));
    assert!(out.contains("$9.50"));

    let out = call_ok(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "blueberry muffin"}"#,
    )
    .await;
    assert!(out.contains("$12.25"), "running total shown: {out}");

    let out = call_ok(&mut session, "view_current_order", "{}").await;
    assert!(out.contains("Latte"));
    assert!(out.contains("Blueberry Muffin"));
    assert!(out.contains("Total: $12.25"));

    let out = call_ok(&mut session, "confirm_order", "{}").await;
    assert!(out.contains("Order confirmed"));

    let out = call_ok(
        &mut session,
        "process_payment",
        r#"{"payment_method": "card"}"#,
    )
    .await;
    assert!(out.contains("$12.25"));
    assert!(out.contains("ORD0001"));

    // Paid order is archived, cart is clear for the next customer
    let cart = session.cart().lock().await;
    assert!(cart.current_order().is_none());
    assert_eq!(cart.history().len(), 1);
    assert_eq!(cart.history()[0].id, "ORD0001");
}

#[tokio::test]
async fn unknown_function_is_an_error_result() {
    let mut session = session();
    let result = session.dispatch("unknown_fn", "{}", "call-1").await;
    assert!(!result.ok);
    assert_eq!(result.call_id, "call-1");
    assert!(result.output.contains("unknown"));
}

#[tokio::test]
async fn replayed_call_id_runs_once() {
    let mut session = session();

    let first = session
        .dispatch("start_new_order", r#"{"customer_name": "Ana"}"#, "call-9")
        .await;
    assert!(first.ok);

    let second = session
        .dispatch("start_new_order", r#"{"customer_name": "Ana"}"#, "call-9")
        .await;
    assert!(!second.ok);
    assert!(second.output.contains("already executed"));

    // Only one order was actually started
    let cart = session.cart().lock().await;
    assert_eq!(cart.current_order().unwrap().id, "ORD0001");
}

#[tokio::test]
async fn malformed_arguments_are_caught() {
    let mut session = session();
    let result = call(&mut session, "add_item_to_order", "{broken").await;
    assert!(!result.ok);
    assert!(result.output.contains("malformed"));
}

#[tokio::test]
async fn missing_required_parameter_is_rejected_before_the_handler() {
    let mut session = session();
    let result = call(&mut session, "add_item_to_order", "{}").await;
    assert!(!result.ok);
    assert!(result.output.contains("item_name"));

    // Nothing was added and no order was auto-started
    assert!(session.cart().lock().await.current_order().is_none());
}

#[tokio::test]
async fn handler_errors_come_back_as_text() {
    let mut session = session();
    let result = call(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "sushi platter"}"#,
    )
    .await;
    assert!(!result.ok);
    assert!(result.output.contains("sushi platter"));
    // Miss message suggests actual menu items
    assert!(result.output.contains("Espresso"));
}

#[tokio::test]
async fn conversation_mode_follows_function_families() {
    let mut session = session();
    assert_eq!(
        session.bridge().context().await.mode,
        ConversationMode::General
    );

    call_ok(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "espresso"}"#,
    )
    .await;
    let ctx = session.bridge().context().await;
    assert_eq!(ctx.mode, ConversationMode::Ordering);
    assert!(ctx.ordering_in_progress);

    call_ok(&mut session, "cancel_order", "{}").await;
    assert!(!session.bridge().context().await.ordering_in_progress);

    call_ok(&mut session, "move_forward", r#"{"distance": 0.5}"#).await;
    assert_eq!(
        session.bridge().context().await.mode,
        ConversationMode::RobotControl
    );
}

#[tokio::test]
async fn robot_round_trip_through_dispatch() {
    let mut session = session();

    let out = call_ok(&mut session, "move_forward", r#"{"distance": 2.0}"#).await;
    assert!(out.contains("[2.0, 0.0, 0.0]"));

    let out = call_ok(&mut session, "turn_right", r#"{"angle": 90}"#).await;
    assert!(out.contains("Heading: 90"));

    let out = call_ok(&mut session, "set_led_color", r#"{"color": "green"}"#).await;
    assert!(out.contains("green"));

    let result = call(&mut session, "set_led_color", r#"{"color": "magenta"}"#).await;
    assert!(!result.ok);
    assert!(result.output.contains("available colors"));

    let out = call_ok(&mut session, "get_status", "{}").await;
    assert!(out.contains("\"battery\":85"));
}

#[tokio::test]
async fn system_status_aggregates_all_services() {
    let mut session = session();
    call_ok(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "latte"}"#,
    )
    .await;

    let out = call_ok(&mut session, "get_system_status", "{}").await;
    assert!(out.contains("active order: true"));
    assert!(out.contains("orders completed: 0"));
    assert!(out.contains("ordering mode"));
}
