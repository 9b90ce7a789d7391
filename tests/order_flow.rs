//! Order lifecycle through the dispatch surface

mod common;

use common::{call, call_ok, session};

#[tokio::test]
async fn cancelled_order_is_discarded_and_forgotten() {
    let mut session = session();

    call_ok(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "latte"}"#,
    )
    .await;
    let out = call_ok(&mut session, "cancel_order", "{}").await;
    assert!(out.contains("ORD0001"));
    assert!(out.contains("cancelled"));

    // Cancelled orders never reach history
    let result = call(
        &mut session,
        "check_order_status",
        r#"{"order_id": "ORD0001"}"#,
    )
    .await;
    assert!(!result.ok);
    assert!(result.output.contains("not found"));

    // And the next order picks up the next sequential id
    let out = call_ok(&mut session, "start_new_order", "{}").await;
    assert!(out.contains("ORD0002"));
}

#[tokio::test]
async fn paid_order_status_is_queryable_from_history() {
    let mut session = session();

    call_ok(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "espresso"}"#,
    )
    .await;
    call_ok(&mut session, "confirm_order", "{}").await;
    call_ok(&mut session, "process_payment", "{}").await;

    let out = call_ok(
        &mut session,
        "check_order_status",
        r#"{"order_id": "ORD0001"}"#,
    )
    .await;
    assert!(out.contains("preparing"));
    assert!(out.contains("payment completed"));
}

#[tokio::test]
async fn remove_decrements_before_dropping_the_line() {
    let mut session = session();

    call_ok(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "latte", "quantity": 3}"#,
    )
    .await;

    let out = call_ok(
        &mut session,
        "remove_item_from_order",
        r#"{"item_name": "latte"}"#,
    )
    .await;
    assert!(out.contains("quantity to 2"));
    assert!(out.contains("$9.50"));

    let out = call_ok(
        &mut session,
        "remove_item_from_order",
        r#"{"item_name": "latte", "quantity": 5}"#,
    )
    .await;
    assert!(out.contains("Removed Latte"));
    assert!(out.contains("$0.00"));
}

#[tokio::test]
async fn invalid_customization_reports_the_valid_set() {
    let mut session = session();

    let result = call(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "espresso", "customizations": ["oat_milk"]}"#,
    )
    .await;
    assert!(!result.ok);
    assert!(result.output.contains("oat_milk"));
    assert!(result.output.contains("extra_shot"));
}

#[tokio::test]
async fn confirm_without_items_is_rejected() {
    let mut session = session();
    call_ok(&mut session, "start_new_order", "{}").await;

    let result = call(&mut session, "confirm_order", "{}").await;
    assert!(!result.ok);
    assert!(result.output.contains("no items"));
}

#[tokio::test]
async fn insufficient_payment_keeps_the_order_open() {
    let mut session = session();

    call_ok(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "club sandwich"}"#,
    )
    .await;
    call_ok(&mut session, "confirm_order", "{}").await;

    let result = call(
        &mut session,
        "process_payment",
        r#"{"payment_method": "cash", "amount": 1.00}"#,
    )
    .await;
    assert!(!result.ok);
    assert!(result.output.contains("insufficient"));

    // Order still active and payable
    assert!(session.cart().lock().await.current_order().is_some());
    call_ok(&mut session, "process_payment", "{}").await;
}

#[tokio::test]
async fn payment_method_enum_is_enforced_by_the_schema() {
    let mut session = session();
    call_ok(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "latte"}"#,
    )
    .await;
    call_ok(&mut session, "confirm_order", "{}").await;

    let result = call(
        &mut session,
        "process_payment",
        r#"{"payment_method": "barter"}"#,
    )
    .await;
    assert!(!result.ok);
    assert!(result.output.contains("card, cash, mobile"));
}

#[tokio::test]
async fn recommendations_respond_to_stated_preference() {
    let mut session = session();

    let out = call_ok(
        &mut session,
        "get_recommendations",
        r#"{"preference": "something cold"}"#,
    )
    .await;
    assert!(out.contains("Iced Coffee"));
    assert!(out.contains("Smoothie"));
    assert!(!out.contains("Club Sandwich"));
}

#[tokio::test]
async fn modify_item_changes_customizations_in_place() {
    let mut session = session();

    call_ok(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "latte", "customizations": ["vanilla"]}"#,
    )
    .await;
    call_ok(
        &mut session,
        "modify_order_item",
        r#"{"item_name": "latte", "new_customizations": ["caramel"], "new_notes": "extra hot"}"#,
    )
    .await;

    let cart = session.cart().lock().await;
    let line = &cart.current_order().unwrap().lines[0];
    assert_eq!(line.customizations, ["caramel"]);
    assert_eq!(line.note, "extra hot");
}
