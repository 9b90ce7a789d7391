//! Kiosk screen navigation through the dispatch surface

mod common;

use cafebot_gateway::Screen;
use common::{call, call_ok, session};

#[tokio::test]
async fn navigation_clamps_at_the_list_edges() {
    let mut session = session();

    call_ok(
        &mut session,
        "display_menu_items",
        r#"{"category": "pastries"}"#,
    )
    .await;

    // Four pastries: the highlight stops at index 3
    for _ in 0..6 {
        call_ok(&mut session, "navigate_down", "{}").await;
    }
    assert_eq!(session.kiosk().lock().await.highlighted(), 3);

    for _ in 0..6 {
        call_ok(&mut session, "navigate_up", "{}").await;
    }
    assert_eq!(session.kiosk().lock().await.highlighted(), 0);
}

#[tokio::test]
async fn select_walks_from_categories_to_item_detail() {
    let mut session = session();

    call_ok(&mut session, "display_menu_categories", "{}").await;
    call_ok(&mut session, "select_highlighted_item", "{}").await;
    assert_eq!(session.kiosk().lock().await.screen(), Screen::Items);

    let out = call_ok(&mut session, "select_highlighted_item", "{}").await;
    assert!(out.contains("ESPRESSO"));
    assert_eq!(session.kiosk().lock().await.screen(), Screen::ItemDetail);
}

#[tokio::test]
async fn back_follows_the_fixed_screen_map() {
    let mut session = session();

    call_ok(
        &mut session,
        "display_item_details",
        r#"{"item_name": "latte"}"#,
    )
    .await;
    call_ok(&mut session, "go_back", "{}").await;
    assert_eq!(session.kiosk().lock().await.screen(), Screen::Items);

    call_ok(&mut session, "go_back", "{}").await;
    assert_eq!(session.kiosk().lock().await.screen(), Screen::Categories);

    call_ok(&mut session, "go_back", "{}").await;
    assert_eq!(session.kiosk().lock().await.screen(), Screen::Welcome);
}

#[tokio::test]
async fn cart_view_reads_the_live_order() {
    let mut session = session();

    let out = call_ok(&mut session, "display_cart_view", "{}").await;
    assert!(out.contains("empty"));

    call_ok(
        &mut session,
        "add_item_to_order",
        r#"{"item_name": "latte", "quantity": 2}"#,
    )
    .await;

    let out = call_ok(&mut session, "display_cart_view", "{}").await;
    assert!(out.contains("2x Latte"));
    assert!(out.contains("$9.50"));
    assert!(out.contains("Tax"));
}

#[tokio::test]
async fn checkout_requires_an_active_order() {
    let mut session = session();
    let result = call(&mut session, "display_checkout_screen", "{}").await;
    assert!(!result.ok);
    assert!(result.output.contains("no order"));
}

#[tokio::test]
async fn highlight_requires_the_items_screen() {
    let mut session = session();

    let result = call(
        &mut session,
        "highlight_menu_item",
        r#"{"item_name": "latte"}"#,
    )
    .await;
    assert!(!result.ok);

    call_ok(
        &mut session,
        "display_menu_items",
        r#"{"category": "coffee"}"#,
    )
    .await;
    call_ok(
        &mut session,
        "highlight_menu_item",
        r#"{"item_name": "macchiato"}"#,
    )
    .await;
    assert_eq!(session.kiosk().lock().await.highlighted(), 4);
}

#[tokio::test]
async fn unknown_category_is_rejected_without_changing_screens() {
    let mut session = session();
    let result = call(
        &mut session,
        "display_menu_items",
        r#"{"category": "sushi"}"#,
    )
    .await;
    assert!(!result.ok);
    assert_eq!(session.kiosk().lock().await.screen(), Screen::Welcome);
}

#[tokio::test]
async fn confirmation_screen_shows_the_order_id() {
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
        "display_order_confirmation",
        r#"{"order_id": "ORD0001"}"#,
    )
    .await;
    assert!(out.contains("ORD0001"));
    assert_eq!(session.kiosk().lock().await.screen(), Screen::Confirmation);
}
