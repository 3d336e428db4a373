//! Fetch and send operations of the message store

use crate::assert_settled;
use crate::common::*;
use chat_sync::client::{Config, FETCH_MESSAGES_FAILED, FETCH_USERS_FAILED, SEND_MESSAGE_FAILED};
use chat_sync::shared::{AppConfig, OutgoingMessage, SyncError, User};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_get_users_replaces_list() {
    let h = harness();
    h.network.respond(
        "GET /messages/users",
        Ok(json!([
            { "_id": "u2", "fullName": "Ada" },
            { "_id": "u3", "fullName": "Grace" }
        ])),
    );

    h.store.get_users().await;

    let state = h.store.snapshot();
    assert_eq!(
        state.users,
        vec![User::new("u2").with_name("Ada"), User::new("u3").with_name("Grace")]
    );
    assert_settled!(h.store);
    assert!(h.notifier.shown().is_empty());
}

#[tokio::test]
async fn test_get_users_server_error_keeps_list() {
    let h = harness();
    h.network
        .respond("GET /messages/users", Ok(json!([{ "_id": "u2" }])));
    h.store.get_users().await;

    h.network
        .respond("GET /messages/users", Err(SyncError::request(500, None)));
    h.store.get_users().await;

    let state = h.store.snapshot();
    assert_eq!(state.users, vec![User::new("u2")]);
    assert!(!state.is_users_loading);
    assert_eq!(h.notifier.shown(), vec![FETCH_USERS_FAILED.to_string()]);
}

#[tokio::test]
async fn test_get_users_uses_server_message() {
    let h = harness();
    h.network.respond(
        "GET /messages/users",
        Err(SyncError::request(401, Some("Unauthorized - No Token Provided".into()))),
    );

    h.store.get_users().await;

    assert_eq!(h.notifier.shown(), vec!["Unauthorized - No Token Provided".to_string()]);
}

#[tokio::test]
async fn test_get_users_bad_payload_is_a_failure() {
    let h = harness();
    h.network
        .respond("GET /messages/users", Ok(json!({ "users": "nope" })));

    h.store.get_users().await;

    assert!(h.store.snapshot().users.is_empty());
    assert_eq!(h.notifier.shown(), vec![FETCH_USERS_FAILED.to_string()]);
    assert_settled!(h.store);
}

#[tokio::test]
async fn test_users_loading_flag_while_in_flight() {
    let h = harness();
    let release = h
        .network
        .respond_gated("GET /messages/users", Ok(json!([])));

    let store = h.store.clone();
    let task = tokio::spawn(async move { store.get_users().await });
    h.network.wait_for_calls(1).await;

    assert!(h.store.snapshot().is_users_loading);

    release.send(()).unwrap();
    task.await.unwrap();
    assert_settled!(h.store);
}

#[tokio::test]
async fn test_dropped_fetch_releases_loading_flag() {
    let h = harness();
    let _never = h
        .network
        .respond_gated("GET /messages/users", Ok(json!([])));

    let result = tokio::time::timeout(Duration::from_millis(20), h.store.get_users()).await;
    assert!(result.is_err());

    assert_settled!(h.store);
}

#[tokio::test]
async fn test_get_messages_replaces_history() {
    let h = harness();
    h.select("u2");
    let history = vec![
        message("m1", "me", "u2", "hey"),
        message("m2", "u2", "me", "hi"),
    ];
    h.network
        .respond("GET /messages/u2", Ok(json_messages(&history)));

    h.store.get_messages("u2").await;

    assert_eq!(h.store.snapshot().messages, history);
    assert_settled!(h.store);
}

#[tokio::test]
async fn test_get_messages_failure_leaves_messages() {
    let h = harness();
    h.select("u2");
    h.network.respond(
        "GET /messages/u2",
        Ok(json_messages(&[message("m1", "u2", "me", "hi")])),
    );
    h.store.get_messages("u2").await;

    h.network
        .respond("GET /messages/u2", Err(SyncError::transport("connection reset")));
    h.store.get_messages("u2").await;

    assert_eq!(h.message_ids(), vec!["m1"]);
    assert_eq!(h.notifier.shown(), vec![FETCH_MESSAGES_FAILED.to_string()]);
    assert_settled!(h.store);
}

#[tokio::test]
async fn test_get_messages_keeps_old_view_until_resolved() {
    let h = harness();
    h.select("u2");
    h.network.respond(
        "GET /messages/u2",
        Ok(json_messages(&[message("m1", "u2", "me", "hi")])),
    );
    h.store.get_messages("u2").await;

    h.select("u3");
    let release = h.network.respond_gated(
        "GET /messages/u3",
        Ok(json_messages(&[message("m7", "u3", "me", "yo")])),
    );
    let store = h.store.clone();
    let task = tokio::spawn(async move { store.get_messages("u3").await });
    h.network.wait_for_calls(2).await;

    assert_eq!(h.message_ids(), vec!["m1"]);
    assert!(h.store.snapshot().is_messages_loading);

    release.send(()).unwrap();
    task.await.unwrap();
    assert_eq!(h.message_ids(), vec!["m7"]);
}

#[tokio::test]
async fn test_clear_on_switch_when_configured() {
    let config = Config::with_builder(AppConfig::builder().clear_messages_on_switch(true)).unwrap();
    let h = harness_with_config(&config);
    h.select("u2");
    h.network.respond(
        "GET /messages/u2",
        Ok(json_messages(&[message("m1", "u2", "me", "hi")])),
    );
    h.store.get_messages("u2").await;

    h.select("u2");
    assert_eq!(h.message_ids(), vec!["m1"]);

    h.select("u3");
    assert!(h.store.snapshot().messages.is_empty());
}

#[tokio::test]
async fn test_stale_history_for_previous_partner_is_discarded() {
    let h = harness();
    h.select("u2");
    let release_u2 = h.network.respond_gated(
        "GET /messages/u2",
        Ok(json_messages(&[message("a1", "u2", "me", "from u2")])),
    );
    let store = h.store.clone();
    let slow = tokio::spawn(async move { store.get_messages("u2").await });
    h.network.wait_for_calls(1).await;

    h.select("u3");
    h.network.respond(
        "GET /messages/u3",
        Ok(json_messages(&[message("b1", "u3", "me", "from u3")])),
    );
    h.store.get_messages("u3").await;
    assert_eq!(h.message_ids(), vec!["b1"]);
    assert!(h.store.snapshot().is_messages_loading);

    release_u2.send(()).unwrap();
    slow.await.unwrap();

    assert_eq!(h.message_ids(), vec!["b1"]);
    assert_settled!(h.store);
}

#[tokio::test]
async fn test_stale_history_for_same_partner_is_discarded() {
    let h = harness();
    h.select("u2");
    let release_first = h.network.respond_gated(
        "GET /messages/u2",
        Ok(json_messages(&[message("old", "u2", "me", "old")])),
    );
    h.network.respond(
        "GET /messages/u2",
        Ok(json_messages(&[message("old", "u2", "me", "old"), message("new", "u2", "me", "new")])),
    );

    let store = h.store.clone();
    let first = tokio::spawn(async move { store.get_messages("u2").await });
    h.network.wait_for_calls(1).await;
    h.store.get_messages("u2").await;

    release_first.send(()).unwrap();
    first.await.unwrap();

    assert_eq!(h.message_ids(), vec!["old", "new"]);
}

#[tokio::test]
async fn test_stale_failure_is_not_shown() {
    let h = harness();
    h.select("u2");
    let release_first = h
        .network
        .respond_gated("GET /messages/u2", Err(SyncError::request(500, None)));
    h.network.respond("GET /messages/u2", Ok(json!([])));

    let store = h.store.clone();
    let first = tokio::spawn(async move { store.get_messages("u2").await });
    h.network.wait_for_calls(1).await;
    h.store.get_messages("u2").await;

    release_first.send(()).unwrap();
    first.await.unwrap();

    assert!(h.notifier.shown().is_empty());
}

#[tokio::test]
async fn test_send_message_appends_server_copy() {
    let h = harness();
    h.select("u2");
    h.network.respond(
        "POST /messages/send/u2",
        Ok(json!({ "_id": "m1", "senderId": "me", "receiverId": "u2", "content": "hello" })),
    );

    h.store.send_message(OutgoingMessage::text("hello")).await;

    let messages = h.store.snapshot().messages;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages.last(), Some(&message("m1", "me", "u2", "hello")));
    assert_eq!(
        h.network.calls()[0].body,
        Some(json!({ "content": "hello" }))
    );
}

#[tokio::test]
async fn test_send_message_appends_at_tail() {
    let h = harness();
    h.select("u2");
    h.network.respond(
        "GET /messages/u2",
        Ok(json_messages(&[message("m0", "u2", "me", "earlier")])),
    );
    h.store.get_messages("u2").await;
    h.network.respond(
        "POST /messages/send/u2",
        Ok(json!({ "_id": "m1", "senderId": "me", "receiverId": "u2", "content": "hello" })),
    );

    h.store.send_message(OutgoingMessage::text("hello")).await;

    assert_eq!(h.message_ids(), vec!["m0", "m1"]);
}

#[tokio::test]
async fn test_send_message_failure_leaves_messages() {
    let h = harness();
    h.select("u2");
    h.network.respond(
        "POST /messages/send/u2",
        Err(SyncError::request(400, Some("Message too long".into()))),
    );

    h.store.send_message(OutgoingMessage::text("hello")).await;

    assert!(h.store.snapshot().messages.is_empty());
    assert_eq!(h.notifier.shown(), vec!["Message too long".to_string()]);
}

#[tokio::test]
async fn test_send_message_without_selection() {
    let h = harness();

    h.store.send_message(OutgoingMessage::text("hello")).await;

    assert_eq!(h.network.call_count(), 0);
    assert!(h.store.snapshot().messages.is_empty());
    assert_eq!(h.notifier.shown(), vec![SEND_MESSAGE_FAILED.to_string()]);
}

#[tokio::test]
async fn test_send_empty_message_is_refused() {
    let h = harness();
    h.select("u2");

    h.store.send_message(OutgoingMessage::text("   ")).await;

    assert_eq!(h.network.call_count(), 0);
    assert_eq!(h.notifier.shown(), vec![SEND_MESSAGE_FAILED.to_string()]);
}

#[tokio::test]
async fn test_send_response_after_switch_is_not_appended() {
    let h = harness();
    h.select("u2");
    let release = h.network.respond_gated(
        "POST /messages/send/u2",
        Ok(json!({ "_id": "m1", "senderId": "me", "receiverId": "u2", "content": "hello" })),
    );

    let store = h.store.clone();
    let send = tokio::spawn(async move { store.send_message(OutgoingMessage::text("hello")).await });
    h.network.wait_for_calls(1).await;
    h.select("u3");

    release.send(()).unwrap();
    send.await.unwrap();

    assert!(h.store.snapshot().messages.is_empty());
    assert!(h.notifier.shown().is_empty());
}

#[tokio::test]
async fn test_set_selected_user_does_not_fetch() {
    let h = harness();

    h.select("u2");

    assert_eq!(h.store.snapshot().selected_user_id(), Some("u2"));
    assert_eq!(h.network.call_count(), 0);
    assert!(!h.store.snapshot().is_subscribed());
}

#[tokio::test]
async fn test_watch_sees_updates() {
    let h = harness();
    let mut rx = h.store.watch();
    h.network
        .respond("GET /messages/users", Ok(json!([{ "_id": "u2" }])));

    h.store.get_users().await;

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().users.len(), 1);
}
