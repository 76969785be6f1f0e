//! Realtime chat against in-memory stores

mod support;

use hub::{
    messaging::DEFAULT_RECENT_LIMIT,
    realtime::{ChatBroadcast, ServerEvent, on_send_message},
};
use support::test_state;
use tempfile::TempDir;

#[tokio::test]
async fn test_send_message_is_stored_and_broadcast() {
    let dir = TempDir::new().unwrap();
    let state = test_state(dir.path());
    let user = state.identity.register("a@x.com", "pw", "Alice").await.unwrap();
    let token = state.sessions.create_session(user.id).await.unwrap();

    let mut alice = state.chat.join();
    let mut bob = state.chat.join();

    let payload = on_send_message(&state, Some(&token), "hello")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payload.sender, "Alice");
    assert_eq!(payload.content, "hello");
    assert_eq!(payload.time.len(), 5);
    assert_eq!(&payload.time[2..3], ":");

    let expected = ServerEvent::NewMessage(payload.clone());
    assert_eq!(alice.recv().await.unwrap(), expected);
    assert_eq!(bob.recv().await.unwrap(), expected);

    let recent = state
        .messaging
        .recent_messages(DEFAULT_RECENT_LIMIT)
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].sender_id, user.id);
    assert_eq!(recent[0].sender_name, "Alice");
    assert_eq!(recent[0].display_time(), payload.time);
}

#[tokio::test]
async fn test_sender_name_falls_back_to_email() {
    let dir = TempDir::new().unwrap();
    let state = test_state(dir.path());
    let user = state.identity.register("b@x.com", "pw", "  ").await.unwrap();
    let token = state.sessions.create_session(user.id).await.unwrap();

    let payload = on_send_message(&state, Some(&token), "hi")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        payload,
        ChatBroadcast {
            sender: "b@x.com".to_string(),
            content: "hi".to_string(),
            time: payload.time.clone(),
        }
    );
}

#[tokio::test]
async fn test_anonymous_messages_are_dropped() {
    let dir = TempDir::new().unwrap();
    let state = test_state(dir.path());
    let mut listener = state.chat.join();

    assert!(on_send_message(&state, None, "spam").await.unwrap().is_none());
    assert!(
        on_send_message(&state, Some("not-a-session"), "spam")
            .await
            .unwrap()
            .is_none()
    );

    assert!(listener.try_recv().is_err());
    assert!(state.messaging.recent_messages(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_stops_an_open_connection_from_posting() {
    let dir = TempDir::new().unwrap();
    let state = test_state(dir.path());
    let user = state.identity.register("a@x.com", "pw", "Alice").await.unwrap();
    let token = state.sessions.create_session(user.id).await.unwrap();

    assert!(on_send_message(&state, Some(&token), "before").await.unwrap().is_some());
    state.sessions.destroy_session(&token).await.unwrap();
    assert!(on_send_message(&state, Some(&token), "after").await.unwrap().is_none());

    let recent = state.messaging.recent_messages(10).await.unwrap();
    let contents: Vec<_> = recent.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["before"]);
}
