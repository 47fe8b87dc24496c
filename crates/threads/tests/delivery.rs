mod support;

use std::{sync::Arc, time::Duration};

use serde_json::json;
use support::{body, harness, harness_with, object, RecordingTransport, EVENT_KEY};
use threads::{
    Host, Message, MessageKind, ThreadsClient, ThreadsError, UserIdentity, CONTENT_TYPE_TEXT_PLAIN,
};
use tokio::sync::oneshot;

#[tokio::test]
async fn destination_is_https_for_every_page_scheme() {
    for href in [
        "http://www.example.com/",
        "https://www.example.com/",
        "file:///tmp/index.html",
        "chrome-extension://abcdefghijklmnop/popup.html",
    ] {
        let h = harness(href);
        let response = h
            .client
            .send("/i", object(json!({ "userId": "id" })))
            .await
            .expect("send succeeds");
        assert_eq!(response.url, "https://input.threads.io/v1/i", "{href}");
        assert_eq!(h.transport.requests()[0].url, response.url, "{href}");
    }
}

#[tokio::test]
async fn body_is_normalized_json_sent_as_text_plain() {
    let h = harness("http://localhost/");
    h.host.set_user_id(Some("user-id"));
    let response = h
        .client
        .send("/p", object(json!({ "name": "home", "options": { "opt": true } })))
        .await
        .expect("send succeeds");
    assert_eq!(response.status, 200);
    assert_eq!(response.json().expect("json reply"), json!({ "success": true }));

    let requests = h.transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].content_type, CONTENT_TYPE_TEXT_PLAIN);

    let payload = body(&requests[0]);
    assert_eq!(payload["eventKey"], json!(EVENT_KEY));
    assert_eq!(payload["userId"], json!("user-id"));
    assert_eq!(payload["anonymousId"], json!("anon-id"));
    assert_eq!(payload["name"], json!("home"));
    assert_eq!(payload["context"]["opt"], json!(true));
    assert_eq!(payload["context"]["userAgent"], json!("test-agent"));
    assert!(payload.get("options").is_none());
    assert_eq!(payload["messageId"].as_str().map(str::len), Some(36));
}

#[tokio::test]
async fn every_kind_is_delivered_to_its_endpoint() {
    let h = harness("https://app.example.com/");
    let messages = [
        Message::page(None, Some("name"), None, None),
        Message::identify(Some("id"), None, None),
        Message::group("group-id", None, None),
        Message::track("event", None, None),
        Message::alias("new-id", Some("old-id"), None),
    ];
    for (message, kind) in messages.into_iter().zip(MessageKind::ALL) {
        let response = h.client.deliver(message).await.expect("deliver succeeds");
        assert_eq!(response.url, h.client.endpoint(threads::endpoint(kind)));
    }
    let paths: Vec<_> = h
        .transport
        .requests()
        .iter()
        .map(|request| request.url.trim_start_matches("https://input.threads.io/v1").to_string())
        .collect();
    assert_eq!(paths, ["/p", "/i", "/g", "/t", "/a"]);
}

#[tokio::test]
async fn transport_failure_is_returned_with_url() {
    let (transport, sent) = RecordingTransport::failing("connection reset");
    let h = harness_with("http://localhost/", transport, sent);
    let err = h
        .client
        .send("/t", object(json!({ "event": "e" })))
        .await
        .expect_err("send fails");
    match &err {
        ThreadsError::Transport { url, source } => {
            assert_eq!(url, "https://input.threads.io/v1/t");
            assert_eq!(source.to_string(), "connection reset");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.url(), Some("https://input.threads.io/v1/t"));
    assert_eq!(h.transport.requests().len(), 1, "no retries");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (transport, sent) = RecordingTransport::status(400, r#"{"error":"bad key"}"#);
    let h = harness_with("http://localhost/", transport, sent);
    let err = h
        .client
        .send("/g", object(json!({ "groupId": "g" })))
        .await
        .expect_err("send fails");
    match err {
        ThreadsError::Status { url, status, body } => {
            assert_eq!(url, "https://input.threads.io/v1/g");
            assert_eq!(status, 400);
            assert_eq!(body, r#"{"error":"bad key"}"#);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn send_with_runs_callback_once() {
    let h = harness("http://localhost/");
    let (tx, rx) = oneshot::channel();
    let handle = h
        .client
        .send_with("/i", object(json!({ "userId": "id" })), move |result| {
            let _ = tx.send(result.map(|response| response.url));
        });
    let url = tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .expect("callback ran")
        .expect("callback sent result")
        .expect("send succeeded");
    assert_eq!(url, "https://input.threads.io/v1/i");
    handle.await.expect("task joined");
}

#[tokio::test]
async fn dispatch_logs_failures_without_panicking() {
    let (transport, sent) = RecordingTransport::failing("offline");
    let mut h = harness_with("http://localhost/", transport, sent);
    h.client
        .dispatch(Message::track("event", None, None))
        .await
        .expect("dispatch task completes");
    let request = h.sent.recv().await.expect("request recorded");
    assert!(request.url.ends_with("/v1/t"));
}

struct BlankIdentityHost;

impl Host for BlankIdentityHost {
    fn user(&self) -> UserIdentity {
        UserIdentity::anonymous("")
    }
}

#[tokio::test]
async fn blank_host_identity_still_gets_a_stable_anonymous_id() {
    let (transport, _sent) = RecordingTransport::ok();
    let client = ThreadsClient::builder()
        .event_key(EVENT_KEY)
        .host(Arc::new(BlankIdentityHost))
        .transport(transport.clone())
        .build()
        .expect("build client");

    client
        .deliver(Message::track("event", None, None))
        .await
        .expect("track delivered");
    client
        .deliver(Message::alias("new-id", None, None))
        .await
        .expect("alias delivered");

    let requests = transport.requests();
    let track = body(&requests[0]);
    let alias = body(&requests[1]);
    let anonymous_id = track["anonymousId"].as_str().expect("anonymousId is a string");
    assert_eq!(anonymous_id.len(), 36);
    assert_eq!(alias["anonymousId"], track["anonymousId"]);
    assert_eq!(alias["previousId"], track["anonymousId"]);
}
