//! Backend client integration tests
//!
//! Exercises `PawfectClient` against a `wiremock` mock server: request
//! shapes, bearer token handling, timestamp decoding and error mapping.

use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pawfect::api::{ClientError, Message, Role};

mod common;

use common::client_for;

#[tokio::test]
async fn test_login_posts_credentials_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(418))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({
            "email": "ada@example.com",
            "password": "secret1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt-abc",
            "name": "Ada",
            "email": "ada@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = client_for(&server, None)
        .login("ada@example.com", "secret1")
        .await
        .expect("login should succeed");

    assert_eq!(auth.token, "jwt-abc");
    assert_eq!(auth.name, "Ada");
}

#[tokio::test]
async fn test_login_rejected_maps_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Bad credentials"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server, None)
        .login("ada@example.com", "wrong")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Authentication(_)));
    assert_eq!(err.server_message(), Some("Bad credentials"));
}

#[tokio::test]
async fn test_register_duplicate_email_keeps_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "secret1"
        })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Email already registered"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server, None)
        .register("Ada", "ada@example.com", "secret1")
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Email already registered");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_new_chat_sends_null_conversation_id_and_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("Authorization", "Bearer tok-1"))
        .and(body_json(json!({
            "messages": [{"role": "user", "content": "What foods are toxic to dogs?"}],
            "conversationId": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversationId": "c1",
            "message": "Chocolate, grapes, onions and xylitol."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server, Some("tok-1"))
        .send_chat(&[Message::user("What foods are toxic to dogs?")], None)
        .await
        .expect("chat should succeed");

    assert_eq!(reply.conversation_id, "c1");
    assert!(reply.message.starts_with("Chocolate"));
}

#[tokio::test]
async fn test_list_conversations_decodes_local_datetimes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "c2",
                "title": "Cat vaccinations",
                "createdAt": "2025-01-14T09:00:00",
                "updatedAt": "2025-01-15T10:30:12.123456"
            },
            {
                "id": "c1",
                "title": "Vomiting dog",
                "createdAt": "2025-01-10T08:00:00Z",
                "updatedAt": "2025-01-10T08:05:00Z"
            }
        ])))
        .mount(&server)
        .await;

    let list = client_for(&server, Some("tok-1"))
        .list_conversations()
        .await
        .expect("list should succeed");

    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, "c2");
    assert_eq!(
        list[0].updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        "2025-01-15 10:30:12"
    );
    assert_eq!(list[1].title, "Vomiting dog");
}

#[tokio::test]
async fn test_get_conversation_returns_messages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c1",
            "title": "Vomiting dog",
            "messages": [
                {"role": "user", "content": "My dog has been vomiting"},
                {"role": "assistant", "content": "Please monitor..."}
            ],
            "createdAt": "2025-01-10T08:00:00",
            "updatedAt": "2025-01-10T08:05:00"
        })))
        .mount(&server)
        .await;

    let detail = client_for(&server, Some("tok-1"))
        .get_conversation("c1")
        .await
        .expect("get should succeed");

    assert_eq!(detail.messages.len(), 2);
    assert_eq!(detail.messages[1].role, Role::Assistant);
}

#[tokio::test]
async fn test_get_missing_conversation_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server, Some("tok-1"))
        .get_conversation("nope")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_conversation_success_and_failure() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/conversations/c1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/conversations/c2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("tok-1"));
    assert!(client.delete_conversation("c1").await.is_ok());

    match client.delete_conversation("c2").await.unwrap_err() {
        ClientError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_conversation_id_stays_inside_its_path_segment() {
    let server = MockServer::start().await;
    Mock::given(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(418))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(418))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/api/conversations/[^/]+$"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("tok-1"));
    client.delete_conversation("../auth/login").await.unwrap();

    let err = client.delete_conversation("..").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidUrl(_)));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.path(),
        "/api/conversations/..%2Fauth%2Flogin"
    );
}

#[tokio::test]
async fn test_expired_token_maps_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client_for(&server, Some("expired"))
        .list_conversations()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Authentication(_)));
}
