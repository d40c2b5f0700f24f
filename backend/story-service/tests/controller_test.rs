//! Controller tests against a wiremock story server
//!
//! Coverage:
//! - Story upload routing by session (guest vs logged in)
//! - Feed subscription per credential
//! - Login persists the session, logout returns to guest
//! - Details and map stories

use std::sync::Arc;
use std::time::Duration;

use paging::FeedSnapshot;
use serde_json::json;
use story_api::{ApiConfig, ApiError, NewStory, Story};
use story_service::{
    AuthController, Config, ControllerFactory, InMemorySessionStore, ServiceError, SessionStore,
    StoryController, UserSession,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const TOKEN: &str = "token-abc";

struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

fn story_json(id: &str, with_location: bool) -> serde_json::Value {
    let mut story = json!({
        "id": id,
        "name": format!("Name {}", id),
        "description": format!("Description {}", id),
        "photoUrl": format!("https://example.com/{}.jpg", id),
        "createdAt": "2023-01-01T00:00:00Z"
    });
    if with_location {
        story["lat"] = json!(-6.2);
        story["lon"] = json!(106.8);
    }
    story
}

fn page_body(ids: &[&str]) -> serde_json::Value {
    json!({
        "error": false,
        "message": "Stories fetched successfully",
        "listStory": ids.iter().map(|id| story_json(id, true)).collect::<Vec<_>>()
    })
}

fn factory_for(server: &MockServer, session: UserSession) -> ControllerFactory {
    let config = Config {
        api: ApiConfig::new(format!("{}/v1", server.uri())),
        feed: Default::default(),
        log: Default::default(),
    };
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::with_session(session));
    ControllerFactory::from_config(&config, sessions).expect("factory")
}

async fn settled(snapshot_source: &paging::FeedHandle<Story>) -> FeedSnapshot<Story> {
    tokio::time::timeout(
        Duration::from_secs(5),
        snapshot_source.wait_for(|snapshot| !snapshot.is_empty() && !snapshot.load_states().is_loading()),
    )
    .await
    .expect("feed settled in time")
    .expect("feed driver running")
}

// ============================================
// Story upload routing
// ============================================

#[tokio::test]
async fn test_guest_session_uploads_to_guest_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/stories/guest"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "error": false,
            "message": "success"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/stories"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let factory = factory_for(&server, UserSession::guest());
    let controller: StoryController = factory.create();
    let response = controller
        .add_story(NewStory::new("hello", vec![0xFF, 0xD8], "photo.jpg"))
        .await
        .unwrap();
    assert_eq!(response.message, "success");
}

#[tokio::test]
async fn test_logged_out_session_with_stale_token_uploads_as_guest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/stories/guest"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "error": false,
            "message": "success"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stale = UserSession {
        is_login: false,
        ..UserSession::logged_in("a@b.com", TOKEN, "Ana")
    };
    let controller: StoryController = factory_for(&server, stale).create();
    controller
        .add_story(NewStory::new("hello", vec![1], "photo.jpg"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_logged_in_session_uploads_with_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/stories"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "error": false,
            "message": "success"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory_for(&server, UserSession::logged_in("a@b.com", TOKEN, "Ana"));
    let controller: StoryController = factory.create();
    controller
        .add_story(NewStory::new("hello", vec![1], "photo.jpg").with_location(1.0, 2.0))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_upload_rejected_by_server_is_business_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/stories/guest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": true,
            "message": "Payload content length greater than maximum allowed: 1000000"
        })))
        .mount(&server)
        .await;

    let controller: StoryController = factory_for(&server, UserSession::guest()).create();
    let err = controller
        .add_story(NewStory::new("hello", vec![1], "photo.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Api(ApiError::Business(_))));
}

#[tokio::test]
async fn test_empty_description_is_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let controller: StoryController = factory_for(&server, UserSession::guest()).create();
    let err = controller
        .add_story(NewStory::new("   ", vec![1], "photo.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

// ============================================
// Feed
// ============================================

#[tokio::test]
async fn test_feed_loads_first_page_with_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/stories"))
        .and(query_param("page", "1"))
        .and(query_param("size", "20"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["1", "2"])))
        .expect(1)
        .mount(&server)
        .await;

    let controller: StoryController =
        factory_for(&server, UserSession::logged_in("a@b.com", TOKEN, "Ana")).create();
    let feed = controller.feed().unwrap();
    let snapshot = settled(&feed).await;

    let ids: Vec<&str> = snapshot.iter().map(|story| story.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(snapshot.pages()[0].prev_key, None);
}

#[tokio::test]
async fn test_feed_is_shared_until_credential_changes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/stories"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["member"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/stories"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["guest"])))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory_for(&server, UserSession::logged_in("a@b.com", TOKEN, "Ana"));
    let controller: StoryController = factory.create();
    let auth: AuthController = factory.create();

    let first = controller.feed().unwrap();
    let same = controller.feed().unwrap();
    assert_eq!(settled(&first).await.get(0).unwrap().id, "member");
    assert_eq!(settled(&same).await.get(0).unwrap().id, "member");

    auth.logout().await.unwrap();

    let guest_feed = controller.feed().unwrap();
    assert!(first.is_closed());
    assert_eq!(settled(&guest_feed).await.get(0).unwrap().id, "guest");
}

#[tokio::test]
async fn test_feed_error_is_forwarded_then_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/stories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": true,
            "message": "Missing authentication"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/stories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["1"])))
        .mount(&server)
        .await;

    let controller: StoryController = factory_for(&server, UserSession::guest()).create();
    let feed = controller.feed().unwrap();

    let failed = tokio::time::timeout(
        Duration::from_secs(5),
        feed.wait_for(|snapshot| snapshot.last_error().is_some()),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(failed.last_error().unwrap().message(), "Missing authentication");
    assert!(failed.is_empty());

    feed.retry();
    let snapshot = settled(&feed).await;
    assert_eq!(snapshot.len(), 1);
    assert!(feed.last_error().is_none());
}

// ============================================
// Accounts
// ============================================

#[tokio::test]
async fn test_login_saves_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "message": "success",
            "loginResult": {"userId": "user-1", "name": "Ana", "token": TOKEN}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory_for(&server, UserSession::guest());
    let auth: AuthController = factory.create();

    let session = auth.login(" a@b.com ", "secret123").await.unwrap();
    assert_eq!(session, UserSession::logged_in("a@b.com", TOKEN, "Ana"));
    assert_eq!(*auth.session().borrow(), session);
    assert_eq!(factory.sessions().current().credential().bearer_token(), Some(TOKEN));
}

#[tokio::test]
async fn test_failed_login_keeps_guest_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": true,
            "message": "Invalid password"
        })))
        .mount(&server)
        .await;

    let auth: AuthController = factory_for(&server, UserSession::guest()).create();
    let err = auth.login("a@b.com", "wrong-pass").await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Api(ApiError::Status { status: 401, .. })
    ));
    assert!(!auth.session().borrow().is_login);
}

#[tokio::test]
async fn test_register_validates_password_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "error": false,
            "message": "User created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth: AuthController = factory_for(&server, UserSession::guest()).create();
    assert!(matches!(
        auth.register("Ana", "a@b.com", "short").await,
        Err(ServiceError::Validation(_))
    ));

    let created = auth.register("Ana", "a@b.com", "long-enough").await.unwrap();
    assert_eq!(created.message, "User created");
}

// ============================================
// Details and map
// ============================================

#[tokio::test]
async fn test_story_detail_and_map_stories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/stories/story-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "message": "Story fetched successfully",
            "story": story_json("story-1", false)
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/stories"))
        .and(query_param("location", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "message": "Stories fetched successfully",
            "listStory": [story_json("located", true), story_json("nowhere", false)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let controller: StoryController =
        factory_for(&server, UserSession::logged_in("a@b.com", TOKEN, "Ana")).create();

    let detail = controller.story_detail("story-1").await.unwrap();
    assert_eq!(detail.id, "story-1");
    assert!(!detail.has_location());

    let located = controller.stories_with_location().await.unwrap();
    assert_eq!(located.len(), 1);
    assert_eq!(located[0].id, "located");

    assert!(matches!(
        controller.story_detail("  ").await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn test_story_detail_without_story_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/stories/story-gone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "message": "Story fetched successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let controller: StoryController = factory_for(&server, UserSession::guest()).create();
    let err = controller.story_detail("story-gone").await.unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)), "got {:?}", err);
    assert!(!err.is_retryable());
    assert_eq!(err.to_string(), "Not found: story story-gone");
}
