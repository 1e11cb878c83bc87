//! Integration tests for tiktok-research against a mock Research API.
//!
//! Every test starts its own `wiremock` server and points the client at it
//! through `ClientConfig::with_base_url`, so no credentials or network
//! access are needed.
//!
//! Run with: cargo test --test api_tests
//! Set RUST_LOG=tiktok_research=debug to see page fetches.

use std::ops::Range;
use std::sync::Once;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use futures_util::{StreamExt, TryStreamExt};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use tiktok_research::prelude::*;

const VIDEO_QUERY: &str = "/v2/research/video/query/";
const OAUTH_TOKEN: &str = "/v2/oauth/token/";

static INIT: Once = Once::new();

/// Initialize logging for tests
fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Matches requests whose JSON body carries the given `cursor` (or none).
struct CursorIs(Option<i64>);

impl Match for CursorIs {
    fn matches(&self, request: &Request) -> bool {
        match serde_json::from_slice::<Value>(&request.body) {
            Ok(body) => body.get("cursor").and_then(Value::as_i64) == self.0,
            Err(_) => false,
        }
    }
}

/// Matches requests sent without a query string.
struct NoQueryString;

impl Match for NoQueryString {
    fn matches(&self, request: &Request) -> bool {
        request.url.query().is_none()
    }
}

fn live_token() -> BearerToken {
    BearerToken::new("test-token", Utc::now() + Duration::hours(2))
}

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::default().with_base_url(server.uri())
}

async fn create_client(server: &MockServer) -> ResearchClient {
    init_logging();
    ResearchClient::with_config(live_token(), config_for(server)).expect("Failed to create client")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn keyword_query() -> Query {
    Query::builder()
        .and(Condition::is_in(QueryField::RegionCode, ["JP", "US"]))
        .and(Condition::eq(QueryField::Keyword, "animal"))
        .build()
        .unwrap()
}

/// A successful response envelope around `data`.
fn envelope(data: Value) -> Value {
    json!({
        "data": data,
        "error": {"code": "ok", "message": "", "log_id": "202402010000000000"}
    })
}

fn video_page(ids: Range<i64>, cursor: i64, has_more: bool) -> ResponseTemplate {
    let videos: Vec<Value> = ids
        .map(|id| json!({"id": id, "username": format!("user{}", id), "hashtag_names": []}))
        .collect();
    ResponseTemplate::new(200).set_body_json(envelope(json!({
        "videos": videos,
        "cursor": cursor,
        "has_more": has_more,
        "search_id": "search-42"
    })))
}

// ============================================================================
// TOKEN PROVIDER TESTS
// ============================================================================

mod token_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_token() {
        init_logging();
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(OAUTH_TOKEN))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("client_key=my-key"))
            .and(body_string_contains("client_secret=my-secret"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "clt.abc123",
                "expires_in": 7200,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = TokenProvider::new(&config_for(&server)).unwrap();
        let token = provider.create_token("my-key", "my-secret").await.unwrap();

        assert_eq!(token.expose_secret(), "clt.abc123");
        assert_eq!(token.token_type(), "Bearer");
        assert!(!token.is_expired());
        assert!(token.expires_within(Duration::seconds(7201)));
        assert!(!token.expires_within(Duration::seconds(7000)));
    }

    #[tokio::test]
    async fn test_tokens_are_independent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(OAUTH_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "clt.abc123",
                "expires_in": 7200,
                "token_type": "Bearer"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let provider = TokenProvider::new(&config_for(&server)).unwrap();
        let first = provider.create_token("key", "secret").await.unwrap();
        let second = provider.create_token("key", "secret").await.unwrap();

        assert!(second.expires_at() >= first.expires_at());
    }

    #[tokio::test]
    async fn test_invalid_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(OAUTH_TOKEN))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "Client key or secret is incorrect.",
                "log_id": "20240201"
            })))
            .mount(&server)
            .await;

        let provider = TokenProvider::new(&config_for(&server)).unwrap();
        let err = provider.create_token("bad", "creds").await.unwrap_err();

        assert!(err.is_auth_error(), "unexpected error: {:?}", err);
        assert!(err.to_string().contains("invalid_client"));
    }

    #[tokio::test]
    async fn test_rejection_with_success_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(OAUTH_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": "invalid_request",
                "error_description": "Client key is missing.",
                "log_id": "20240201"
            })))
            .mount(&server)
            .await;

        let provider = TokenProvider::new(&config_for(&server)).unwrap();
        let err = provider.create_token("key", "secret").await.unwrap_err();

        assert!(matches!(err, Error::Authentication(_)));
    }

    #[tokio::test]
    async fn test_missing_access_token_is_format_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(OAUTH_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"expires_in": 7200})))
            .mount(&server)
            .await;

        let provider = TokenProvider::new(&config_for(&server)).unwrap();
        let err = provider.create_token("key", "secret").await.unwrap_err();

        assert!(matches!(err, Error::ResponseFormat(_)));
    }

    #[tokio::test]
    async fn test_malformed_token_lifetime_is_format_error() {
        let bodies = [
            json!({"access_token": "clt.abc123", "token_type": "Bearer"}),
            json!({"access_token": "clt.abc123", "expires_in": "7200"}),
            json!({"access_token": "clt.abc123", "expires_in": i64::MAX}),
        ];

        for body in bodies {
            let server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path(OAUTH_TOKEN))
                .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
                .expect(1)
                .mount(&server)
                .await;

            let provider = TokenProvider::new(&config_for(&server)).unwrap();
            let err = provider.create_token("key", "secret").await.unwrap_err();

            assert!(matches!(err, Error::ResponseFormat(_)), "{} gave {:?}", body, err);
        }
    }

    #[tokio::test]
    async fn test_unreachable_auth_endpoint() {
        let config = ClientConfig::default()
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(std::time::Duration::from_secs(5));

        let provider = TokenProvider::new(&config).unwrap();
        let err = provider.create_token("key", "secret").await.unwrap_err();

        assert!(matches!(err, Error::Authentication(_)));
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected_without_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = TokenProvider::new(&config_for(&server)).unwrap();
        assert!(matches!(
            provider.create_token("", "secret").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            provider.create_token("key", "  ").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_builds_client() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(OAUTH_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "clt.fresh",
                "expires_in": 7200,
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v2/research/user/info/"))
            .and(header("authorization", "Bearer clt.fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "display_name": "TikTok",
                "follower_count": 10
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let client = ResearchClient::authenticate_with_config("key", "secret", config_for(&server))
            .await
            .unwrap();
        let info = client.users().info(&Username::new("tiktok")).await.unwrap();

        assert_eq!(info.display_name.as_deref(), Some("TikTok"));
    }
}

// ============================================================================
// VIDEO QUERY TESTS
// ============================================================================

mod video_query_tests {
    use super::*;

    #[tokio::test]
    async fn test_single_page() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(header("authorization", "Bearer test-token"))
            .and(query_param("fields", tiktok_research::models::VIDEO_FIELDS.join(",")))
            .and(body_partial_json(json!({
                "start_date": "20240201",
                "end_date": "20240205",
                "max_count": 100,
                "query": {"and": [
                    {"operation": "IN", "field_name": "region_code", "field_values": ["JP", "US"]},
                    {"operation": "EQ", "field_name": "keyword", "field_values": ["animal"]}
                ]}
            })))
            .respond_with(video_page(1..6, 5, false))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let videos: Vec<Video> = client
            .videos()
            .start_query(keyword_query(), date(2024, 2, 1), date(2024, 2, 5), None)
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        let ids: Vec<i64> = videos.iter().map(|v| v.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(videos[0].username.as_deref(), Some("user1"));
    }

    #[tokio::test]
    async fn test_follows_cursor_and_search_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(CursorIs(None))
            .respond_with(video_page(0..4, 4, true))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(CursorIs(Some(4)))
            .and(body_partial_json(json!({"search_id": "search-42", "start_date": "20240201"})))
            .respond_with(video_page(4..8, 8, true))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(CursorIs(Some(8)))
            .respond_with(video_page(8..12, 12, false))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let stream = client
            .videos()
            .start_query(keyword_query(), date(2024, 2, 1), date(2024, 2, 5), None)
            .unwrap();
        let videos: Vec<Video> = stream.try_collect().await.unwrap();

        let ids: Vec<i64> = videos.iter().map(|v| v.id.get()).collect();
        assert_eq!(ids, (0..12).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_max_count_stops_fetching() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(CursorIs(None))
            .and(body_partial_json(json!({"max_count": 4})))
            .respond_with(video_page(0..4, 4, true))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(CursorIs(Some(4)))
            .respond_with(video_page(4..8, 8, true))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(CursorIs(Some(8)))
            .respond_with(video_page(8..12, 12, false))
            .expect(0)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let config = ClientConfig::default().with_base_url(server.uri()).with_page_size(4);
        let client = ResearchClient::with_config(client.token().clone(), config).unwrap();

        let videos: Vec<Video> = client
            .videos()
            .query(
                VideoQueryRequest::new(
                    keyword_query(),
                    DateRange::new(date(2024, 2, 1), date(2024, 2, 5)).unwrap(),
                )
                .max_count(6),
            )
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(videos.len(), 6);
        assert_eq!(videos.last().map(|v| v.id.get()), Some(5));
    }

    #[tokio::test]
    async fn test_failure_on_second_page() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(CursorIs(None))
            .respond_with(video_page(0..3, 3, true))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(CursorIs(Some(3)))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"code": "internal_error", "message": "Something went wrong", "log_id": "x1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(CursorIs(Some(6)))
            .respond_with(video_page(6..9, 9, false))
            .expect(0)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let mut stream = client
            .videos()
            .start_query(keyword_query(), date(2024, 2, 1), date(2024, 2, 5), None)
            .unwrap();

        let mut ids = Vec::new();
        let mut failure = None;
        while let Some(item) = stream.next().await {
            match item {
                Ok(video) => ids.push(video.id.get()),
                Err(e) => failure = Some(e),
            }
        }

        assert_eq!(ids, vec![0, 1, 2]);
        match failure {
            Some(Error::Request { page, status, code, .. }) => {
                assert_eq!(page, 2);
                assert_eq!(status, Some(500));
                assert_eq!(code.as_deref(), Some("internal_error"));
            }
            other => panic!("Expected Request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_inverted_date_range_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(video_page(0..1, 1, false))
            .expect(0)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let result = client
            .videos()
            .start_query(keyword_query(), date(2024, 2, 5), date(2024, 2, 1), None);

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_query_read_from_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(body_partial_json(json!({
                "query": {"or": [{"operation": "EQ", "field_name": "hashtag_name", "field_values": ["science"]}]}
            })))
            .respond_with(video_page(0..1, 1, false))
            .expect(1)
            .mount(&server)
            .await;

        assert!(serde_json::from_value::<Query>(json!({})).is_err());
        assert!(serde_json::from_value::<Query>(json!({
            "and": [{"operation": "IN", "field_name": "region_code", "field_values": []}]
        }))
        .is_err());

        let query: Query = serde_json::from_value(json!({
            "or": [{"operation": "EQ", "field_name": "hashtag_name", "field_values": ["science"]}]
        }))
        .unwrap();

        let client = create_client(&server).await;
        let videos: Vec<Video> = client
            .videos()
            .start_query(query, date(2024, 2, 1), date(2024, 2, 2), None)
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(videos.len(), 1);
    }

    #[tokio::test]
    async fn test_custom_fields_always_request_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(query_param("fields", "id,username"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "videos": [{"id": 5, "username": "a"}],
                "cursor": 1,
                "has_more": false
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let request = VideoQueryRequest::new(keyword_query(), DateRange::single_day(date(2024, 2, 1)))
            .fields(["username"]);

        let videos: Vec<Video> = client
            .videos()
            .query(request)
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(videos[0].id, VideoId::new(5));
        assert_eq!(videos[0].username.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_expired_token_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(video_page(0..1, 1, false))
            .expect(0)
            .mount(&server)
            .await;

        let expired = BearerToken::new("old-token", Utc::now() - Duration::minutes(1));
        let client = ResearchClient::with_config(expired, config_for(&server)).unwrap();
        let mut stream = client
            .videos()
            .start_query(keyword_query(), date(2024, 2, 1), date(2024, 2, 5), None)
            .unwrap();

        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, Error::TokenExpired));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_with_token_replaces_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(header("authorization", "Bearer renewed"))
            .respond_with(video_page(0..2, 2, false))
            .expect(1)
            .mount(&server)
            .await;

        let expired = BearerToken::new("old-token", Utc::now() - Duration::minutes(1));
        let client = ResearchClient::with_config(expired, config_for(&server)).unwrap();
        let renewed = client.with_token(BearerToken::new("renewed", Utc::now() + Duration::hours(2)));

        let videos: Vec<Video> = renewed
            .videos()
            .start_query(keyword_query(), date(2024, 2, 1), date(2024, 2, 5), None)
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(videos.len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let mut stream = client
            .videos()
            .start_query(keyword_query(), date(2024, 2, 1), date(2024, 2, 5), None)
            .unwrap();

        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            Error::RateLimited { page: 1, retry_after_secs: 30 }
        ));
        assert!(err.is_retryable());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_is_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": "access_token_invalid", "message": "The access token is invalid or not found in the request.", "log_id": "x"}
            })))
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let mut stream = client
            .videos()
            .start_query(keyword_query(), date(2024, 2, 1), date(2024, 2, 5), None)
            .unwrap();

        let err = stream.next().await.unwrap().unwrap_err();
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_error_envelope_with_success_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {},
                "error": {"code": "invalid_params", "message": "Invalid query", "log_id": "x"}
            })))
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let mut stream = client
            .videos()
            .start_query(keyword_query(), date(2024, 2, 1), date(2024, 2, 5), None)
            .unwrap();

        match stream.next().await {
            Some(Err(Error::Request { page, code, message, .. })) => {
                assert_eq!(page, 1);
                assert_eq!(code.as_deref(), Some("invalid_params"));
                assert_eq!(message, "Invalid query");
            }
            other => panic!("Expected Request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_page_is_format_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "videos": "not-a-list",
                "cursor": 0,
                "has_more": false
            }))))
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let mut stream = client
            .videos()
            .start_query(keyword_query(), date(2024, 2, 1), date(2024, 2, 5), None)
            .unwrap();

        assert!(matches!(
            stream.next().await,
            Some(Err(Error::ResponseFormat(_)))
        ));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_raw_records_and_random_flag() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(query_param("fields", "id,voice_to_text"))
            .and(body_partial_json(json!({"is_random": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "videos": [{"id": 1, "voice_to_text": "hello", "new_field": 3}],
                "cursor": 1,
                "has_more": false
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let request = VideoQueryRequest::new(
            keyword_query(),
            DateRange::single_day(date(2024, 2, 1)),
        )
        .random(true)
        .fields(["id", "voice_to_text"]);

        let records: Vec<Value> = client
            .videos()
            .query_as::<Value>(request)
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(records, vec![json!({"id": 1, "voice_to_text": "hello", "new_field": 3})]);
    }

    #[tokio::test]
    async fn test_concurrent_iterators_are_independent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(CursorIs(None))
            .respond_with(video_page(0..2, 2, true))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(VIDEO_QUERY))
            .and(CursorIs(Some(2)))
            .respond_with(video_page(2..4, 4, false))
            .expect(2)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let first = client
            .videos()
            .start_query(keyword_query(), date(2024, 2, 1), date(2024, 2, 5), None)
            .unwrap();
        let second = client
            .videos()
            .start_query(keyword_query(), date(2024, 2, 1), date(2024, 2, 5), None)
            .unwrap();

        let (a, b) = tokio::join!(
            first.try_collect::<Vec<Video>>(),
            second.try_collect::<Vec<Video>>()
        );
        assert_eq!(a.unwrap().len(), 4);
        assert_eq!(b.unwrap().len(), 4);
    }
}

// ============================================================================
// COMMENT AND USER ENDPOINT TESTS
// ============================================================================

mod endpoint_tests {
    use super::*;

    #[tokio::test]
    async fn test_video_comments() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/research/video/comment/list/"))
            .and(body_partial_json(json!({"video_id": 7_301_234_567_890_123_456_i64})))
            .and(CursorIs(None))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "comments": [
                    {"id": 1, "video_id": 7_301_234_567_890_123_456_i64, "text": "first"},
                    {"id": 2, "video_id": 7_301_234_567_890_123_456_i64, "text": "second"}
                ],
                "cursor": 2,
                "has_more": true
            }))))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v2/research/video/comment/list/"))
            .and(CursorIs(Some(2)))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "comments": [{"id": 3, "text": "third"}],
                "cursor": 3,
                "has_more": false
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let mut stream = client
            .videos()
            .comments(VideoId::new(7_301_234_567_890_123_456), None)
            .unwrap();

        let first = stream.next_batch().await.unwrap().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(stream.state().pages_fetched(), 1);

        let second = stream.next_batch().await.unwrap().unwrap();
        assert_eq!(second[0].text.as_deref(), Some("third"));
        assert!(stream.next_batch().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_video_id_rejected() {
        let server = MockServer::start().await;
        let client = create_client(&server).await;

        assert!(matches!(
            client.videos().comments(VideoId::new(0), None),
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_user_info() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/research/user/info/"))
            .and(body_partial_json(json!({"username": "tiktok"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "display_name": "TikTok",
                "bio_description": "",
                "is_verified": true,
                "follower_count": 80_000_000,
                "following_count": 5,
                "likes_count": 400_000_000,
                "video_count": 1200
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let info = client.users().info(&Username::new("tiktok")).await.unwrap();

        assert_eq!(info.is_verified, Some(true));
        assert_eq!(info.video_count, Some(1200));
    }

    #[tokio::test]
    async fn test_blank_username_rejected() {
        let server = MockServer::start().await;
        let client = create_client(&server).await;

        let err = client.users().info(&Username::new("")).await.unwrap_err();
        assert!(err.is_validation_error());
        assert!(client.users().followers(&Username::new(" "), None).is_err());
    }

    #[tokio::test]
    async fn test_followers_with_max_count() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/research/user/followers/"))
            .and(NoQueryString)
            .and(body_partial_json(json!({"username": "tiktok", "max_count": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "user_followers": [
                    {"display_name": "A", "username": "a"},
                    {"display_name": "B", "username": "b"},
                    {"display_name": "C", "username": "c"}
                ],
                "cursor": 1_706_745_600,
                "has_more": true
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let followers: Vec<UserFollower> = client
            .users()
            .followers(&Username::new("tiktok"), Some(3))
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        let names: Vec<&str> = followers.iter().map(|f| f.username.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_liked_videos_seed_cursor_with_start_time() {
        let server = MockServer::start().await;
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        Mock::given(method("POST"))
            .and(path("/v2/research/user/liked_videos/"))
            .and(CursorIs(Some(start.timestamp())))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "user_liked_videos": [{"id": 11}],
                "cursor": 1_706_000_000,
                "has_more": false,
                "search_id": "liked-1"
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let videos: Vec<Video> = client
            .users()
            .liked_videos(&Username::new("someone"), Some(start), None)
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id, VideoId::new(11));
    }

    #[tokio::test]
    async fn test_pinned_videos() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/research/user/pinned_videos/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
                "pinned_videos_list": [{"id": 21}, {"id": 22}]
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&server).await;
        let videos = client
            .users()
            .pinned_videos(&Username::new("someone"))
            .await
            .unwrap();

        assert_eq!(videos.iter().map(|v| v.id.get()).collect::<Vec<_>>(), vec![21, 22]);
    }
}
