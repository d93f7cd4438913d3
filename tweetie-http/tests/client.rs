use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;
use tweetie_http::{Auth, HttpClient, HttpError, RequestOpts};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Profile {
    screen_name: String,
    statuses_count: u64,
}

#[tokio::test]
async fn get_json_sends_query_and_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/users/show.json"))
        .and(query_param("screen_name", "jack"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"screen_name": "jack", "statuses_count": 3})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let got: Profile = client
        .get_json(
            "1.1/users/show.json",
            RequestOpts {
                auth: Some(Auth::Bearer("tok")),
                query: Some(vec![("screen_name", Cow::Borrowed("jack"))]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(
        got,
        Profile {
            screen_name: "jack".into(),
            statuses_count: 3
        }
    );
}

#[tokio::test]
async fn rate_limit_is_returned_without_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "3")
                .set_body_json(serde_json::json!({
                    "errors": [{"code": 88, "message": "Rate limit exceeded"}]
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Retries apply to 5xx only; `expect(1)` fails the test on a second call.
    let client = HttpClient::new(&server.uri()).unwrap().with_retries(3);
    let err = client
        .get_json::<serde_json::Value>(
            "1.1/statuses/user_timeline.json",
            RequestOpts::default(),
        )
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(3)));
    match err {
        HttpError::Api { message, .. } => assert_eq!(message, "Rate limit exceeded"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap().with_retries(1);
    let got: serde_json::Value = client
        .get_json("ping", RequestOpts::default())
        .await
        .unwrap();
    assert_eq!(got["ok"], true);
}

#[tokio::test]
async fn post_form_uses_basic_auth() {
    let server = MockServer::start().await;
    // base64("key:secret")
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("authorization", "Basic a2V5OnNlY3JldA=="))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"token_type": "bearer", "access_token": "AAA"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let got: serde_json::Value = client
        .post_form_json(
            "oauth2/token",
            RequestOpts {
                auth: Some(Auth::Basic {
                    user: Cow::Borrowed("key"),
                    password: Cow::Borrowed("secret"),
                }),
                form: Some(vec![("grant_type", Cow::Borrowed("client_credentials"))]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(got["access_token"], "AAA");
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let err = client
        .get_json::<Profile>("x", RequestOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Decode(_, ref snippet) if snippet == "not json"));
}
