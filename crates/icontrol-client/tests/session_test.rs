//! Session tests against a mock iControl REST server
//!
//! Each test starts a wiremock server and points a plain-HTTP session at it.

use icontrol_client::{ClientConfig, IControlError, IControlSession, Scheme};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use wiremock::matchers::{basic_auth, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_for(server: &MockServer) -> IControlSession {
    let addr = server.address();
    let config = ClientConfig::new(addr.ip().to_string(), addr.port()).with_scheme(Scheme::Http);
    IControlSession::new(config).expect("Failed to create session")
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/mgmt/shared/authn/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "admin",
            "loginProviderName": "tmos",
            "token": {"token": token, "userName": "admin", "timeout": 1200}
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PoolMember {
    name: String,
    address: String,
    connection_limit: u32,
    session: Option<String>,
}

#[tokio::test]
async fn test_login_sends_credentials_and_provider() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mgmt/shared/authn/login"))
        .and(basic_auth("admin", "pw"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "username": "admin",
            "password": "pw",
            "loginProviderName": "tmos"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": {"token": "T123"}})))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    session.login("admin", "pw").await.unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some("T123"));
}

#[tokio::test]
async fn test_token_is_attached_after_login() {
    let server = MockServer::start().await;
    mount_login(&server, "T123").await;

    Mock::given(method("GET"))
        .and(path("/mgmt/tm/sys/version"))
        .and(header("X-F5-Auth-Token", "T123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "tm:sys:version:versionstats"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    session.login("admin", "pw").await.unwrap();

    let url = format!("{}/sys/version", session.tm_url());
    let version: Value = session.get(&url).await.unwrap();
    assert_eq!(version["kind"], "tm:sys:version:versionstats");
    assert_eq!(session.headers()["x-f5-auth-token"], "T123");
}

#[tokio::test]
async fn test_failed_login_leaves_session_unauthenticated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mgmt/shared/authn/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 401,
            "message": "Authentication failed."
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/mgmt/tm/ltm/virtual/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let err = session.login("admin", "wrong").await.unwrap_err();

    assert!(matches!(err, IControlError::Authentication { status, .. } if status == StatusCode::UNAUTHORIZED));
    assert!(err.to_string().contains("401"));
    assert!(!session.is_authenticated());
    assert!(session.headers().get("x-f5-auth-token").is_none());

    // Later calls still go out without a token
    let _ = session.list_virtual_servers().await;
    let requests = server.received_requests().await.unwrap();
    let last = requests.last().unwrap();
    assert!(last.headers.get("x-f5-auth-token").is_none());
}

#[tokio::test]
async fn test_login_without_token_field_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mgmt/shared/authn/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "admin"})))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let err = session.login("admin", "pw").await.unwrap_err();

    assert!(matches!(err, IControlError::MissingToken));
    assert!(!session.is_authenticated());
    assert!(session.headers().get("x-f5-auth-token").is_none());
}

#[tokio::test]
async fn test_get_returns_body_unchanged() {
    let server = MockServer::start().await;
    let pool = json!({
        "kind": "tm:ltm:pool:poolstate",
        "name": "web_pool",
        "fullPath": "/Common/web_pool",
        "loadBalancingMode": "round-robin",
        "membersReference": {"link": "https://localhost/mgmt/tm/ltm/pool/~Common~web_pool/members", "isSubcollection": true}
    });

    Mock::given(method("GET"))
        .and(path("/mgmt/tm/ltm/pool/~Common~web_pool"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pool.clone()))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let url = format!("{}/ltm/pool/~Common~web_pool", session.tm_url());
    let body: Value = session.get(&url).await.unwrap();

    assert_eq!(body, pool);
}

#[tokio::test]
async fn test_relative_paths_resolve_against_device_root() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/mgmt/tm/sys/clock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "tm:sys:clock:clockstats"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let body: Value = session.get("/mgmt/tm/sys/clock").await.unwrap();

    assert_eq!(body["kind"], "tm:sys:clock:clockstats");
}

#[tokio::test]
async fn test_write_verbs_send_json_form_of_input() {
    let server = MockServer::start().await;
    let member = PoolMember {
        name: "10.0.0.21:80".to_string(),
        address: "10.0.0.21".to_string(),
        connection_limit: 100,
        session: None,
    };
    let expected = serde_json::to_value(&member).unwrap();
    let resource = "/mgmt/tm/ltm/pool/~Common~web_pool/members/~Common~10.0.0.21:80";

    for verb in ["POST", "PATCH", "PUT"] {
        Mock::given(method(verb))
            .and(path(resource))
            .and(header("Content-Type", "application/json"))
            .and(body_json(expected.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verb": verb, "name": "10.0.0.21:80"})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let session = session_for(&server);
    let url = session.build_url(resource);

    let posted: Value = session.post(&url, &member).await.unwrap();
    let patched: Value = session.patch(&url, &member).await.unwrap();
    let put: Value = session.put(&url, &member).await.unwrap();

    assert_eq!(posted, json!({"verb": "POST", "name": "10.0.0.21:80"}));
    assert_eq!(patched, json!({"verb": "PATCH", "name": "10.0.0.21:80"}));
    assert_eq!(put, json!({"verb": "PUT", "name": "10.0.0.21:80"}));
}

#[tokio::test]
async fn test_non_200_is_an_error_for_every_verb() {
    let server = MockServer::start().await;
    let resource = "/mgmt/tm/ltm/virtual/~Common~vs_missing";

    for (verb, status) in [("GET", 404u16), ("POST", 409), ("PATCH", 400), ("PUT", 500), ("DELETE", 404)] {
        Mock::given(method(verb))
            .and(path(resource))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "code": status,
                "message": format!("{} rejected", verb)
            })))
            .mount(&server)
            .await;
    }

    let session = session_for(&server);
    let url = session.build_url(resource);
    let body = json!({"description": "updated"});

    let results: Vec<(u16, Result<Value, IControlError>)> = vec![
        (404, session.get(&url).await),
        (409, session.post(&url, &body).await),
        (400, session.patch(&url, &body).await),
        (500, session.put(&url, &body).await),
        (404, session.delete(&url).await.map(|()| Value::Null)),
    ];

    for (expected, result) in results {
        let err = result.unwrap_err();
        assert_eq!(err.status().map(|s| s.as_u16()), Some(expected));
        let message = err.to_string();
        assert!(message.contains(&expected.to_string()), "missing status in: {}", message);
        assert!(message.contains("rejected"), "missing body in: {}", message);
    }
}

#[tokio::test]
async fn test_created_is_not_treated_as_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mgmt/tm/ltm/node"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "node1"})))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let result: Result<Value, _> = session.post("/mgmt/tm/ltm/node", &json!({"name": "node1"})).await;

    assert_eq!(result.unwrap_err().status(), Some(StatusCode::CREATED));
}

#[tokio::test]
async fn test_delete_accepts_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/mgmt/tm/ltm/node/~Common~node1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    session.delete("/mgmt/tm/ltm/node/~Common~node1").await.unwrap();
}

#[tokio::test]
async fn test_list_virtual_servers_issues_single_get() {
    let server = MockServer::start().await;
    mount_login(&server, "T123").await;

    let collection = json!({
        "kind": "tm:ltm:virtual:virtualcollectionstate",
        "selfLink": "https://localhost/mgmt/tm/ltm/virtual?ver=15.1.0",
        "items": [
            {"name": "vs_web", "fullPath": "/Common/vs_web", "destination": "/Common/10.0.0.10:443"},
            {"name": "vs_api", "fullPath": "/Common/vs_api", "destination": "/Common/10.0.0.11:443"}
        ]
    });

    Mock::given(method("GET"))
        .and(path("/mgmt/tm/ltm/virtual/"))
        .and(header("X-F5-Auth-Token", "T123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    session.login("admin", "pw").await.unwrap();

    let body = session.list_virtual_servers().await.unwrap();

    assert_eq!(body, collection);
    let gets = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(gets, 1);
}

#[tokio::test]
async fn test_transport_error_keeps_source() {
    // Nothing listens on port 1
    let config = ClientConfig::new("127.0.0.1", 1).with_scheme(Scheme::Http);
    let session = IControlSession::new(config).unwrap();

    let err = session.get::<Value>("/mgmt/tm/sys/version").await.unwrap_err();

    assert!(matches!(err, IControlError::Http(ref e) if e.is_connect()));
    assert!(std::error::Error::source(&err).is_some());
}
