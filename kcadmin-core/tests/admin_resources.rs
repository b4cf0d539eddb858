//! Integration tests for commands, queries and resource facades over real
//! HTTP, through the configured KeycloakAdmin entry point.

#![cfg(feature = "reqwest-transport")]

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use kcadmin_core::{
    Command, ContentType, Criteria, GrantConfig, KcAdminError, KeycloakAdmin, KeycloakConfig,
    Method, PathParams, Query, Secret, TransportError, UserRepresentation,
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string_contains, header, method, path, query_param},
};

fn jwt() -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let claims = json!({ "sub": "admin", "exp": (Utc::now() + Duration::minutes(5)).timestamp() });
    format!("{}.{}.sig", header, URL_SAFE_NO_PAD.encode(claims.to_string()))
}

/// Helper to start a mock server that issues tokens and an admin client
/// pointed at it.
async fn setup() -> (MockServer, KeycloakAdmin, String) {
    let server = MockServer::start().await;
    let access = jwt();

    Mock::given(method("POST"))
        .and(path("/realms/master/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access,
            "refresh_token": jwt(),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = KeycloakConfig::new(
        server.uri(),
        GrantConfig::Password {
            username: "admin".to_string(),
            password: Secret::new("admin"),
            client_id: "admin-cli".to_string(),
        },
    )
    .with_realm("demo");

    let admin = KeycloakAdmin::new(&config).unwrap();
    (server, admin, access)
}

#[tokio::test]
async fn test_search_users_with_criteria() {
    let (server, admin, access) = setup().await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/demo/users"))
        .and(query_param("search", "jane doe"))
        .and(query_param("max", "10"))
        .and(header("Authorization", format!("Bearer {}", access).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u-2", "username": "jane.doe" },
            { "id": "u-1", "username": "jane" },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let users = admin
        .users()
        .search(
            Some(Criteria::new().with("search", "jane doe").with("max", 10)),
            None,
        )
        .await
        .unwrap();

    let ids: Vec<_> = users.iter().filter_map(|u| u.id.as_deref()).collect();
    assert_eq!(ids, vec!["u-2", "u-1"]);
}

#[tokio::test]
async fn test_create_user_sends_json() {
    let (server, admin, _access) = setup().await;

    Mock::given(method("POST"))
        .and(path("/admin/realms/demo/users"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({ "username": "jane", "enabled": true })))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", format!("{}/admin/realms/demo/users/u-1", server.uri())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = admin
        .users()
        .create(&UserRepresentation::new("jane"), None)
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert!(response.header("location").unwrap().ends_with("/users/u-1"));
}

#[tokio::test]
async fn test_form_command() {
    let (server, admin, _access) = setup().await;

    Mock::given(method("POST"))
        .and(path("/admin/realms/demo/attack-detection/brute-force/users/u-1"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("reason=locked"))
        .and(body_string_contains("attempts=3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let command = Command::new(
        "/admin/realms/{realm}/attack-detection/brute-force/users/{userId}",
        Method::Post,
        PathParams::new().with("realm", "demo").with("userId", "u-1"),
    )
    .with_payload(&json!({ "reason": "locked", "attempts": 3 }))
    .unwrap()
    .with_content_type(ContentType::FormParams);

    let response = admin.command_executor().execute_command(command).await.unwrap();
    assert_eq!(response.status, 204);
}

#[tokio::test]
async fn test_raw_array_query() {
    let (server, admin, _access) = setup().await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/demo/clients/c-1/user-sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s-1", "username": "jane", "clients": { "c-1": "web" } },
        ])))
        .mount(&server)
        .await;

    let query: Query<Vec<Value>> = Query::new(
        "/admin/realms/{realm}/clients/{clientUuid}/user-sessions",
        PathParams::new().with("realm", "demo").with("clientUuid", "c-1"),
    );
    let sessions = admin.query_executor().execute_query(query).await.unwrap();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["clients"]["c-1"], "web");
}

#[tokio::test]
async fn test_identity_provider_in_other_realm() {
    let (server, admin, _access) = setup().await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/partners/identity-provider/instances/github"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "alias": "github",
            "providerId": "github",
            "config": { "clientId": "abc" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = admin
        .identity_providers()
        .get("github", Some("partners"))
        .await
        .unwrap();

    assert_eq!(provider.provider_id.as_deref(), Some("github"));
    assert!(provider.extra.contains_key("config"));
}

#[tokio::test]
async fn test_not_found_is_a_client_error() {
    let (server, admin, _access) = setup().await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/demo/users/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "User not found" })),
        )
        .mount(&server)
        .await;

    let result = admin.users().get("missing", None).await;

    match result {
        Err(KcAdminError::Transport(TransportError::Client { status, body })) => {
            assert_eq!(status, 404);
            assert!(body.contains("User not found"));
        }
        other => panic!("expected 404, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wrong_shape_is_a_deserialization_error() {
    let (server, admin, _access) = setup().await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/demo/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": [] })))
        .mount(&server)
        .await;

    let result = admin.users().all(None, None).await;

    assert!(matches!(
        result,
        Err(KcAdminError::DeserializationFailed { .. })
    ));
}
