use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yahoo_fantasy::api::http_client::create_http_client_with_timeout;
use yahoo_fantasy::api::{
    FantasyClient, FreeAgentQuery, GameKey, ReqwestTransport, ResourceRouter,
};
use yahoo_fantasy::auth::{FileCredentials, OAuthCredentials, StaticToken};
use yahoo_fantasy::error::AppError;

const FREE_AGENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fantasy_content xmlns="http://fantasysports.yahooapis.com/fantasy/v2/base.rng">
  <league><players>
    <player>
      <player_key>385.p.4244</player_key>
      <name><full>Free Agent</full></name>
      <editorial_team_abbr>Sac</editorial_team_abbr>
      <eligible_positions><position>SF</position><position>PF</position></eligible_positions>
    </player>
  </players></league>
</fantasy_content>"#;

fn transport() -> ReqwestTransport {
    ReqwestTransport::new(create_http_client_with_timeout(5).unwrap())
        .with_retries(0, std::time::Duration::from_millis(1))
}

#[tokio::test]
async fn test_expired_token_is_refreshed_persisted_and_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/league/385.l.77/players;status=A;sort=AR;sort_type=lastmonth;start=0"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            "Please provide valid credentials. OAuth oauth_problem=\"token_expired\"",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/league/385.l.77/players;status=A;sort=AR;sort_type=lastmonth;start=0"))
        .and(header("Authorization", "Bearer fresh"))
        .and(query_param("format", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FREE_AGENTS))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth2/get_token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=keep-me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "refresh_token": "keep-me",
            "expires_in": 3600,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let credentials_path = dir.path().join("oauth.json");
    let mut stored = OAuthCredentials::new("client", "secret");
    stored.access_token = Some("stale".to_string());
    stored.refresh_token = Some("keep-me".to_string());
    stored
        .extra
        .insert("xoauth_yahoo_guid".to_string(), json!("GUID"));
    std::fs::write(&credentials_path, serde_json::to_string(&stored).unwrap()).unwrap();

    let http = create_http_client_with_timeout(5).unwrap();
    let credentials = FileCredentials::load(&credentials_path, http)
        .await
        .unwrap()
        .with_endpoints(
            format!("{}/oauth2/get_token", server.uri()),
            format!("{}/oauth2/request_auth", server.uri()),
        );
    let router = ResourceRouter::with_base_url(server.uri(), GameKey::new(385));
    let mut client = FantasyClient::new(transport(), credentials, router);

    let records = client
        .league_free_agents(77, &FreeAgentQuery::default())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["player_name"], "Free Agent");
    assert_eq!(records[0]["eligible_positions"], "SF, PF");
    assert_eq!(records[0]["team"], "SAC");

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&credentials_path).unwrap()).unwrap();
    assert_eq!(saved["access_token"], "fresh");
    assert_eq!(saved["xoauth_yahoo_guid"], "GUID");
    assert!(saved.get("expires_at").is_some());
}

#[tokio::test]
async fn test_static_token_cannot_recover_from_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let router = ResourceRouter::with_base_url(server.uri(), GameKey::new(385));
    let mut client = FantasyClient::new(transport(), StaticToken::new("fixed"), router);
    let err = client.league_standings(1).await.unwrap_err();
    assert!(matches!(err, AppError::Credentials(_)));
}

#[tokio::test]
async fn test_not_found_is_not_an_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let router = ResourceRouter::with_base_url(server.uri(), GameKey::new(385));
    let mut client = FantasyClient::new(transport(), StaticToken::new("fixed"), router);
    let err = client.game_metadata().await.unwrap_err();
    assert!(matches!(err, AppError::ApiNotFound { .. }));
}
