use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use crate::config::Endpoints;
use crate::roster::errors::RosterError;
use crate::roster::operations;
use crate::roster::types::{CampaignInfo, CharacterPayload};

const USER_AGENT: &str = concat!("hpwatch/", env!("CARGO_PKG_VERSION"));

/// Source of campaign rosters.
///
/// The coordinator only depends on this trait so tests can supply a fixed
/// roster without a network.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Look up the campaign the seed character belongs to.
    async fn resolve(&self, seed_id: &str) -> Result<CampaignInfo, RosterError>;
}

/// Resolves rosters from the character JSON API.
#[derive(Debug, Clone)]
pub struct ApiRosterResolver {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl ApiRosterResolver {
    pub fn new(endpoints: Endpoints, request_timeout: Duration) -> Result<Self, RosterError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()
            .map_err(|source| RosterError::ClientBuild { source })?;

        Ok(Self { client, endpoints })
    }
}

#[async_trait]
impl RosterSource for ApiRosterResolver {
    async fn resolve(&self, seed_id: &str) -> Result<CampaignInfo, RosterError> {
        let url = self.endpoints.character_api_url(seed_id);
        info!(event = "core.roster.resolve_started", seed_id = seed_id, url = %url);

        let result = fetch_campaign(&self.client, &url, seed_id).await;

        match &result {
            Ok(campaign) => info!(
                event = "core.roster.resolve_completed",
                seed_id = seed_id,
                campaign = %campaign.name,
                member_count = campaign.members.len()
            ),
            Err(e) => error!(
                event = "core.roster.resolve_failed",
                seed_id = seed_id,
                error = %e
            ),
        }

        result
    }
}

async fn fetch_campaign(
    client: &reqwest::Client,
    url: &str,
    seed_id: &str,
) -> Result<CampaignInfo, RosterError> {
    let request_err = |source| RosterError::Request {
        seed_id: seed_id.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(request_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(RosterError::Status {
            seed_id: seed_id.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(request_err)?;
    let payload: CharacterPayload =
        serde_json::from_slice(&body).map_err(|e| RosterError::Decode {
            seed_id: seed_id.to_string(),
            message: e.to_string(),
        })?;

    Ok(operations::campaign_from_payload(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HpWatchError;
    use crate::roster::types::RosterMember;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver_for(server: &MockServer) -> ApiRosterResolver {
        let endpoints = Endpoints {
            api_base: format!("{}/character", server.uri()),
            page_base: format!("{}/characters", server.uri()),
        };
        ApiRosterResolver::new(endpoints, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_campaign() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/character/100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "name": "Aldric",
                    "campaign": {
                        "id": 7,
                        "name": "Curse of Strahd",
                        "characters": [
                            {"characterId": 100, "characterName": "Aldric"},
                            {"characterId": 200, "characterName": "Mira"}
                        ]
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let campaign = resolver_for(&server).resolve("100").await.unwrap();

        assert_eq!(campaign.name, "Curse of Strahd");
        assert_eq!(campaign.seed_name, "Aldric");
        assert_eq!(
            campaign.members,
            vec![RosterMember::new("100", "Aldric"), RosterMember::new("200", "Mira")]
        );
    }

    #[tokio::test]
    async fn test_resolve_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/character/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = resolver_for(&server).resolve("404").await.unwrap_err();
        assert!(matches!(err, RosterError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_resolve_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/character/100"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = resolver_for(&server).resolve("100").await.unwrap_err();
        assert!(matches!(err, RosterError::Decode { .. }));
        assert!(err.to_string().contains("'100'"));
    }

    #[tokio::test]
    async fn test_resolve_missing_data_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": false})))
            .mount(&server)
            .await;

        let err = resolver_for(&server).resolve("100").await.unwrap_err();
        assert!(matches!(err, RosterError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_resolve_connection_refused() {
        let endpoints = Endpoints {
            api_base: "http://127.0.0.1:1/character".to_string(),
            page_base: "http://127.0.0.1:1/characters".to_string(),
        };
        let resolver = ApiRosterResolver::new(endpoints, Duration::from_secs(2)).unwrap();

        let err = resolver.resolve("100").await.unwrap_err();
        assert!(matches!(err, RosterError::Request { .. }));
        assert_eq!(err.error_code(), "ROSTER_REQUEST_FAILED");
    }
}
