use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use eyre::{eyre, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::{
    auth::GroupMembershipProvider,
    config::AzureAdConfig,
    model::{GroupId, UserId},
};

const LOGIN_BASE: &str = "https://login.microsoftonline.com";
const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
/// Graph rejects batches with more requests than this
pub const MAX_BATCH_REQUESTS: usize = 20;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Looks up user display names.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Users that could not be found are missing from the result.
    async fn display_names(&self, user_ids: &[UserId]) -> Result<HashMap<UserId, String>>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

#[derive(Debug, Deserialize)]
struct DirectoryObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MembersPage {
    value: Vec<DirectoryObject>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRequest {
    pub id: String,
    pub method: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRequestBody {
    pub requests: Vec<BatchRequest>,
}

#[derive(Debug, Deserialize)]
struct BatchResponseBody {
    responses: Vec<BatchResponse>,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    status: u16,
    body: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphUser {
    id: String,
    display_name: Option<String>,
}

/// Microsoft Graph with application permissions
pub struct GraphClient {
    http: reqwest::Client,
    azure_ad: AzureAdConfig,
    token: Mutex<Option<CachedToken>>,
}

impl GraphClient {
    pub fn new(azure_ad: AzureAdConfig) -> Result<GraphClient> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .wrap_err("error building http client")?;
        Ok(GraphClient {
            http,
            azure_ad,
            token: Mutex::new(None),
        })
    }

    /// Client credentials token, reused until shortly before it expires
    #[instrument(skip(self), level = "trace")]
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }
        debug!("requesting Graph access token");
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            LOGIN_BASE, self.azure_ad.tenant_id
        );
        let response: TokenResponse = self
            .http
            .post(url)
            .form(&[
                ("client_id", self.azure_ad.client_id.as_str()),
                ("client_secret", self.azure_ad.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .wrap_err("error requesting access token")?
            .error_for_status()
            .wrap_err("token endpoint returned an error")?
            .json()
            .await
            .wrap_err("error parsing token response")?;
        let lifetime = Duration::from_secs(response.expires_in);
        let token = CachedToken {
            access_token: response.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        };
        *cached = Some(token.clone());
        Ok(token.access_token)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn is_transitive_member(&self, group_id: GroupId, user_id: UserId) -> Result<bool> {
        let token = self.access_token().await?;
        let user = user_id.0.as_hyphenated().to_string();
        let mut next_url = Some(format!(
            "{}/groups/{}/transitiveMembers?$select=id",
            GRAPH_BASE,
            group_id.0.as_hyphenated()
        ));
        while let Some(url) = next_url {
            let page: MembersPage = self
                .http
                .get(&url)
                .bearer_auth(&token)
                .send()
                .await
                .wrap_err("error requesting group members")?
                .error_for_status()
                .wrap_err("Graph returned an error listing group members")?
                .json()
                .await
                .wrap_err("error parsing group members")?;
            if page.value.iter().any(|member| member.id == user) {
                return Ok(true);
            }
            next_url = page.next_link;
        }
        Ok(false)
    }

    #[instrument(skip(self, user_ids), fields(count = user_ids.len()), level = "debug")]
    pub async fn get_display_names(&self, user_ids: &[UserId]) -> Result<HashMap<UserId, String>> {
        let mut names = HashMap::new();
        if user_ids.is_empty() {
            return Ok(names);
        }
        let token = self.access_token().await?;
        for body in batch_requests(user_ids) {
            let response: BatchResponseBody = self
                .http
                .post(format!("{}/$batch", GRAPH_BASE))
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await
                .wrap_err("error sending Graph batch request")?
                .error_for_status()
                .wrap_err("Graph returned an error for batch request")?
                .json()
                .await
                .wrap_err("error parsing Graph batch response")?;
            names.extend(parse_batch_response(response)?);
        }
        Ok(names)
    }
}

#[async_trait]
impl GroupMembershipProvider for GraphClient {
    async fn is_member(&self, group_id: GroupId, user_id: UserId) -> Result<bool> {
        self.is_transitive_member(group_id, user_id).await
    }
}

#[async_trait]
impl UserDirectory for GraphClient {
    async fn display_names(&self, user_ids: &[UserId]) -> Result<HashMap<UserId, String>> {
        self.get_display_names(user_ids).await
    }
}

/// One `$batch` body per `MAX_BATCH_REQUESTS` distinct users
pub fn batch_requests(user_ids: &[UserId]) -> Vec<BatchRequestBody> {
    let mut unique: Vec<UserId> = user_ids.to_vec();
    unique.sort();
    unique.dedup();
    unique
        .chunks(MAX_BATCH_REQUESTS)
        .map(|chunk| BatchRequestBody {
            requests: chunk
                .iter()
                .enumerate()
                .map(|(i, user_id)| BatchRequest {
                    id: (i + 1).to_string(),
                    method: "GET",
                    url: format!(
                        "/users/{}?$select=id,displayName",
                        user_id.0.as_hyphenated()
                    ),
                })
                .collect(),
        })
        .collect()
}

fn parse_batch_response(response: BatchResponseBody) -> Result<HashMap<UserId, String>> {
    let mut names = HashMap::new();
    for item in response.responses {
        if item.status != 200 {
            // deleted users and guests without a directory object
            warn!(status = item.status, "user lookup in batch failed");
            continue;
        }
        let body = item
            .body
            .ok_or_else(|| eyre!("batch response without body"))?;
        let user: GraphUser =
            serde_json::from_value(body).wrap_err("error parsing user in batch response")?;
        let id = uuid::Uuid::parse_str(&user.id).wrap_err("invalid user id from Graph")?;
        names.insert(UserId(id), user.display_name.unwrap_or_default());
    }
    Ok(names)
}
