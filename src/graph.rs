//! Thin client for the read-only Graph API endpoints the connector uses.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{ConnectorError, Result};

pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com/v18.0";

const POSTS_PAGE_LIMIT: &str = "100";
const INSIGHT_METRICS: &str = "post_impressions,post_impressions_unique,post_engaged_users";

#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub code: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paging {
    pub next: Option<String>,
}

/// One page of a paginated edge: `{data, paging: {next}}` or `{error}`.
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct GraphPage<T> {
    pub data: Option<Vec<T>>,
    pub paging: Option<Paging>,
    pub error: Option<GraphErrorBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightValue {
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Insight {
    pub name: String,
    #[serde(default)]
    pub values: Vec<InsightValue>,
}

impl Insight {
    /// First reported value as a counter. Fractional numbers are rounded;
    /// anything else reads as 0.
    pub fn first_value(&self) -> u64 {
        let Some(value) = self.values.first().and_then(|v| v.value.as_ref()) else {
            return 0;
        };
        if let Some(n) = value.as_u64() {
            return n;
        }
        match value.as_f64() {
            Some(f) if f.is_finite() && f >= 0.0 => f.round() as u64,
            _ => {
                debug!(metric = %self.name, %value, "insight value is not a counter, reading as 0");
                0
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InsightsResponse {
    pub data: Option<Vec<Insight>>,
    pub error: Option<GraphErrorBody>,
}

/// A page the authenticated user manages.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ManagedPage {
    pub id: String,
    pub name: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    error: Option<GraphErrorBody>,
}

#[derive(Debug, Clone)]
pub struct GraphClient {
    http: Client,
    base_url: String,
}

impl GraphClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_GRAPH_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        GraphClient {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}/{}", self.base_url, path))?)
    }

    pub fn posts_url(&self, page_id: &str, fields: &str, since: i64, until: i64) -> Result<Url> {
        let mut url = self.endpoint(&format!("{page_id}/posts"))?;
        url.query_pairs_mut()
            .append_pair("fields", fields)
            .append_pair("since", &since.to_string())
            .append_pair("until", &until.to_string())
            .append_pair("limit", POSTS_PAGE_LIMIT);
        Ok(url)
    }

    pub fn insights_url(&self, post_id: &str) -> Result<Url> {
        let mut url = self.endpoint(&format!("{post_id}/insights"))?;
        url.query_pairs_mut().append_pair("metric", INSIGHT_METRICS);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        // The Graph API reports failures in the body, so the status code is not checked.
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetches every item of a paginated edge, following `paging.next` until
    /// it is absent. The first page carrying an `error` aborts the fetch.
    pub async fn fetch_all<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url.to_string());
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            let page: GraphPage<T> = self.get_json(&url, token).await?;
            if let Some(error) = page.error {
                return Err(ConnectorError::Graph(error.message));
            }

            pages += 1;
            let data = page.data.unwrap_or_default();
            debug!(page = pages, items = data.len(), "fetched result page");
            items.extend(data);

            next = page.paging.and_then(|paging| paging.next);
        }

        Ok(items)
    }

    pub async fn fetch_insights(&self, post_id: &str, token: &str) -> Result<InsightsResponse> {
        let url = self.insights_url(post_id)?;
        self.get_json(url.as_str(), token).await
    }

    pub async fn fetch_user_pages(&self, token: &str) -> Result<Vec<ManagedPage>> {
        let url = self.endpoint("me/accounts")?;
        self.fetch_all(url.as_str(), token).await
    }

    /// Checks a token against `/me`.
    pub async fn verify_token(&self, token: &str) -> Result<()> {
        let url = self.endpoint("me")?;
        let me: MeResponse = self.get_json(url.as_str(), token).await?;
        match me.error {
            Some(error) => Err(ConnectorError::Auth(error.message)),
            None => Ok(()),
        }
    }
}

impl Default for GraphClient {
    fn default() -> Self {
        Self::new()
    }
}
