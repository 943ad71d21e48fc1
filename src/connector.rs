//! Entry points the reporting host calls.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::{AuthProvider, AuthType};
use crate::config::{ConfigDescriptor, ConfigParams, ConnectorConfig, DateRange, config_descriptor};
use crate::error::{ConnectorError, Result, UserError};
use crate::graph::{GraphClient, ManagedPage};
use crate::posts::{Post, fetch_page_posts, mock_posts};
use crate::schema::{self, FieldDescriptor, FormatOptions, Row};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataSource {
    #[default]
    Live,
    /// Serve the built-in sample posts instead of calling the Graph API.
    Mock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedField {
    pub name: String,
}

/// A `getData` request from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    #[serde(default)]
    pub config_params: ConfigParams,
    pub date_range: DateRange,
    #[serde(default)]
    pub fields: Vec<RequestedField>,
}

impl DataRequest {
    pub fn field_ids(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaResponse {
    pub schema: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataResponse {
    pub schema: Vec<FieldDescriptor>,
    pub rows: Vec<Row>,
}

pub struct Connector<A> {
    graph: GraphClient,
    auth: A,
    source: DataSource,
    format: FormatOptions,
}

impl<A: AuthProvider> Connector<A> {
    pub fn new(graph: GraphClient, auth: A) -> Self {
        Connector {
            graph,
            auth,
            source: DataSource::Live,
            format: FormatOptions::default(),
        }
    }

    pub fn with_source(mut self, source: DataSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    pub fn graph(&self) -> &GraphClient {
        &self.graph
    }

    pub fn get_auth_type(&self) -> AuthType {
        AuthType::Oauth2
    }

    pub fn is_admin_user(&self) -> bool {
        false
    }

    pub fn get_config(&self) -> ConfigDescriptor {
        config_descriptor()
    }

    pub fn get_schema(&self) -> SchemaResponse {
        SchemaResponse {
            schema: schema::schema(),
        }
    }

    fn token(&self) -> Result<String> {
        self.auth
            .access_token()
            .ok_or_else(|| ConnectorError::Auth("no access token, authorize the connector first".to_string()))
    }

    async fn fetch_posts(&self, config: &ConnectorConfig) -> Result<Vec<Post>> {
        match self.source {
            DataSource::Mock => Ok(mock_posts()),
            DataSource::Live => fetch_page_posts(&self.graph, &self.token()?, config).await,
        }
    }

    async fn try_get_data(&self, request: &DataRequest) -> Result<DataResponse> {
        let range = DateRange::new(request.date_range.start_date, request.date_range.end_date)?;
        let config = ConnectorConfig::from_params(&request.config_params, range)?;
        let ids = request.field_ids();

        let posts = self.fetch_posts(&config).await?;
        info!(
            page_id = config.page_id(),
            metric_type = %config.metric_type(),
            posts = posts.len(),
            fields = ids.len(),
            "formatting rows"
        );

        Ok(DataResponse {
            schema: schema::schema_for(&ids),
            rows: schema::format_rows(&ids, &posts, self.format),
        })
    }

    /// Validates the request, fetches the page's posts and lays them out in
    /// the requested field order.
    pub async fn get_data(&self, request: &DataRequest) -> std::result::Result<DataResponse, UserError> {
        self.try_get_data(request).await.map_err(|e| {
            error!(error = %e, "getData failed");
            UserError::from(e)
        })
    }

    pub async fn list_pages(&self) -> Result<Vec<ManagedPage>> {
        self.graph.fetch_user_pages(&self.token()?).await
    }
}
