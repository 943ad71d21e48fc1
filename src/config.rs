//! Connector configuration: the raw parameters the host sends, the validated
//! [`ConnectorConfig`] built from them, and the config form the host renders.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, Result};
use crate::util::{is_valid_page_id, unix_midnight};

/// Which group of statistics to pull for each post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    #[default]
    Basic,
    Engagement,
    Reactions,
}

impl MetricType {
    pub const ALL: [MetricType; 3] = [MetricType::Basic, MetricType::Engagement, MetricType::Reactions];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Basic => "basic",
            MetricType::Engagement => "engagement",
            MetricType::Reactions => "reactions",
        }
    }

    fn label(self) -> &'static str {
        match self {
            MetricType::Basic => "Basic",
            MetricType::Engagement => "Engagement",
            MetricType::Reactions => "Reactions",
        }
    }

    /// Whether posts fetched with this selector get the per-post insights call.
    pub fn wants_insights(self) -> bool {
        matches!(self, MetricType::Basic | MetricType::Engagement)
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basic" => Ok(MetricType::Basic),
            "engagement" => Ok(MetricType::Engagement),
            "reactions" => Ok(MetricType::Reactions),
            other => Err(ConnectorError::Validation(format!(
                "Unknown statistics type '{other}'. Choose basic, engagement or reactions."
            ))),
        }
    }
}

/// Inclusive date range, `YYYY-MM-DD` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        if start_date > end_date {
            return Err(ConnectorError::Validation(format!(
                "The start date {start_date} is after the end date {end_date}."
            )));
        }
        Ok(DateRange { start_date, end_date })
    }

    pub fn since(&self) -> i64 {
        unix_midnight(self.start_date)
    }

    pub fn until(&self) -> i64 {
        unix_midnight(self.end_date)
    }
}

/// Parameters as entered in the host's config form. Everything is optional here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigParams {
    pub page_id: Option<String>,
    pub metric_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    page_id: String,
    metric_type: MetricType,
    date_range: DateRange,
}

impl ConnectorConfig {
    /// Validates raw host parameters.
    ///
    /// A missing page id is rejected, a missing statistics type becomes
    /// [`MetricType::Basic`].
    pub fn from_params(params: &ConfigParams, date_range: DateRange) -> Result<Self> {
        let page_id = params
            .page_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ConnectorError::Validation("Please provide a Facebook page identifier.".to_string()))?;

        if !is_valid_page_id(page_id) {
            return Err(ConnectorError::Validation(format!(
                "'{page_id}' is not a valid Facebook page identifier."
            )));
        }

        let metric_type = match params.metric_type.as_deref().map(str::trim) {
            None | Some("") => MetricType::default(),
            Some(value) => value.parse()?,
        };

        Ok(ConnectorConfig {
            page_id: page_id.to_string(),
            metric_type,
            date_range,
        })
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// One entry in the host's config form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigEntry {
    Info {
        id: String,
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    TextInput {
        id: String,
        name: String,
        help_text: String,
        placeholder: String,
        allow_override: bool,
    },
    #[serde(rename_all = "camelCase")]
    SelectSingle {
        id: String,
        name: String,
        help_text: String,
        options: Vec<SelectOption>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDescriptor {
    pub config_params: Vec<ConfigEntry>,
    pub date_range_required: bool,
}

pub fn config_descriptor() -> ConfigDescriptor {
    ConfigDescriptor {
        config_params: vec![
            ConfigEntry::Info {
                id: "instructions".to_string(),
                text: "Enter a Facebook page identifier to fetch post statistics.".to_string(),
            },
            ConfigEntry::TextInput {
                id: "pageId".to_string(),
                name: "Facebook page identifier".to_string(),
                help_text: "e.g. \"123456789\"".to_string(),
                placeholder: "Page identifier".to_string(),
                allow_override: true,
            },
            ConfigEntry::SelectSingle {
                id: "metricType".to_string(),
                name: "Statistics type".to_string(),
                help_text: "Choose which statistics to show".to_string(),
                options: MetricType::ALL
                    .iter()
                    .map(|metric| SelectOption {
                        label: metric.label().to_string(),
                        value: metric.as_str().to_string(),
                    })
                    .collect(),
            },
        ],
        date_range_required: true,
    }
}
