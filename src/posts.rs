use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ConnectorConfig, MetricType};
use crate::error::Result;
use crate::graph::{GraphClient, InsightsResponse};

const BASIC_FIELDS: &str = "id,created_time,type,message,permalink_url";
const SUMMARY_FIELDS: &str = "shares,comments.summary(true),reactions.summary(true)";
const REACTION_ALIASES: [(&str, &str); 6] = [
    ("LIKE", "likes"),
    ("LOVE", "love"),
    ("WOW", "wow"),
    ("HAHA", "haha"),
    ("SAD", "sad"),
    ("ANGRY", "angry"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    Status,
    Link,
    Photo,
    Video,
    Offer,
    Event,
    Note,
    Album,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PostType {
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Status => "status",
            PostType::Link => "link",
            PostType::Photo => "photo",
            PostType::Video => "video",
            PostType::Offer => "offer",
            PostType::Event => "event",
            PostType::Note => "note",
            PostType::Album => "album",
            PostType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub reach: u64,
    pub impressions: u64,
    pub engagement: u64,
    pub love: u64,
    pub wow: u64,
    pub haha: u64,
    pub sad: u64,
    pub angry: u64,
}

/// A post with its counters flattened, ready for formatting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: String,
    pub created_time: Option<DateTime<FixedOffset>>,
    pub post_type: PostType,
    pub message: String,
    pub permalink: String,
    pub counters: Counters,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub total_count: u64,
}

/// An edge requested with `.summary(...)`; only the summary is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryEdge {
    pub summary: Option<Summary>,
}

impl SummaryEdge {
    fn total(edge: &Option<SummaryEdge>) -> Option<u64> {
        edge.as_ref()?.summary.as_ref().map(|s| s.total_count)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SharesCount {
    #[serde(default)]
    pub count: u64,
}

/// A post as returned by the `/{page}/posts` edge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPost {
    pub id: String,
    pub created_time: Option<String>,
    #[serde(rename = "type")]
    pub post_type: Option<PostType>,
    pub message: Option<String>,
    pub permalink_url: Option<String>,
    pub reactions: Option<SummaryEdge>,
    pub comments: Option<SummaryEdge>,
    pub shares: Option<SharesCount>,
    pub likes: Option<SummaryEdge>,
    pub love: Option<SummaryEdge>,
    pub wow: Option<SummaryEdge>,
    pub haha: Option<SummaryEdge>,
    pub sad: Option<SummaryEdge>,
    pub angry: Option<SummaryEdge>,
}

/// Parses Graph API timestamps such as `2025-03-01T10:00:00+0000`.
pub fn parse_created_time(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}

impl RawPost {
    /// Flattens the nested summaries. Missing objects count as 0.
    pub fn normalize(self) -> Post {
        let counters = Counters {
            likes: SummaryEdge::total(&self.reactions)
                .or_else(|| SummaryEdge::total(&self.likes))
                .unwrap_or(0),
            comments: SummaryEdge::total(&self.comments).unwrap_or(0),
            shares: self.shares.as_ref().map_or(0, |s| s.count),
            love: SummaryEdge::total(&self.love).unwrap_or(0),
            wow: SummaryEdge::total(&self.wow).unwrap_or(0),
            haha: SummaryEdge::total(&self.haha).unwrap_or(0),
            sad: SummaryEdge::total(&self.sad).unwrap_or(0),
            angry: SummaryEdge::total(&self.angry).unwrap_or(0),
            ..Counters::default()
        };

        Post {
            created_time: self.created_time.as_deref().and_then(parse_created_time),
            id: self.id,
            post_type: self.post_type.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            permalink: self.permalink_url.unwrap_or_default(),
            counters,
        }
    }
}

/// The `fields` parameter for the posts edge.
pub fn fields_for_metric_type(metric_type: MetricType) -> String {
    match metric_type {
        MetricType::Basic | MetricType::Engagement => format!("{BASIC_FIELDS},{SUMMARY_FIELDS}"),
        MetricType::Reactions => {
            let mut fields = BASIC_FIELDS.to_string();
            for (reaction, alias) in REACTION_ALIASES {
                fields.push_str(&format!(",reactions.type({reaction}).summary(total_count).as({alias})"));
            }
            fields
        }
    }
}

fn apply_insights(counters: &mut Counters, response: InsightsResponse) {
    if let Some(error) = response.error {
        debug!(error = %error.message, "insights unavailable");
        return;
    }
    for insight in response.data.unwrap_or_default() {
        match insight.name.as_str() {
            "post_impressions" => counters.impressions = insight.first_value(),
            "post_impressions_unique" => counters.reach = insight.first_value(),
            "post_engaged_users" => counters.engagement = insight.first_value(),
            _ => {}
        }
    }
}

/// Normalizes posts and overlays per-post insights, one call at a time.
///
/// A failed insights call leaves that post's impressions, reach and
/// engagement at 0 and never fails the whole batch.
pub async fn enrich_posts(
    client: &GraphClient,
    token: &str,
    raw: Vec<RawPost>,
    metric_type: MetricType,
) -> Vec<Post> {
    let mut posts = Vec::with_capacity(raw.len());

    for raw_post in raw {
        let mut post = raw_post.normalize();

        if metric_type.wants_insights() {
            match client.fetch_insights(&post.id, token).await {
                Ok(response) => apply_insights(&mut post.counters, response),
                Err(e) => warn!(post_id = %post.id, error = %e, "failed to fetch post insights"),
            }
        }

        posts.push(post);
    }

    posts
}

/// Fetches every post of the configured page in its date range, then enriches them.
pub async fn fetch_page_posts(client: &GraphClient, token: &str, config: &ConnectorConfig) -> Result<Vec<Post>> {
    let range = config.date_range();
    let fields = fields_for_metric_type(config.metric_type());
    let url = client.posts_url(config.page_id(), &fields, range.since(), range.until())?;

    let raw: Vec<RawPost> = client.fetch_all(url.as_str(), token).await?;
    info!(page_id = config.page_id(), posts = raw.len(), "fetched page posts");

    Ok(enrich_posts(client, token, raw, config.metric_type()).await)
}

fn sample_post(id: &str, created: &str, post_type: PostType, message: &str, counters: [u64; 6]) -> Post {
    let [likes, comments, shares, reach, impressions, engagement] = counters;
    Post {
        id: id.to_string(),
        created_time: parse_created_time(created),
        post_type,
        message: message.to_string(),
        permalink: format!("https://www.facebook.com/{id}"),
        counters: Counters {
            likes,
            comments,
            shares,
            reach,
            impressions,
            engagement,
            ..Counters::default()
        },
    }
}

/// Fixed sample posts served when the connector runs without the Graph API.
pub fn mock_posts() -> Vec<Post> {
    vec![
        sample_post(
            "123456789_111111111",
            "2025-03-01T10:00:00+0000",
            PostType::Status,
            "Sample Facebook post",
            [50, 10, 5, 1000, 1500, 65],
        ),
        sample_post(
            "123456789_222222222",
            "2025-03-02T14:30:00+0000",
            PostType::Link,
            "An interesting article",
            [120, 25, 30, 2500, 3000, 175],
        ),
        sample_post(
            "123456789_333333333",
            "2025-03-05T09:15:00+0000",
            PostType::Photo,
            "A beautiful photo from our event",
            [300, 45, 80, 5000, 6200, 425],
        ),
    ]
}
