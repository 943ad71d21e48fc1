//! The fixed set of output fields and the formatter that turns posts into
//! host rows.

use serde::Serialize;

use crate::posts::Post;
use crate::util::{format_host_date, sanitize_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConceptType {
    Dimension,
    Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemanticType {
    Text,
    YearMonthDay,
    Url,
    Number,
}

impl SemanticType {
    fn data_type(self) -> &'static str {
        match self {
            SemanticType::Number => "NUMBER",
            _ => "STRING",
        }
    }
}

/// A single cell of an output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(u64),
}

impl Cell {
    pub fn empty() -> Self {
        Cell::Text(String::new())
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
        }
    }
}

pub struct FieldSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub concept: ConceptType,
    pub semantic: SemanticType,
    extract: fn(&Post) -> Cell,
}

impl FieldSpec {
    pub fn extract(&self, post: &Post) -> Cell {
        (self.extract)(post)
    }

    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.id.to_string(),
            label: self.label.to_string(),
            data_type: self.semantic.data_type(),
            semantics: Semantics {
                concept_type: self.concept,
                semantic_type: self.semantic,
            },
            default_aggregation_type: (self.concept == ConceptType::Metric).then_some("SUM"),
        }
    }
}

const fn dimension(
    id: &'static str,
    label: &'static str,
    semantic: SemanticType,
    extract: fn(&Post) -> Cell,
) -> FieldSpec {
    FieldSpec {
        id,
        label,
        concept: ConceptType::Dimension,
        semantic,
        extract,
    }
}

const fn metric(id: &'static str, label: &'static str, extract: fn(&Post) -> Cell) -> FieldSpec {
    FieldSpec {
        id,
        label,
        concept: ConceptType::Metric,
        semantic: SemanticType::Number,
        extract,
    }
}

pub static FIELDS: &[FieldSpec] = &[
    dimension("postId", "Post ID", SemanticType::Text, |p| Cell::Text(p.id.clone())),
    dimension("postDate", "Publication Date", SemanticType::YearMonthDay, |p| {
        Cell::Text(p.created_time.as_ref().map(format_host_date).unwrap_or_default())
    }),
    dimension("postType", "Post Type", SemanticType::Text, |p| {
        Cell::Text(p.post_type.as_str().to_string())
    }),
    dimension("postMessage", "Post Message", SemanticType::Text, |p| Cell::Text(p.message.clone())),
    dimension("permalink", "Post Link", SemanticType::Url, |p| Cell::Text(p.permalink.clone())),
    metric("likes", "Likes", |p| Cell::Number(p.counters.likes)),
    metric("comments", "Comments", |p| Cell::Number(p.counters.comments)),
    metric("shares", "Shares", |p| Cell::Number(p.counters.shares)),
    metric("reach", "Reach", |p| Cell::Number(p.counters.reach)),
    metric("impressions", "Impressions", |p| Cell::Number(p.counters.impressions)),
    metric("engagement", "Engagement", |p| Cell::Number(p.counters.engagement)),
    metric("love", "Love", |p| Cell::Number(p.counters.love)),
    metric("wow", "Wow", |p| Cell::Number(p.counters.wow)),
    metric("haha", "Haha", |p| Cell::Number(p.counters.haha)),
    metric("sad", "Sad", |p| Cell::Number(p.counters.sad)),
    metric("angry", "Angry", |p| Cell::Number(p.counters.angry)),
];

pub fn field(id: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Semantics {
    pub concept_type: ConceptType,
    pub semantic_type: SemanticType,
}

/// A field as declared to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub data_type: &'static str,
    pub semantics: Semantics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_aggregation_type: Option<&'static str>,
}

impl FieldDescriptor {
    /// Text column for a requested id the connector does not know. Its cells are always empty.
    pub fn unknown(id: &str) -> Self {
        FieldDescriptor {
            name: id.to_string(),
            label: id.to_string(),
            data_type: SemanticType::Text.data_type(),
            semantics: Semantics {
                concept_type: ConceptType::Dimension,
                semantic_type: SemanticType::Text,
            },
            default_aggregation_type: None,
        }
    }
}

/// Every field the connector offers.
pub fn schema() -> Vec<FieldDescriptor> {
    FIELDS.iter().map(FieldSpec::descriptor).collect()
}

/// One descriptor per requested id, in request order, so the schema is as
/// wide as the rows [`format_rows`] builds for the same ids.
pub fn schema_for<S: AsRef<str>>(ids: &[S]) -> Vec<FieldDescriptor> {
    ids.iter()
        .map(|id| match field(id.as_ref()) {
            Some(spec) => spec.descriptor(),
            None => FieldDescriptor::unknown(id.as_ref()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub values: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Strip non-ASCII characters and line breaks from text cells.
    pub ascii_text: bool,
}

/// One row per post with values laid out in `ids` order. Unknown ids yield an
/// empty string.
pub fn format_rows<S: AsRef<str>>(ids: &[S], posts: &[Post], options: FormatOptions) -> Vec<Row> {
    let fields: Vec<Option<&FieldSpec>> = ids.iter().map(|id| field(id.as_ref())).collect();

    posts
        .iter()
        .map(|post| Row {
            values: fields
                .iter()
                .map(|spec| match spec.map(|s| s.extract(post)) {
                    Some(Cell::Text(text)) if options.ascii_text => Cell::Text(sanitize_text(&text)),
                    Some(cell) => cell,
                    None => Cell::empty(),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::mock_posts;
    use serde_json::json;

    #[test]
    fn test_rows_follow_requested_order() {
        let posts = mock_posts();
        let rows = format_rows(&["shares", "postId"], &posts, FormatOptions::default());

        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0].values,
            vec![Cell::Number(5), Cell::Text("123456789_111111111".to_string())]
        );
        assert_eq!(
            rows[2].values,
            vec![Cell::Number(80), Cell::Text("123456789_333333333".to_string())]
        );
    }

    #[test]
    fn test_unknown_field_is_empty_string() {
        let posts = mock_posts();
        let rows = format_rows(&["likes", "followers", "postDate"], &posts[..1], FormatOptions::default());
        assert_eq!(
            serde_json::to_value(&rows[0]).unwrap(),
            json!({"values": [50, "", "20250301"]})
        );
    }

    #[test]
    fn test_every_field_extracts() {
        let posts = mock_posts();
        let ids: Vec<&str> = FIELDS.iter().map(|f| f.id).collect();
        let rows = format_rows(&ids, &posts, FormatOptions::default());
        assert_eq!(rows[1].values.len(), FIELDS.len());
        assert_eq!(rows[1].values[2], Cell::Text("link".to_string()));
        assert_eq!(rows[1].values[9], Cell::Number(3000));
    }

    #[test]
    fn test_ascii_text_option() {
        let mut posts = mock_posts();
        posts[0].message = "Świetny\ndzień 🎉".to_string();
        let rows = format_rows(&["postMessage", "likes"], &posts[..1], FormatOptions { ascii_text: true });
        assert_eq!(rows[0].values, vec![Cell::Text("wietny dzie".to_string()), Cell::Number(50)]);
    }

    #[test]
    fn test_schema_descriptors() {
        let all = schema();
        assert_eq!(all.len(), FIELDS.len());

        let json = serde_json::to_value(&all[1]).unwrap();
        assert_eq!(
            json,
            json!({
                "name": "postDate",
                "label": "Publication Date",
                "dataType": "STRING",
                "semantics": {"conceptType": "DIMENSION", "semanticType": "YEAR_MONTH_DAY"}
            })
        );

        let likes = serde_json::to_value(field("likes").unwrap().descriptor()).unwrap();
        assert_eq!(likes["dataType"], "NUMBER");
        assert_eq!(likes["defaultAggregationType"], "SUM");
    }

    #[test]
    fn test_schema_for_keeps_request_order() {
        let schema = schema_for(&["reach", "bogus", "postId"]);
        let names: Vec<&str> = schema.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["reach", "bogus", "postId"]);

        assert_eq!(schema[1], FieldDescriptor::unknown("bogus"));
        assert_eq!(schema[1].data_type, "STRING");
        assert!(schema[1].default_aggregation_type.is_none());
    }

    #[test]
    fn test_schema_and_rows_have_same_width() {
        let ids = ["followers", "shares", "postId", "bogus"];
        let schema = schema_for(&ids);
        let rows = format_rows(&ids, &mock_posts(), FormatOptions::default());
        assert!(rows.iter().all(|row| row.values.len() == schema.len()));
    }

    #[test]
    fn test_field_ids_are_unique() {
        for (i, a) in FIELDS.iter().enumerate() {
            assert!(FIELDS[i + 1..].iter().all(|b| b.id != a.id), "duplicate field id {}", a.id);
        }
    }
}
