//! Facebook page post statistics for reporting tools.
//!
//! Fetches a page's posts for a date range from the Graph API, follows the
//! result pagination, overlays per-post insights, and lays the result out as
//! host rows in the requested field order.

pub mod auth;
pub mod config;
pub mod connector;
pub mod error;
pub mod graph;
pub mod posts;
pub mod schema;
pub mod util;

pub use auth::{AuthProvider, AuthType, OAuthCredentials, OAuthService, StaticToken, TokenStore};
pub use config::{ConfigParams, ConnectorConfig, DateRange, MetricType};
pub use connector::{Connector, DataRequest, DataResponse, DataSource, RequestedField};
pub use error::{ConnectorError, UserError};
pub use graph::{GraphClient, ManagedPage};
pub use posts::{Counters, Post, PostType};
pub use schema::{Cell, FormatOptions, Row};

use std::fs::File;
use std::path::Path;

use csv::Writer;

/// Writes rows as CSV with the field ids as header.
pub fn write_rows_to_csv<S: AsRef<str>>(ids: &[S], rows: &[Row], path: &Path) -> error::Result<()> {
    let file = File::create(path)?;
    let mut wtr = Writer::from_writer(file);

    let header: Vec<&str> = ids.iter().map(AsRef::<str>::as_ref).collect();
    wtr.write_record(&header)?;
    for row in rows {
        wtr.write_record(row.values.iter().map(ToString::to_string))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes managed pages as CSV.
pub fn write_pages_to_csv(pages: &[ManagedPage], path: &Path) -> error::Result<()> {
    let file = File::create(path)?;
    let mut wtr = Writer::from_writer(file);
    for page in pages {
        wtr.serialize(page)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_rows_to_csv() {
        let rows = vec![
            Row {
                values: vec![Cell::Text("1_1".to_string()), Cell::Number(5)],
            },
            Row {
                values: vec![Cell::Text("1_2, with comma".to_string()), Cell::Number(0)],
            },
        ];

        let temp_file = NamedTempFile::new().unwrap();
        write_rows_to_csv(&["postId", "likes"], &rows, temp_file.path()).unwrap();

        let content = fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "postId,likes\n1_1,5\n\"1_2, with comma\",0\n");
    }

    #[test]
    fn test_write_pages_to_csv() {
        let pages = vec![ManagedPage {
            id: "123".to_string(),
            name: Some("Test Page".to_string()),
            category: None,
        }];

        let temp_file = NamedTempFile::new().unwrap();
        write_pages_to_csv(&pages, temp_file.path()).unwrap();

        let content = fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "id,name,category\n123,Test Page,\n");
    }

    #[test]
    fn test_csv_writing_to_invalid_path() {
        let result = write_rows_to_csv::<&str>(&[], &[], Path::new("/invalid/path/that/does/not/exist/file.csv"));
        assert!(result.is_err());
    }
}
