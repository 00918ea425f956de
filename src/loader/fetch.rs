//! Dataset fetching from disk or over HTTP.

use crate::loader::{ColumnarDataset, LoadError};
use crate::models::SchemeRecord;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Where the dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Local file; relative paths resolve against the working directory.
    Path(PathBuf),
    /// Remote document fetched with a single GET.
    Url(String),
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Source::Url(s.to_string())
        } else {
            Source::Path(PathBuf::from(s))
        }
    }
}

impl FromStr for Source {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Source::from(s))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Load and transpose the dataset. One attempt, no retry.
///
/// `timeout` bounds the remote request; local reads are not bounded.
pub async fn load_records(
    source: &Source,
    timeout: Duration,
) -> Result<Vec<SchemeRecord>, LoadError> {
    let content = match source {
        Source::Path(path) => read_file(path).await?,
        Source::Url(url) => fetch_url(url, timeout).await?,
    };

    debug!("Read {} bytes from {}", content.len(), source);
    ColumnarDataset::from_json(&content)?.into_records()
}

/// Load the dataset, recovering from any failure with an empty snapshot.
///
/// The failure is logged and not surfaced; aggregations over the empty
/// snapshot then produce NaN and empty results.
pub async fn load_or_empty(source: &Source, timeout: Duration) -> Vec<SchemeRecord> {
    match load_records(source, timeout).await {
        Ok(records) => {
            info!("Loaded {} scheme records from {}", records.len(), source);
            records
        }
        Err(e) => {
            error!("Error loading dataset from {}: {}", source, e);
            Vec::new()
        }
    }
}

async fn read_file(path: &Path) -> Result<String, LoadError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

async fn fetch_url(url: &str, timeout: Duration) -> Result<String, LoadError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use tokio_test::block_on;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn fixture_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/finance.json")
    }

    /// Serve a single HTTP response on a loopback port and return its URL.
    fn serve_once(status_line: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/finance.json", listener.local_addr().unwrap());

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        url
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!(
            "https://example.org/finance.json".parse::<Source>().unwrap(),
            Source::Url("https://example.org/finance.json".to_string())
        );
        assert_eq!(
            "finance.json".parse::<Source>().unwrap(),
            Source::Path(PathBuf::from("finance.json"))
        );
        assert_eq!(
            Source::from("data/finance.json").to_string(),
            "data/finance.json"
        );
        assert_eq!(
            Source::from("http://localhost:5173/finance.json"),
            Source::Url("http://localhost:5173/finance.json".to_string())
        );
    }

    #[test]
    fn test_load_fixture() {
        let records = block_on(load_records(&Source::Path(fixture_path()), TIMEOUT)).unwrap();

        assert_eq!(records.len(), 12);
        assert!(records.iter().any(|r| !r.is_valid_for_cost_analysis()));
    }

    #[test]
    fn test_load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"MedicalSchemeId": {{"0": 5}}, "TotalMonthlyCostMainMember": {{"0": 980.0}}}}"#
        )
        .unwrap();

        let source = Source::Path(file.path().to_path_buf());
        let records = block_on(load_records(&source, TIMEOUT)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 5);
        assert_eq!(records[0].main_cost, 980.0);
        assert_eq!(records[0].child_cost, 0.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = Source::Path(dir.path().join("absent.json"));

        let result = block_on(load_records(&source, TIMEOUT));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_load_or_empty_recovers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not a dataset").unwrap();

        let source = Source::Path(file.path().to_path_buf());
        let records = block_on(load_or_empty(&source, TIMEOUT));
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_from_url() {
        let body = std::fs::read_to_string(fixture_path()).unwrap();
        let source = Source::from(serve_once("200 OK", body).as_str());

        let records = block_on(load_records(&source, TIMEOUT)).unwrap();
        assert_eq!(records.len(), 12);
    }

    #[test]
    fn test_non_success_status_is_status_error() {
        let source = Source::from(serve_once("404 Not Found", String::new()).as_str());

        let result = block_on(load_records(&source, TIMEOUT));
        match result {
            Err(LoadError::Status { url, status }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/finance.json"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_url_is_http_error() {
        // Bind then drop to get a loopback port with nothing listening.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let source = Source::Url(format!("http://127.0.0.1:{}/finance.json", port));

        let result = block_on(load_records(&source, TIMEOUT));
        assert!(matches!(result, Err(LoadError::Http(_))));

        let records = block_on(load_or_empty(&source, TIMEOUT));
        assert!(records.is_empty());
    }
}
