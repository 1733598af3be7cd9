//! Fetching remote and local resources
//!
//! Manifest locations can be `http(s)://` URLs, `file://` URLs or plain
//! host paths. A missing local file is reported as status 404 so callers
//! see the same failure shape as an HTTP miss.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use xb_core::FetchError;

/// Raw response of a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn ok(body: Vec<u8>) -> Self {
        Self { status: 200, body }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Source of bytes for a location
pub trait Fetcher {
    /// Perform the request. Non-success statuses are not errors here.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResponse, FetchError>>;

    /// Fetch and require a success status
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> {
        async move {
            let response = self.fetch(url).await?;
            if !response.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: response.status,
                });
            }
            Ok(response.body)
        }
    }
}

impl<T: Fetcher> Fetcher for &T {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResponse, FetchError>> {
        (**self).fetch(url)
    }
}

/// Where a location string points
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Http(Url),
    File(PathBuf),
}

fn classify(location: &str) -> Result<Target, FetchError> {
    match Url::parse(location) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(Target::Http(url)),
            "file" => url
                .to_file_path()
                .map(Target::File)
                .map_err(|_| FetchError::InvalidLocation(location.to_string())),
            // Single letter schemes are Windows drive prefixes
            scheme if scheme.len() == 1 => Ok(Target::File(PathBuf::from(location))),
            _ => Err(FetchError::InvalidLocation(location.to_string())),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Target::File(PathBuf::from(location))),
        Err(e) => Err(FetchError::InvalidLocation(format!("{}: {}", location, e))),
    }
}

/// Fetcher backed by `reqwest` for HTTP and `tokio::fs` for local files
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    client: reqwest::Client,
}

impl DefaultFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }

    async fn fetch_http(&self, url: Url) -> Result<FetchResponse, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url.clone()).send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport)?;
        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }

    async fn fetch_file(&self, location: &str, path: PathBuf) -> Result<FetchResponse, FetchError> {
        match tokio::fs::read(&path).await {
            Ok(body) => {
                tracing::debug!("Read {:?} ({} bytes)", path, body.len());
                Ok(FetchResponse::ok(body))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse::not_found()),
            Err(e) => Err(FetchError::Transport {
                url: location.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

impl Fetcher for DefaultFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        match classify(url)? {
            Target::Http(parsed) => self.fetch_http(parsed).await,
            Target::File(path) => self.fetch_file(url, path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert!(matches!(
            classify("https://example.com/demo/manifest.json"),
            Ok(Target::Http(_))
        ));
        assert_eq!(
            classify("games/demo/manifest.json"),
            Ok(Target::File(PathBuf::from("games/demo/manifest.json")))
        );
        assert_eq!(
            classify("/srv/x16/demo.zip"),
            Ok(Target::File(PathBuf::from("/srv/x16/demo.zip")))
        );
        assert!(matches!(
            classify("ftp://example.com/demo.zip"),
            Err(FetchError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_response_status() {
        assert!(FetchResponse::ok(vec![1]).is_success());
        assert!(!FetchResponse::not_found().is_success());
        let redirect = FetchResponse {
            status: 304,
            body: Vec::new(),
        };
        assert!(!redirect.is_success());
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, b"{}").unwrap();

        let fetcher = DefaultFetcher::new(Duration::from_secs(5), "test").unwrap();
        let response = fetcher.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(response, FetchResponse::ok(b"{}".to_vec()));

        let missing = dir.path().join("missing.json");
        let err = fetcher
            .fetch_bytes(missing.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.prg");
        std::fs::write(&path, [0x01, 0x08]).unwrap();

        let url = Url::from_file_path(&path).unwrap();
        let fetcher = DefaultFetcher::new(Duration::from_secs(5), "test").unwrap();
        let bytes = fetcher.fetch_bytes(url.as_str()).await.unwrap();
        assert_eq!(bytes, vec![0x01, 0x08]);
    }
}
