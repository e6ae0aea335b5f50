use super::client::HttpClient;
use async_trait::async_trait;
use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A plain `reqwest` client with connect and request timeouts. A timed-out
/// request surfaces as [`crate::error::LoadError::Network`].
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_timeout_is_within_request_timeout() {
        assert!(CONNECT_TIMEOUT < REQUEST_TIMEOUT);
        assert!(BasicClient::new().is_ok());
    }
}
