use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::client::HttpClient;
use super::fetch_bytes;
use crate::error::{LoadError, Result};

/// Retrieves a named resource. The only suspension point of a pipeline run.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, name: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: Retriever + ?Sized> Retriever for Box<T> {
    async fn retrieve(&self, name: &str) -> Result<Vec<u8>> {
        (**self).retrieve(name).await
    }
}

pub struct HttpRetriever<C> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> HttpRetriever<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Absolute names are used as-is; relative names are joined to the base.
    pub fn resolve(&self, name: &str) -> String {
        if name.starts_with("http://") || name.starts_with("https://") {
            return name.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            name.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl<C: HttpClient> Retriever for HttpRetriever<C> {
    #[tracing::instrument(skip(self))]
    async fn retrieve(&self, name: &str) -> Result<Vec<u8>> {
        let url = self.resolve(name);
        let bytes = fetch_bytes(&self.client, &url).await?;
        info!(url = %url, bytes = bytes.len(), "Dataset fetched");
        Ok(bytes)
    }
}

pub struct FileRetriever {
    root: PathBuf,
}

impl FileRetriever {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Retriever for FileRetriever {
    #[tracing::instrument(skip(self))]
    async fn retrieve(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), bytes = bytes.len(), "Dataset read");
        Ok(bytes)
    }
}
