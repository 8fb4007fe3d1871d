//! Attachment reference resolution.

use async_trait::async_trait;

use crate::error::{EngineError, EngineResult};

/// Turns an opaque attachment reference into a retrievable URL.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Resolves `reference` to a URL.
    async fn resolve_url(&self, reference: &str) -> EngineResult<String>;
}

/// Resolves references by joining them onto a fixed base URL.
#[derive(Debug, Clone)]
pub struct StaticUrlAttachments {
    base_url: String,
}

impl StaticUrlAttachments {
    /// Creates a resolver rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AttachmentStore for StaticUrlAttachments {
    async fn resolve_url(&self, reference: &str) -> EngineResult<String> {
        let reference = reference.trim_start_matches('/');
        if reference.is_empty() {
            return Err(EngineError::AttachmentUnavailable {
                message: "empty attachment reference".to_string(),
            });
        }
        Ok(format!("{}/{}", self.base_url, reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_joins_reference_onto_base() {
        let store = StaticUrlAttachments::new("https://files.example.com/leave/");
        let url = store.resolve_url("/req_001/certificate.pdf").await.unwrap();
        assert_eq!(url, "https://files.example.com/leave/req_001/certificate.pdf");
    }

    #[tokio::test]
    async fn test_empty_reference_is_unavailable() {
        let store = StaticUrlAttachments::new("https://files.example.com");
        let result = store.resolve_url("").await;
        assert!(matches!(result, Err(EngineError::AttachmentUnavailable { .. })));
    }
}
