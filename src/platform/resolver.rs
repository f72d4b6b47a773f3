//! Share-link resolution

use crate::error::DydlError;
use crate::platform::client::HttpSession;
use crate::utils::url::{extract_content_id, is_short_link, ContentId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns user-supplied URLs into content IDs
pub struct UrlResolver {
    session: Arc<HttpSession>,
    short_link_hosts: Vec<String>,
}

impl UrlResolver {
    pub fn new(session: Arc<HttpSession>, short_link_hosts: Vec<String>) -> Self {
        Self {
            session,
            short_link_hosts,
        }
    }

    /// Expand the URL if it is a short link; otherwise return it unchanged.
    ///
    /// Network failures are returned, never retried.
    pub async fn canonical_url(&self, url: &str) -> Result<String, DydlError> {
        let url = url.trim();
        if !is_short_link(url, &self.short_link_hosts) {
            return Ok(url.to_string());
        }

        debug!(url, "Expanding short link");
        match self.session.follow_redirects(url).await {
            Ok(resolved) => {
                info!(from = url, to = %resolved, "Short link expanded");
                Ok(resolved)
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to expand short link");
                Err(e)
            }
        }
    }

    /// Resolve the content ID behind `url`.
    ///
    /// `Ok(None)` means no ID pattern matched the (expanded) URL.
    pub async fn resolve(&self, url: &str) -> Result<Option<ContentId>, DydlError> {
        let canonical = self.canonical_url(url).await?;
        let id = extract_content_id(&canonical);
        match &id {
            Some(id) => debug!(url = %canonical, id = %id, "Extracted content ID"),
            None => debug!(url = %canonical, "No content ID pattern matched"),
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkSettings;
    use crate::core::cookies::{CookieStatus, ResolvedSession};
    use mockito::Matcher;
    use std::time::Duration;

    fn resolver_for(hosts: &[&str], session: ResolvedSession) -> UrlResolver {
        let network = NetworkSettings {
            request_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let domains: Vec<String> = hosts.iter().map(|h| h.to_string()).collect();
        let http = HttpSession::new(&network, &domains, &session).unwrap();
        UrlResolver::new(Arc::new(http), domains)
    }

    fn no_cookies() -> ResolvedSession {
        ResolvedSession::empty(CookieStatus::Disabled)
    }

    #[tokio::test]
    async fn test_short_link_redirect_is_followed() {
        let mut server = mockito::Server::new_async().await;
        let target = format!("{}/video/123456?x=1", server.url());
        let short = server
            .mock("GET", "/abc")
            .with_status(302)
            .with_header("location", &target)
            .create_async()
            .await;
        let landing = server
            .mock("GET", Matcher::Regex(r"^/video/123456".to_string()))
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let resolver = resolver_for(&["127.0.0.1"], no_cookies());
        let id = resolver.resolve(&format!("{}/abc", server.url())).await.unwrap();

        assert_eq!(id.map(|id| id.to_string()), Some("123456".to_string()));
        short.assert_async().await;
        landing.assert_async().await;
    }

    #[tokio::test]
    async fn test_short_link_request_carries_header_cookies() {
        let mut server = mockito::Server::new_async().await;
        let target = format!("{}/video/42/", server.url());
        let short = server
            .mock("GET", "/s")
            .match_header("cookie", Matcher::Regex("ttwid=abc".to_string()))
            .with_status(302)
            .with_header("location", &target)
            .create_async()
            .await;

        let session = ResolvedSession {
            cookie_header: Some("ttwid=abc".to_string()),
            cookie_jar_path: None,
            status: CookieStatus::LoadedHeader { pairs: 1 },
        };
        let resolver = resolver_for(&["127.0.0.1"], session);
        let id = resolver.resolve(&format!("{}/s", server.url())).await.unwrap();

        assert_eq!(id.map(|id| id.to_string()), Some("42".to_string()));
        short.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_short_link_is_not_requested() {
        let resolver = resolver_for(&["v.douyin.com"], no_cookies());
        let id = resolver
            .resolve("https://platform.example/item/987")
            .await
            .unwrap();
        assert_eq!(id.map(|id| id.to_string()), Some("987".to_string()));
    }

    #[tokio::test]
    async fn test_no_pattern_match() {
        let resolver = resolver_for(&["v.douyin.com"], no_cookies());
        let id = resolver.resolve("https://platform.example/user/abc").await.unwrap();
        assert!(id.is_none());
    }

    #[tokio::test]
    async fn test_network_failure_is_reported() {
        let resolver = resolver_for(&["127.0.0.1"], no_cookies());
        let result = resolver.resolve("http://127.0.0.1:1/abc").await;
        assert!(matches!(result, Err(DydlError::Http(_))));
    }
}
