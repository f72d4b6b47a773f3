//! HTTP session used to expand short/share links

use crate::config::NetworkSettings;
use crate::core::cookies::ResolvedSession;
use crate::error::DydlError;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect, Client, ClientBuilder, Url};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Browser-identifying headers shared by the HTTP session and the fetch tool
pub fn browser_headers(network: &NetworkSettings) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("User-Agent".to_string(), network.user_agent.clone());
    headers.insert("Accept".to_string(), network.accept.clone());
    headers.insert("Accept-Language".to_string(), network.accept_language.clone());
    headers.insert("Upgrade-Insecure-Requests".to_string(), "1".to_string());
    headers
}

/// Configured client with its own cookie store
pub struct HttpSession {
    client: Client,
    jar: Arc<Jar>,
}

impl HttpSession {
    /// Build the session and register the header cookies for `cookie_domains`
    pub fn new(
        network: &NetworkSettings,
        cookie_domains: &[String],
        session: &ResolvedSession,
    ) -> Result<Self, DydlError> {
        let jar = Arc::new(Jar::default());
        let pairs = session.header_pairs();
        if !pairs.is_empty() {
            register_cookies(&jar, &pairs, cookie_domains);
        }

        let client = ClientBuilder::new()
            .default_headers(to_header_map(&browser_headers(network))?)
            .timeout(network.request_timeout)
            .redirect(redirect::Policy::limited(network.max_redirects))
            .cookie_provider(jar.clone())
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, jar })
    }

    /// Cookie store consulted on every request
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    /// GET `url`, following redirects, and return the final URL
    pub async fn follow_redirects(&self, url: &str) -> Result<String, DydlError> {
        let response = self.client.get(url).send().await?;
        let final_url = response.url().to_string();
        debug!(from = url, to = %final_url, status = %response.status(), "Followed redirects");
        Ok(final_url)
    }
}

/// Register `name=value` pairs in the jar.
///
/// A domain with a leading dot (`.douyin.com`) yields a domain cookie that
/// also matches subdomains; anything else is host-only.
pub fn register_cookies(jar: &Jar, pairs: &[(String, String)], domains: &[String]) {
    for domain in domains {
        let host = domain.trim_start_matches('.');
        let origin = match Url::parse(&format!("https://{}/", host)) {
            Ok(origin) => origin,
            Err(e) => {
                warn!(domain = %domain, error = %e, "Skipping invalid cookie domain");
                continue;
            }
        };

        for (name, value) in pairs {
            let cookie = if domain.starts_with('.') {
                format!("{}={}; Domain={}; Path=/", name, value, host)
            } else {
                format!("{}={}; Path=/", name, value)
            };
            jar.add_cookie_str(&cookie, &origin);
        }
        debug!(domain = %domain, count = pairs.len(), "Registered header cookies");
    }
}

fn to_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, DydlError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| DydlError::Config(format!("invalid header name {:?}: {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| DydlError::Config(format!("invalid value for header {}: {}", name, e)))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cookies::CookieStatus;
    use reqwest::cookie::CookieStore;

    fn header_session(header: &str) -> ResolvedSession {
        ResolvedSession {
            cookie_header: Some(header.to_string()),
            cookie_jar_path: None,
            status: CookieStatus::LoadedHeader { pairs: 0 },
        }
    }

    fn sorted_cookies(jar: &Jar, url: &str) -> Vec<String> {
        let header = jar
            .cookies(&Url::parse(url).unwrap())
            .map(|value| value.to_str().unwrap().to_string())
            .unwrap_or_default();
        let mut cookies: Vec<String> = header
            .split("; ")
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        cookies.sort();
        cookies
    }

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers(&NetworkSettings::default());
        assert!(headers["User-Agent"].starts_with("Mozilla/5.0"));
        assert_eq!(headers["Accept-Language"], "zh-CN,zh;q=0.9,en;q=0.8");
        assert!(!headers.contains_key("Cookie"));
    }

    #[test]
    fn test_header_cookies_are_registered() {
        let session = HttpSession::new(
            &NetworkSettings::default(),
            &[".douyin.com".to_string()],
            &header_session("a=1; b=2; malformed; c=3"),
        )
        .unwrap();

        let jar = session.cookie_jar();
        assert_eq!(sorted_cookies(jar, "https://v.douyin.com/abc/"), vec!["a=1", "b=2", "c=3"]);
        assert_eq!(sorted_cookies(jar, "https://www.douyin.com/video/1"), vec!["a=1", "b=2", "c=3"]);
        assert!(sorted_cookies(jar, "https://example.com/").is_empty());
    }

    #[test]
    fn test_host_only_cookie_domain() {
        let jar = Jar::default();
        register_cookies(
            &jar,
            &[("ttwid".to_string(), "xyz".to_string())],
            &["v.douyin.com".to_string()],
        );

        assert_eq!(sorted_cookies(&jar, "https://v.douyin.com/a"), vec!["ttwid=xyz"]);
        assert!(sorted_cookies(&jar, "https://www.douyin.com/a").is_empty());
    }

    #[test]
    fn test_session_without_cookies() {
        let session = HttpSession::new(
            &NetworkSettings::default(),
            &[".douyin.com".to_string()],
            &ResolvedSession::empty(CookieStatus::Disabled),
        )
        .unwrap();
        assert!(sorted_cookies(session.cookie_jar(), "https://v.douyin.com/").is_empty());
    }

    #[test]
    fn test_invalid_header_value_is_config_error() {
        let network = NetworkSettings {
            user_agent: "bad\nagent".to_string(),
            ..Default::default()
        };
        let result = HttpSession::new(&network, &[], &ResolvedSession::empty(CookieStatus::Disabled));
        assert!(matches!(result, Err(DydlError::Config(_))));
    }
}
