use crate::error::Result;
use crate::transport::Headers;
use reqwest::blocking::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;

/// Create the HTTP client for resource requests
/// with connection pooling and the configured timeouts
pub fn create_rest_client(config: &Config) -> Result<Client> {
    let client = ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct Config {
    /// API root, e.g. `https://swapi.dev/api`
    pub base_url: String,
    /// Log every request at info level
    pub debug: bool,
    /// Total request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// User-Agent header
    pub user_agent: String,
    /// Headers sent with every request
    pub headers: Headers,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: "http://localhost".to_string(),
            debug: false,
            timeout: Duration::from_secs(300), // 5 minutes
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("hyperres/", env!("CARGO_PKG_VERSION")).to_string(),
            headers: Headers::new(),
        }
    }
}

impl Config {
    /// Create a new configuration for the given API root
    pub fn new(base_url: impl Into<String>) -> Self {
        Config {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a header sent with every request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Get the base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Parse and validate the base URL
    pub fn parsed_base_url(&self) -> Result<Url> {
        Ok(Url::parse(self.base_url())?)
    }
}
