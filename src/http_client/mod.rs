//! HTTP client shared by the catalog loader, the static page renderer, and
//! the search executor.

mod response;
mod user_agent;

pub use response::{is_html_content_type, HttpResponse};
pub use user_agent::{random_user_agent, UserAgentPolicy, BROWSER_USER_AGENTS};

use std::time::{Duration, Instant};

use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client that attaches a browser identification header to every request.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: UserAgentPolicy,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(timeout: Duration, user_agent: UserAgentPolicy) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, user_agent })
    }

    /// Make a GET request.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.resolve())
            .send()
            .await?;
        debug!("GET {} -> {} in {:?}", url, response.status(), start.elapsed());

        Ok(HttpResponse::from_response(response))
    }

    /// POST a JSON body.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<HttpResponse, reqwest::Error> {
        let start = Instant::now();
        let response = self
            .client
            .post(url)
            .header(USER_AGENT, self.user_agent.resolve())
            .json(body)
            .send()
            .await?;
        debug!("POST {} -> {} in {:?}", url, response.status(), start.elapsed());

        Ok(HttpResponse::from_response(response))
    }
}
