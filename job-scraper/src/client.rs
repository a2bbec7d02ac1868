use std::time::Duration;

use async_trait::async_trait;
use log;
use reqwest::Client;
use tokio::time::sleep;

use crate::types::Error;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            params: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

/// Sends one request and reports whatever came back, without judging the status
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &Request) -> Result<Response>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &Request) -> Result<Response> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        let builder = request
            .headers
            .iter()
            .fold(builder.query(&request.params), |b, (name, value)| {
                b.header(name.as_str(), value.as_str())
            });
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(Response { status, body })
    }
}

/// Retries every failed request a fixed number of times with a fixed pause in between.
/// Transport errors and non-2xx statuses are treated the same way.
pub struct RetryClient<T = ReqwestTransport> {
    transport: T,
    retry_count: u32,
    sleep: Duration,
}

impl RetryClient<ReqwestTransport> {
    pub fn new(retry_count: u32, sleep: Duration) -> Self {
        Self::with_transport(ReqwestTransport::default(), retry_count, sleep)
    }
}

impl<T: Transport> RetryClient<T> {
    pub fn with_transport(transport: T, retry_count: u32, sleep: Duration) -> Self {
        Self {
            transport,
            retry_count,
            sleep,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the first successful response, `None` once all attempts failed
    pub async fn send(&self, request: &Request) -> Option<Response> {
        for attempt in 1..=self.retry_count {
            log::debug!(
                "{:?} {} params: {:?}, attempt {}/{}",
                request.method,
                request.url,
                request.params,
                attempt,
                self.retry_count
            );
            let failure = match self.transport.send(request).await {
                Ok(resp) if (200..300).contains(&resp.status) => return Some(resp),
                Ok(resp) => Error::RequestNotOk(request.url.clone(), resp.status),
                Err(e) => e,
            };
            log::warn!(
                "attempt {}/{} failed: {}",
                attempt,
                self.retry_count,
                failure
            );
            if attempt < self.retry_count {
                sleep(self.sleep).await;
            }
        }
        log::error!(
            "giving up on {} after {} attempts",
            request.url,
            self.retry_count
        );
        None
    }
}
