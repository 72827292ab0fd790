use std::fmt::Debug;

use log::debug;
use reqwest::{
    blocking::{Client, RequestBuilder, Response},
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Method,
};
use url::{ParseError, Url};

use crate::{OpenViduError, OpenViduResult};

/// The fixed username used for basic authentication.
pub const USERNAME: &str = "OPENVIDUAPP";

/// Authenticated access to the REST API of a single server.
pub(crate) struct Api {
    url: String,
    base: Url,
    secret: String,
    verify: bool,
    client: Client,
}

/// The statuses an operation accepts, and the messages for statuses it knows how to explain.
/// Anything else falls back to the message the server sent.
#[derive(Debug)]
pub(crate) struct Expectation {
    accepted: Vec<u16>,
    failures: Vec<(u16, String)>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Verdict<'a> {
    Accept,
    Fail(&'a str),
    Generic,
}

impl Api {
    pub fn new(url: &str, secret: &str, verify: bool) -> OpenViduResult<Self> {
        let url = url.trim_end_matches('/');
        let base = Url::parse(url)?;

        if base.cannot_be_a_base() {
            return Err(ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(!verify)
            .build()?;

        Ok(Self {
            url: url.to_string(),
            base,
            secret: secret.to_string(),
            verify,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn verify(&self) -> bool {
        self.verify
    }

    /// Starts an authenticated request below the server url.
    /// Each segment is percent-encoded.
    pub fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!("{} {}", method, url);

        self.client
            .request(method, url)
            .basic_auth(USERNAME, Some(&self.secret))
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();

        // Checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url
    }

    /// Sends a request and checks the response status against the expectation.
    pub fn send(&self, request: RequestBuilder, expectation: &Expectation) -> OpenViduResult<Response> {
        let response = request.send()?;
        expectation.check(response)
    }
}

impl Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("url", &self.url)
            .field("verify", &self.verify)
            .finish_non_exhaustive()
    }
}

impl Expectation {
    /// Expects exactly the given status.
    pub fn status(status: u16) -> Self {
        Self {
            accepted: vec![status],
            failures: vec![],
        }
    }

    /// Also accepts the given status.
    pub fn or_status(mut self, status: u16) -> Self {
        self.accepted.push(status);
        self
    }

    /// Fails with a specific message when the given status is received.
    pub fn fail_on(mut self, status: u16, message: impl Into<String>) -> Self {
        self.failures.push((status, message.into()));
        self
    }

    pub fn verdict(&self, status: u16) -> Verdict<'_> {
        if self.accepted.contains(&status) {
            return Verdict::Accept;
        }

        self.failures
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, message)| Verdict::Fail(message))
            .unwrap_or(Verdict::Generic)
    }

    pub fn check(&self, response: Response) -> OpenViduResult<Response> {
        let status = response.status().as_u16();

        match self.verdict(status) {
            Verdict::Accept => Ok(response),
            Verdict::Fail(message) => Err(OpenViduError::from_response(status, Some(message))),
            Verdict::Generic => {
                let body = response.text()?;
                Err(OpenViduError::from_response(status, Some(&body)))
            }
        }
    }
}
