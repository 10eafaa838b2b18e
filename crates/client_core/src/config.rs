use std::time::Duration;

use url::Url;

use crate::error::GatewayError;

pub const DEFAULT_LIST_LIMIT: u32 = 100;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
    pub list_limit: u32,
}

impl GatewayConfig {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            list_limit: DEFAULT_LIST_LIMIT,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_list_limit(mut self, limit: u32) -> Self {
        self.list_limit = limit;
        self
    }

    /// Resolve `segments` under the base url, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| cannot_be_a_base())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, GatewayError> {
    let url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(cannot_be_a_base());
    }
    Ok(url)
}

fn cannot_be_a_base() -> GatewayError {
    GatewayError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
}
