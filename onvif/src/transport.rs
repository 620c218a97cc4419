use std::{future::Future, time::Duration};

use crate::{envelope::Envelope, error::TransportError, soap::SoapRequest};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Delivers soap requests to the device and decodes its replies
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: SoapRequest,
    ) -> impl Future<Output = Result<Envelope, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    fetch_client: reqwest::Client,
    xaddr: String,
}

impl HttpTransport {
    pub fn new(xaddr: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(xaddr, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(xaddr: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let fetch_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            fetch_client,
            xaddr: xaddr.into(),
        })
    }

    /// Device service address
    pub fn xaddr(&self) -> &str {
        &self.xaddr
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: SoapRequest) -> Result<Envelope, TransportError> {
        let action = request.action_name().to_owned();
        let payload = request.into_xml().map_err(TransportError::Encode)?;
        tracing::debug!("Sending {action} to {}", self.xaddr);
        let request = self
            .fetch_client
            .request(reqwest::Method::POST, &self.xaddr)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/soap+xml; charset=utf-8",
            )
            .body(payload)
            .build()?;
        let res = self.fetch_client.execute(request).await?;
        let status = res.status();
        tracing::trace!("{action} response status: {status}");
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }
        let text = res.text().await?;
        Envelope::from_xml(&text).map_err(TransportError::Decode)
    }
}
