use crate::ProtocolError;

/// Decides whether a delivered response is a protocol-level failure.
///
/// Runs before any body handling, so it only sees the status line and headers.
pub trait ResponseClassifier: Send + Sync {
    fn classify(&self, response: &reqwest::Response) -> Option<ProtocolError>;
}

impl<F> ResponseClassifier for F
where
    F: Fn(&reqwest::Response) -> Option<ProtocolError> + Send + Sync,
{
    fn classify(&self, response: &reqwest::Response) -> Option<ProtocolError> {
        self(response)
    }
}

/// Accepts every response. THETA reports command failures in the body's
/// `error` object, which callers inspect themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl ResponseClassifier for AcceptAll {
    fn classify(&self, _response: &reqwest::Response) -> Option<ProtocolError> {
        None
    }
}

/// Rejects any response whose status is not 2xx.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectUnsuccessfulStatus;

impl ResponseClassifier for RejectUnsuccessfulStatus {
    fn classify(&self, response: &reqwest::Response) -> Option<ProtocolError> {
        let status = response.status();
        if status.is_success() {
            return None;
        }

        Some(ProtocolError {
            code: status.as_str().to_owned(),
            message: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_owned(),
        })
    }
}
