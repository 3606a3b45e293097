use reqwest::StatusCode;

/// Failure taxonomy for the rate synchronization core.
///
/// Upstream-class variants cover the provider leg (network, bad status, wrong
/// content type, provider-reported failure); `Store` covers persistence;
/// `UnsupportedOperation` marks a historical fetch the configured provider plan
/// cannot serve. Request validation never reaches this enum, handlers reject
/// malformed parameters at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("exchange rate API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("exchange rate API responded with status {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    #[error("expected JSON response, got {content_type:?}")]
    UpstreamNotJson { content_type: Option<String> },

    #[error("exchange rate API reported failure: {0}")]
    UpstreamResult(String),

    #[error("historical rates are not supported by the configured provider plan")]
    UnsupportedOperation,

    #[error("no {target} rate in the {base} conversion table")]
    MissingTarget { base: String, target: String },

    #[error("database error: {0}")]
    Store(#[from] sea_orm::DbErr),
}

impl RateError {
    /// True for provider-leg failures, the class that skips a single
    /// historical date instead of aborting a reconciliation.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::UpstreamStatus { .. }
                | Self::UpstreamNotJson { .. }
                | Self::UpstreamResult(_)
        )
    }
}
