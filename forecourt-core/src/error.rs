use thiserror::Error;

/// Fatal problems found while building a client. Raised once, at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration value {0}")]
    Missing(&'static str),

    #[error("invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// A CMS request that did not produce a usable response.
///
/// Callers at the page level turn this into a not-found response; it never
/// crashes the process.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("management API is not configured")]
    ManagementUnavailable,
}

impl FetchError {
    /// Whether retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout { .. } => true,
            FetchError::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Decode { .. } | FetchError::ManagementUnavailable => false,
        }
    }
}

/// Why a single link resolution strategy gave up. Logged and swallowed by
/// the resolver; a total miss is `None`, not one of these.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("asset field `{field}` has no value for locale {locale}")]
    LocaleMissing { field: String, locale: String },

    #[error("asset {0} has no file url")]
    NoFile(String),

    #[error("asset {0} not present in response")]
    NotFound(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// A parent chain that could not be walked to its root. The partial path is
/// never used in its place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("parent {parent_id} of {entry_id} was not embedded in the response")]
    UnresolvedParent { entry_id: String, parent_id: String },

    #[error("parent chain of {entry_id} is deeper than {max_depth}")]
    TooDeep { entry_id: String, max_depth: usize },

    #[error("parent chain of {entry_id} loops back to {repeated_id}")]
    Cycle { entry_id: String, repeated_id: String },
}
