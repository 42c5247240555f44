//! Unified error types for the `stagedoor` crate.
//!
//! Every failure the SDK can produce is folded into the top-level [`Error`] enum plus the
//! [`Result`] alias. HTTP failures are classified once, in the client adapter, into
//! [`RequestError`] variants so that callers branch on the kind of failure (offline,
//! rejected, invalid input, throttled) instead of raw status codes.

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigReadError;
use crate::forms::FieldErrors;

// --- Build-Time Error ---

/// Errors that can occur while building an [`crate::HttpClient`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to build the HTTP client (reqwest configuration).
    #[error("Failed to build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured API base URL cannot be used as a base for relative paths.
    #[error("Invalid API base URL `{0}`")]
    BaseUrl(String),
}

// --- The Main Operational Error Enum ---

/// The crate’s top-level error type.
///
/// - [`Error::Request`]: the HTTP round-trip failed or was rejected
/// - [`Error::Authentication`]: sign-in/sign-up/session problems
/// - [`Error::Form`]: client-side validation blocked a submission
/// - [`Error::Persistence`]: the token/user store could not be read or written
/// - [`Error::Config`], [`Error::Build`], [`Error::Parse`]: setup problems
/// - [`Error::Cache`]: a cached value was read back with the wrong type
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request/response failed.
    #[error("Request failed: {0}")]
    Request(#[from] RequestError),

    /// URL parsing failed while preparing a request.
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] url::ParseError),

    /// Authentication flow failed.
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthError),

    /// Client-side schema validation failed; nothing was sent.
    #[error("Form is invalid: {0}")]
    Form(FieldErrors),

    /// Persisted session storage failed.
    #[error("Session storage error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration could not be read.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigReadError),

    /// Building the client failed.
    #[error("Client build failed: {0}")]
    Build(#[from] BuildError),

    /// Query cache misuse.
    #[error("Query cache error: {0}")]
    Cache(#[from] CacheError),
}

// --- Request Errors ---

/// Transport failures and classified HTTP error responses.
#[derive(Debug, Error)]
pub enum RequestError {
    /// No response reached us: connection refused, DNS, TLS, timeout.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// `401`. The adapter has already torn the session down (outside the login route).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Server message, if any.
        message: String,
    },

    /// `403`. Local to the calling view.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Server message, if any.
        message: String,
        /// Machine-readable reason (`code` member of the body), e.g. `email_not_verified`.
        code: Option<String>,
    },

    /// `404`. Usually rendered as an empty state.
    #[error("Not found: {message}")]
    NotFound {
        /// Server message, if any.
        message: String,
    },

    /// `422` with a field-keyed error map.
    #[error("Validation failed: {message}")]
    Validation {
        /// Summary message.
        message: String,
        /// Per-field messages to merge into the active form.
        fields: FieldErrors,
    },

    /// `429`. No automatic retry is attempted.
    #[error("Too many requests: {message}")]
    RateLimited {
        /// Seconds from `Retry-After`, when present.
        retry_after: Option<u64>,
        /// Server message, if any.
        message: String,
    },

    /// `5xx`.
    #[error("Server error: {status} - {message}")]
    Server {
        /// The HTTP status code returned by the server.
        status: StatusCode,
        /// Server message or canonical reason.
        message: String,
    },

    /// Any other non-success status.
    #[error("Server responded with an error: {status} - {message}")]
    Http {
        /// The HTTP status code returned by the server.
        status: StatusCode,
        /// Server message or canonical reason.
        message: String,
    },

    /// JSON decoding failed when parsing a server response.
    #[error("JSON decode error: {message}")]
    DecodeJson {
        /// Error message from the JSON deserializer.
        message: String,
    },
}

impl RequestError {
    /// Status code of the classified response, `None` for transport and decode failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            RequestError::Forbidden { .. } => Some(StatusCode::FORBIDDEN),
            RequestError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            RequestError::Validation { .. } => Some(StatusCode::UNPROCESSABLE_ENTITY),
            RequestError::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            RequestError::Server { status, .. } | RequestError::Http { status, .. } => {
                Some(*status)
            }
            RequestError::Network(_) | RequestError::DecodeJson { .. } => None,
        }
    }

    /// Whether the request timed out before a response arrived.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RequestError::Network(e) if e.is_timeout())
    }
}

// --- Authentication Errors ---

/// Failures of sign-in, sign-up and session revalidation.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair rejected.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The account exists but its email is not confirmed yet.
    #[error("Email address {email} is not verified")]
    EmailNotVerified {
        /// Address the verification code was sent to.
        email: String,
        /// Server message.
        message: String,
    },

    /// The persisted token is no longer accepted.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// A success response carried no bearer token.
    #[error("The server did not return an access token")]
    MissingToken,

    /// The operation needs a signed-in session.
    #[error("Not signed in")]
    NotSignedIn,
}

// --- Persistence Errors ---

/// Failures of the token/user key-value store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be decoded.
    #[error("Stored value is corrupt: {0}")]
    Corrupt(String),

    /// The backing store is not available (for example storage disabled in the browser).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// --- Cache Errors ---

/// Query cache misuse.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A key was read back as a different type than it was fetched as.
    #[error("cached value for `{key}` has a different type")]
    TypeMismatch {
        /// Rendered query key.
        key: String,
    },
}

/// A specialized `Result` type for `stagedoor` operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classified request failure, if this is one.
    pub fn request(&self) -> Option<&RequestError> {
        match self {
            Error::Request(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status of a classified response.
    pub fn status(&self) -> Option<StatusCode> {
        self.request().and_then(RequestError::status)
    }

    /// `true` for "offline" failures (no response), `false` for rejections.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Request(RequestError::Network(_)))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Error::Request(RequestError::Unauthorized { .. })
                | Error::Authentication(AuthError::SessionExpired)
        )
    }

    /// Field errors from a `422` response or from client-side validation.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Error::Request(RequestError::Validation { fields, .. }) => Some(fields),
            Error::Form(fields) => Some(fields),
            _ => None,
        }
    }

    /// Text suitable for a toast or inline banner.
    pub fn user_message(&self) -> String {
        match self {
            Error::Request(e) => match e {
                RequestError::Network(err) if err.is_timeout() => {
                    "The server took too long to respond. Please try again.".into()
                }
                RequestError::Network(_) => {
                    "Unable to reach the server. Check your connection and try again.".into()
                }
                RequestError::Unauthorized { .. } => {
                    "Your session has expired. Please sign in again.".into()
                }
                RequestError::Forbidden { .. } => {
                    "You do not have permission to perform this action.".into()
                }
                RequestError::NotFound { .. } => "The requested item could not be found.".into(),
                RequestError::Validation { message, fields } => {
                    if message.is_empty() {
                        fields.to_string()
                    } else {
                        message.clone()
                    }
                }
                RequestError::RateLimited { retry_after, .. } => match retry_after {
                    Some(secs) => format!("Too many attempts. Please retry in {secs} seconds."),
                    None => "Too many attempts. Please try again later.".into(),
                },
                RequestError::Server { .. } | RequestError::Http { .. } => {
                    "Something went wrong on our side. Please try again later.".into()
                }
                RequestError::DecodeJson { .. } => {
                    "Received an unexpected response from the server.".into()
                }
            },
            Error::Authentication(AuthError::InvalidCredentials(message)) => {
                if message.is_empty() {
                    "Invalid email or password.".into()
                } else {
                    message.clone()
                }
            }
            Error::Authentication(e) => e.to_string(),
            Error::Form(_) => "Please correct the highlighted fields.".into(),
            Error::Persistence(_) | Error::Config(_) | Error::Build(_) | Error::Parse(_) => {
                "The application is misconfigured. Please reload the page.".into()
            }
            Error::Cache(_) => "Something went wrong. Please reload the page.".into(),
        }
    }
}

// Ergonomic "Staircase" From Implementations ---
// A macro to reduce boilerplate for converting base errors into the top-level Error.
macro_rules! impl_from_for_error {
    ($from_type:ty, $to_variant:path) => {
        impl From<$from_type> for Error {
            fn from(err: $from_type) -> Self {
                $to_variant(err.into())
            }
        }
    };
}

// Transport errors never carry a status: classified responses are built by the adapter.
impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        RequestError::Network(err)
    }
}

impl_from_for_error!(reqwest::Error, Error::Request);
impl_from_for_error!(std::io::Error, Error::Persistence);
