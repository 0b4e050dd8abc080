use thiserror::Error;

/// Errors surfaced by the lookup, resolve, and translate operations.
///
/// Every failure is converted to a user-facing message at the boundary of the
/// operation that produced it; nothing is retried. Requests are independent,
/// so none of these are fatal to the process.
#[derive(Debug, Error)]
pub enum Error {
    /// A request field failed validation before any upstream call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The search API returned zero hits for the query.
    #[error("song not found")]
    SongNotFound,

    /// The song page yielded no lyric text after cleanup.
    #[error("lyrics not found")]
    LyricsNotFound,

    /// The requested video does not exist on the platform.
    #[error("video not found")]
    VideoNotFound,

    /// The URL does not belong to a supported platform.
    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),

    /// A platform URL with no extractable video identifier.
    #[error("invalid video URL: {0}")]
    InvalidUrl(String),

    /// The search resolved to the placeholder artist, meaning the hit is not
    /// an actual song page.
    #[error("search matched placeholder artist {0:?}")]
    PlaceholderArtist(String),

    /// Transport-level failure talking to an upstream service.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// An upstream service answered with a non-success status.
    #[error("upstream returned HTTP {status} for {url}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    /// An upstream response did not have the expected shape.
    #[error("unexpected response from {0}")]
    UnexpectedResponse(&'static str),
}
