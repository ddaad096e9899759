use thiserror::Error;

/// Collector-level faults. Missing tools and unparseable output are not
/// errors; they only shrink the section.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("{0} unavailable")]
    Unavailable(&'static str),

    #[error("sampling task failed: {0}")]
    Sampling(#[from] tokio::task::JoinError),
}
