/// Page state definitions for one traversal iteration
///
/// A URL popped from the frontier moves through
/// `Seeded -> Fetching -> (FetchFailed | FilteredOut | Extracting -> Linked) -> Done`.
use crate::CorpusError;
use std::fmt;

/// Represents the current state of a URL inside the crawl loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// Taken from the frontier, not yet requested
    Seeded,

    /// Navigation / download in flight
    Fetching,

    /// Fetch failed; the URL is abandoned
    FetchFailed,

    /// Fetched but rejected by the relevance filter
    FilteredOut,

    /// Relevant page being snapshotted and turned into a record
    Extracting,

    /// Outbound links classified and dispatched
    Linked,

    /// Iteration finished
    Done,
}

impl PageState {
    /// Returns true if the transition `self -> next` is allowed
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Seeded, Self::Fetching)
                | (Self::Fetching, Self::FetchFailed)
                | (Self::Fetching, Self::FilteredOut)
                | (Self::Fetching, Self::Extracting)
                | (Self::Extracting, Self::Linked)
                | (Self::FetchFailed, Self::Done)
                | (Self::FilteredOut, Self::Done)
                | (Self::Linked, Self::Done)
        )
    }

    /// Moves to `next`, rejecting transitions outside the state machine
    pub fn advance(self, next: PageState) -> Result<PageState, CorpusError> {
        if self.can_transition_to(next) {
            tracing::trace!("page state {} -> {}", self, next);
            Ok(next)
        } else {
            Err(CorpusError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeded => "seeded",
            Self::Fetching => "fetching",
            Self::FetchFailed => "fetch_failed",
            Self::FilteredOut => "filtered_out",
            Self::Extracting => "extracting",
            Self::Linked => "linked",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall status of one domain crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlStatus {
    Running,
    /// Frontier emptied before the page bound was hit
    Exhausted,
    /// Kept-page count reached the configured bound
    BoundReached,
}

impl CrawlStatus {
    /// Both end states are normal termination
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Running => "running",
            Self::Exhausted => "exhausted",
            Self::BoundReached => "bound_reached",
        };
        write!(f, "{}", s)
    }
}
