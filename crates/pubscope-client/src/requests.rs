//! Summary request tracking.
//!
//! Each request gets a ticket. Starting a new request, or cancelling when
//! the viewer goes away, supersedes every earlier ticket, and results that
//! arrive for a superseded ticket are dropped instead of being rendered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pubscope_core::{ArticleSummary, Publication, SummaryKey};

use crate::summary::{SummaryClient, SummaryError};

/// What the summary viewer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SummaryState {
    #[default]
    Idle,
    Loading,
    Loaded(ArticleSummary),
    Failed(String),
}

impl SummaryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SummaryState::Loading)
    }

    pub fn summary(&self) -> Option<&ArticleSummary> {
        match self {
            SummaryState::Loaded(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SummaryState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl From<Result<ArticleSummary, SummaryError>> for SummaryState {
    fn from(result: Result<ArticleSummary, SummaryError>) -> Self {
        match result {
            Ok(summary) => SummaryState::Loaded(summary),
            Err(e) => SummaryState::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
}

/// Generation counter shared by everything that issues summary requests
/// for one viewer. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct SummaryRequests {
    generation: Arc<AtomicU64>,
}

impl SummaryRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding all earlier ones.
    pub fn begin(&self) -> RequestTicket {
        RequestTicket {
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    /// Supersede every outstanding request.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// The state to render for a finished request, or `None` if the request
    /// was superseded while in flight.
    pub fn resolve(
        &self,
        ticket: RequestTicket,
        result: Result<ArticleSummary, SummaryError>,
    ) -> Option<SummaryState> {
        if !self.is_current(ticket) {
            tracing::debug!(generation = ticket.generation, "dropping superseded summary response");
            return None;
        }
        Some(result.into())
    }
}

/// A client plus the request tracker for one summary viewer.
#[derive(Debug)]
pub struct SummaryLoader {
    client: SummaryClient,
    requests: SummaryRequests,
}

impl SummaryLoader {
    pub fn new(client: SummaryClient) -> Self {
        Self {
            client,
            requests: SummaryRequests::new(),
        }
    }

    pub fn client(&self) -> &SummaryClient {
        &self.client
    }

    pub fn requests(&self) -> &SummaryRequests {
        &self.requests
    }

    /// Start a load, superseding earlier ones. Returns the ticket to finish
    /// it with and the state to render until then.
    pub fn start(&self) -> (RequestTicket, SummaryState) {
        (self.requests.begin(), SummaryState::Loading)
    }

    /// Fetch the summary for a record under `ticket`. `None` means a newer
    /// load or a cancel happened first and this result must not be shown.
    pub async fn finish(&self, ticket: RequestTicket, record: &Publication) -> Option<SummaryState> {
        let result = match SummaryKey::for_publication(record) {
            Some(key) => self.client.fetch(&key).await,
            None => Err(SummaryError::NoKey),
        };
        self.requests.resolve(ticket, result)
    }

    /// `start` then `finish`, for callers that do not render the loading
    /// state.
    pub async fn load(&self, record: &Publication) -> Option<SummaryState> {
        let (ticket, _) = self.start();
        self.finish(ticket, record).await
    }

    pub fn cancel(&self) {
        self.requests.cancel();
    }
}
