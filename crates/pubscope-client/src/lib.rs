//! pubscope-client: the summary fetch boundary
//!
//! HTTP access to the summary endpoint, and the request tracking that keeps
//! a stale response from replacing a newer one.

pub mod http;
pub mod requests;
pub mod summary;

pub use http::{HttpClient, HttpError, HttpResponse};
pub use requests::{RequestTicket, SummaryLoader, SummaryRequests, SummaryState};
pub use summary::{SummaryClient, SummaryError};
