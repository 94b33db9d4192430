//! Staleness tracking for in-flight exports.

use std::fmt;

use crate::error::ConvertResult;
use crate::image::svg::{self, RasterAsset, RasterRequest};

/// Sequence number handed to one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic ticket counter. Only the latest ticket is current.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    /// Issue a new ticket, invalidating every earlier one.
    pub fn advance(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }
}

// ============================================================================
// Export jobs
// ============================================================================

/// Everything an export needs once it leaves the session.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub ticket: RequestTicket,
    pub markup: String,
    pub request: RasterRequest,
}

/// Result of [`ExportJob::run`], tagged with the ticket it was issued for.
#[derive(Debug)]
pub struct JobOutcome {
    pub ticket: RequestTicket,
    pub result: ConvertResult<RasterAsset>,
}

impl ExportJob {
    /// Decode on a blocking worker, then draw and encode in one go.
    pub async fn run(self) -> JobOutcome {
        let Self {
            ticket,
            markup,
            request,
        } = self;

        let result = match svg::decode_async(markup, request.size).await {
            Ok(decoded) => svg::finish(&decoded, &request),
            Err(err) => Err(err),
        };

        JobOutcome { ticket, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_is_current() {
        let mut seq = RequestSequence::default();
        let first = seq.advance();
        assert!(seq.is_current(first));

        let second = seq.advance();
        assert!(second > first);
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
        assert_eq!(second.to_string(), "#2");
    }
}
