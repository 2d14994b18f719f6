use crate::adv::ParsedReport;
use crate::error::ScanError;
use crate::filter::FilterMatch;
use crate::gap::{PeerAddress, ReportType};

/// A raw advertising or scan-response report as delivered by the external
/// stack. The payload slice is borrowed from the stack callback; the
/// session copies what it keeps before returning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdvReport<'a> {
    pub report_type: ReportType,
    pub peer: PeerAddress,
    pub data: &'a [u8],
}

/// Scan session events.
///
/// The stack-side adapter constructs `AdvReport`, `ScanTimeout`,
/// `ScanStopped` and `Connected` from its raw indications and feeds them to
/// [`ScanSession::handle_event`](super::ScanSession::handle_event); the
/// session constructs the remaining variants itself. Each dispatch builds a
/// fresh value; events are never reused across calls.
#[derive(Clone, Debug, PartialEq)]
pub enum ScanEvent<'a> {
    /// Whitelist mode is configured and scanning is about to start; the
    /// application should load whitelist entries into the stack now.
    WhitelistRequest,
    /// A raw advertising report arrived.
    AdvReport(AdvReport<'a>),
    /// A report from a whitelisted device, delivered unparsed.
    WhitelistDeviceFound(AdvReport<'a>),
    /// A report was parsed; the result stays valid until the next report.
    DataParseComplete(&'a ParsedReport),
    /// At least one enabled filter kind matched the current report.
    FilterMatch {
        matched: FilterMatch,
        report: &'a ParsedReport,
    },
    /// The scan window ended without any filter match.
    FilterNoMatch,
    /// The scan duration elapsed (a filter had already matched).
    ScanTimeout,
    /// The scan activity stopped, successfully or not.
    ScanStopped { status: Result<(), ScanError> },
    /// A connection to a peer was established.
    Connected { peer: PeerAddress },
}

/// Receives scan session events.
///
/// Implemented for any `FnMut(&ScanEvent)`, so a closure works as a
/// handler. Payload references inside the event are only valid for the
/// duration of the call.
pub trait EventSink {
    fn on_scan_event(&mut self, event: &ScanEvent<'_>);
}

impl<F> EventSink for F
where
    F: FnMut(&ScanEvent<'_>),
{
    fn on_scan_event(&mut self, event: &ScanEvent<'_>) {
        self(event)
    }
}
