use crate::error::ScanError;
use crate::gap::types::{ConnParams, OwnAddressType, ScanParams};

/// The scan-engine operations consumed from the external BLE stack.
///
/// The scan session calls these synchronously and treats every returned
/// error as a stack status code to propagate upward unmodified. The
/// corresponding completion indications (scan stopped, connected, timeout)
/// arrive later as [`ScanEvent`](crate::scan::ScanEvent)s delivered to
/// [`ScanSession::handle_event`](crate::scan::ScanSession::handle_event);
/// there is no synchronous acknowledgment.
pub trait GapStack {
    /// Apply scan parameters before scanning begins.
    fn scan_param_set(
        &mut self,
        own_addr_type: OwnAddressType,
        params: &ScanParams,
    ) -> Result<(), ScanError>;

    /// Start the scan activity.
    fn scan_start(&mut self) -> Result<(), ScanError>;

    /// Request the scan activity to stop. Completion is reported via a
    /// `ScanStopped` event.
    fn scan_stop(&mut self) -> Result<(), ScanError>;

    /// Initiate a connection. Completion is reported via a `Connected`
    /// event.
    fn connect(
        &mut self,
        own_addr_type: OwnAddressType,
        params: &ConnParams,
    ) -> Result<(), ScanError>;
}
