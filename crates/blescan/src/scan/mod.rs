//! Scan session controller
//!
//! Event-driven coordination of scan start/stop/connect decisions: raw
//! advertising reports come in from the external stack, get parsed and
//! filtered, and the session either notifies the application or (in
//! auto-connect mode) stops scanning and connects to the matched device.

mod events;
mod session;

pub use events::{AdvReport, EventSink, ScanEvent};
pub use session::{ScanConfig, ScanSession};
