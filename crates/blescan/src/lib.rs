//! blescan - BLE advertising-report scanning and filtering
//!
//! This library parses Bluetooth LE advertising/scan-response payloads
//! (the length-prefixed AD structure format), filters devices by name,
//! appearance, service UUID, or address, and runs an event-driven scan
//! session that can notify an application handler or auto-connect to a
//! matched device. The external BLE stack is abstracted behind the
//! [`GapStack`] trait, so the core carries no transport of its own.

pub mod adv;
pub mod error;
pub mod filter;
pub mod gap;
pub mod scan;
pub mod uuid;

// Re-export common types for convenience
pub use adv::{parse_report, AdFragments, ParsedReport, ServiceUuidLists, UuidWidth};
pub use error::ScanError;
pub use filter::{
    addr_filter, appearance_filter, name_filter, uuid_filter, FilterConfig, FilterMatch,
    FilterModes, FilterTarget, NameTarget, UuidTarget,
};
pub use gap::{
    AddressType, BdAddr, ConnParams, GapStack, OwnAddressType, PeerAddress, ReportType, ScanParams,
};
pub use scan::{AdvReport, EventSink, ScanConfig, ScanEvent, ScanSession};
pub use uuid::Uuid;
