pub mod constants;
mod stack;
mod types;

pub use stack::GapStack;
pub use types::{
    AddressType, BdAddr, ConnParams, OwnAddressType, PeerAddress, ReportType, ScanParams,
};
