use crate::gap::constants::*;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressType {
    #[default]
    Public,
    Random,
    PublicIdentity,
    RandomIdentity,
}

impl From<u8> for AddressType {
    fn from(value: u8) -> Self {
        match value {
            PUBLIC_DEVICE_ADDRESS => AddressType::Public,
            RANDOM_DEVICE_ADDRESS => AddressType::Random,
            PUBLIC_IDENTITY_ADDRESS => AddressType::PublicIdentity,
            RANDOM_IDENTITY_ADDRESS => AddressType::RandomIdentity,
            _ => AddressType::Public,
        }
    }
}

impl From<AddressType> for u8 {
    fn from(value: AddressType) -> Self {
        match value {
            AddressType::Public => PUBLIC_DEVICE_ADDRESS,
            AddressType::Random => RANDOM_DEVICE_ADDRESS,
            AddressType::PublicIdentity => PUBLIC_IDENTITY_ADDRESS,
            AddressType::RandomIdentity => RANDOM_IDENTITY_ADDRESS,
        }
    }
}

/// The address the local device scans and connects with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnAddressType {
    /// Public or static random device address.
    #[default]
    PublicOrStatic,
    /// Generated resolvable private address.
    Resolvable,
    /// Generated non-resolvable private address.
    NonResolvable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BdAddr {
    pub bytes: [u8; 6],
}

impl BdAddr {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() >= 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(&slice[0..6]);
            Some(Self { bytes })
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.bytes[5],
            self.bytes[4],
            self.bytes[3],
            self.bytes[2],
            self.bytes[1],
            self.bytes[0]
        )
    }
}

/// A peer device address together with its address type.
///
/// Two peer addresses are equal only when both the type and all six
/// address bytes match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PeerAddress {
    pub address_type: AddressType,
    pub address: BdAddr,
}

impl PeerAddress {
    pub fn new(address_type: AddressType, address: BdAddr) -> Self {
        Self {
            address_type,
            address,
        }
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.address, self.address_type)
    }
}

/// Kind of advertising report a payload was carried in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportType {
    #[default]
    LegacyAdvertising,
    ExtendedAdvertising,
    LegacyScanResponse,
    ExtendedScanResponse,
    PeriodicAdvertising,
}

/// Scan parameters handed to the external stack at session init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanParams {
    /// Active scanning (request scan responses) or passive.
    pub active: bool,
    /// Scan interval in 0.625 ms units.
    pub interval: u16,
    /// Scan window in 0.625 ms units. Must not exceed `interval`.
    pub window: u16,
    /// Scan duration in 10 ms units; zero scans until stopped.
    pub timeout: u16,
    /// Let the controller drop duplicate reports.
    pub filter_duplicates: bool,
    /// Only report devices on the stack-maintained whitelist.
    pub use_whitelist: bool,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            active: LE_SCAN_ACTIVE,
            interval: LE_SCAN_INTERVAL,
            window: LE_SCAN_WINDOW,
            timeout: LE_SCAN_TIMEOUT,
            filter_duplicates: false,
            use_whitelist: false,
        }
    }
}

impl ScanParams {
    pub fn validate(&self) -> Result<(), crate::error::ScanError> {
        if self.interval == 0 {
            return Err(crate::error::ScanError::InvalidParameter(
                "scan interval must be nonzero",
            ));
        }
        if self.window > self.interval {
            return Err(crate::error::ScanError::InvalidParameter(
                "scan window exceeds scan interval",
            ));
        }
        Ok(())
    }
}

/// Connection parameters used by the auto-connect path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnParams {
    /// The device to connect to on filter match.
    pub peer: PeerAddress,
    /// Minimum connection interval in 1.25 ms units.
    pub interval_min: u16,
    /// Maximum connection interval in 1.25 ms units.
    pub interval_max: u16,
    /// Slave latency in connection events.
    pub latency: u16,
    /// Supervision timeout in 10 ms units.
    pub supervision_timeout: u16,
}

impl Default for ConnParams {
    fn default() -> Self {
        Self {
            peer: PeerAddress::default(),
            interval_min: LE_CONN_INTERVAL_MIN,
            interval_max: LE_CONN_INTERVAL_MAX,
            latency: LE_CONN_LATENCY,
            supervision_timeout: LE_SUPERVISION_TIMEOUT,
        }
    }
}

impl ConnParams {
    pub fn validate(&self) -> Result<(), crate::error::ScanError> {
        if self.interval_min == 0 || self.interval_min > self.interval_max {
            return Err(crate::error::ScanError::InvalidParameter(
                "connection interval range is empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bd_addr_from_slice_round_trip() {
        let raw = [0x66u8, 0x55, 0x44, 0x33, 0x22, 0x11, 0xEE];
        let addr = BdAddr::from_slice(&raw).unwrap();
        assert_eq!(addr.as_slice(), &raw[..6]);
        assert_eq!(addr.to_string(), "11:22:33:44:55:66");

        assert_eq!(BdAddr::from_slice(&raw[..5]), None);
    }

    #[test]
    fn peer_address_deduplicates_by_type_and_bytes() {
        let addr = BdAddr::new([1, 2, 3, 4, 5, 6]);
        let mut seen = HashSet::new();
        assert!(seen.insert(PeerAddress::new(AddressType::Public, addr)));
        assert!(seen.insert(PeerAddress::new(AddressType::Random, addr)));
        assert!(!seen.insert(PeerAddress::new(AddressType::Public, addr)));
        assert_eq!(seen.len(), 2);
    }
}
