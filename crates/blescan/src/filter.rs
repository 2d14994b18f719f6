//! Device filters evaluated against advertising reports
//!
//! Four independent filter kinds (name, appearance, service UUID, address)
//! that test a raw advertising payload or the broadcaster address against a
//! previously configured target. The buffer-scanning filters walk the TLV
//! payload themselves and decide on the first qualifying fragment; they do
//! not consult a [`ParsedReport`](crate::adv::ParsedReport), so they remain
//! usable without running the parser.

use bitflags::bitflags;

use crate::adv::{AdFragments, UuidWidth};
use crate::error::ScanError;
use crate::gap::constants::*;
use crate::gap::PeerAddress;
use crate::uuid::Uuid;

/// Maximum length of a target device name.
pub const DEV_NAME_LEN_MAX: usize = 18;
/// Maximum length of a target service UUID.
pub const UUID_LEN_MAX: usize = 16;

bitflags! {
    /// Which filter kinds are active. The bits combine freely; every enabled
    /// kind is evaluated for every report.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct FilterModes: u8 {
        const NAME = 0b0001;
        const APPEARANCE = 0b0010;
        const UUID = 0b0100;
        const ADDR = 0b1000;
    }
}

/// A target device name for the name filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NameTarget {
    bytes: [u8; DEV_NAME_LEN_MAX],
    len: u8,
}

impl NameTarget {
    pub fn new(name: &[u8]) -> Result<Self, ScanError> {
        if name.len() > DEV_NAME_LEN_MAX {
            return Err(ScanError::InvalidParameter(
                "target device name longer than 18 bytes",
            ));
        }
        let mut bytes = [0u8; DEV_NAME_LEN_MAX];
        bytes[..name.len()].copy_from_slice(name);
        Ok(Self {
            bytes,
            len: name.len() as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl Default for NameTarget {
    fn default() -> Self {
        Self {
            bytes: [0; DEV_NAME_LEN_MAX],
            len: 0,
        }
    }
}

/// A target service UUID for the UUID filter, kept at its original width
/// (2, 4, or 16 bytes, little-endian).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UuidTarget {
    bytes: [u8; UUID_LEN_MAX],
    len: u8,
}

impl UuidTarget {
    pub fn from_u16(uuid: u16) -> Self {
        let mut bytes = [0u8; UUID_LEN_MAX];
        bytes[..2].copy_from_slice(&uuid.to_le_bytes());
        Self { bytes, len: 2 }
    }

    pub fn from_u32(uuid: u32) -> Self {
        let mut bytes = [0u8; UUID_LEN_MAX];
        bytes[..4].copy_from_slice(&uuid.to_le_bytes());
        Self { bytes, len: 4 }
    }

    pub fn from_u128_bytes(uuid: [u8; 16]) -> Self {
        Self {
            bytes: uuid,
            len: 16,
        }
    }

    /// Builds a target from raw little-endian UUID bytes. The length must
    /// be 2, 4, or 16.
    pub fn from_slice(uuid: &[u8]) -> Result<Self, ScanError> {
        if UuidWidth::from_len(uuid.len()).is_none() {
            return Err(ScanError::InvalidParameter(
                "target UUID must be 2, 4, or 16 bytes",
            ));
        }
        let mut bytes = [0u8; UUID_LEN_MAX];
        bytes[..uuid.len()].copy_from_slice(uuid);
        Ok(Self {
            bytes,
            len: uuid.len() as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn width(&self) -> Option<UuidWidth> {
        UuidWidth::from_len(self.len as usize)
    }
}

impl Default for UuidTarget {
    fn default() -> Self {
        Self {
            bytes: [0; UUID_LEN_MAX],
            len: 0,
        }
    }
}

impl From<Uuid> for UuidTarget {
    /// Uses the narrowest on-air representation the UUID admits.
    fn from(uuid: Uuid) -> Self {
        if let Some(short) = uuid.as_u16() {
            UuidTarget::from_u16(short)
        } else if let Some(medium) = uuid.as_u32() {
            UuidTarget::from_u32(medium)
        } else {
            UuidTarget::from_u128_bytes(*uuid.as_bytes_le())
        }
    }
}

/// One configured filter target, tagged by kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterTarget {
    Name(NameTarget),
    Appearance(u16),
    Uuid(UuidTarget),
    Address(PeerAddress),
}

/// Which filter kinds matched the current report. Kinds accumulate; the
/// evaluation never short-circuits after a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterMatch {
    pub dev_name_match: bool,
    pub appearance_match: bool,
    pub uuid_match: bool,
    pub addr_match: bool,
}

impl FilterMatch {
    pub fn any(&self) -> bool {
        self.dev_name_match || self.appearance_match || self.uuid_match || self.addr_match
    }
}

/// Session-scoped filter configuration: the active mode bits plus one
/// target value per kind. Targets for disabled kinds are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FilterConfig {
    modes: FilterModes,
    name: NameTarget,
    appearance: u16,
    uuid: UuidTarget,
    addr: PeerAddress,
}

impl FilterConfig {
    /// Enables the kind carried by `target` and stores its value. Other
    /// kinds keep their previous targets.
    pub fn set(&mut self, target: FilterTarget) {
        match target {
            FilterTarget::Name(name) => {
                self.modes |= FilterModes::NAME;
                self.name = name;
            }
            FilterTarget::Appearance(appearance) => {
                self.modes |= FilterModes::APPEARANCE;
                self.appearance = appearance;
            }
            FilterTarget::Uuid(uuid) => {
                self.modes |= FilterModes::UUID;
                self.uuid = uuid;
            }
            FilterTarget::Address(addr) => {
                self.modes |= FilterModes::ADDR;
                self.addr = addr;
            }
        }
    }

    /// Disables every filter kind and zeroes the targets. Idempotent.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn modes(&self) -> FilterModes {
        self.modes
    }

    pub fn is_enabled(&self) -> bool {
        !self.modes.is_empty()
    }

    /// Runs every enabled filter kind against the report and records each
    /// result. All enabled kinds are evaluated even after a match.
    pub fn evaluate(&self, data: &[u8], src_addr: &PeerAddress) -> FilterMatch {
        let mut matched = FilterMatch::default();

        if self.modes.contains(FilterModes::NAME) {
            matched.dev_name_match = name_filter(data, &self.name);
        }
        if self.modes.contains(FilterModes::APPEARANCE) {
            matched.appearance_match = appearance_filter(data, self.appearance);
        }
        if self.modes.contains(FilterModes::UUID) {
            matched.uuid_match = uuid_filter(data, &self.uuid);
        }
        if self.modes.contains(FilterModes::ADDR) {
            matched.addr_match = addr_filter(src_addr, &self.addr);
        }

        matched
    }
}

/// True iff the payload carries a name fragment of exactly the target's
/// length whose bytes equal the target.
///
/// Scan-once policy: name fragments whose length differs from the target
/// are skipped, but the first name fragment whose length does match decides
/// the outcome; a byte mismatch there is final.
pub fn name_filter(data: &[u8], target: &NameTarget) -> bool {
    for (ad_type, payload) in AdFragments::new(data) {
        if (ad_type == ADV_TYPE_SHORT_LOCAL_NAME || ad_type == ADV_TYPE_COMPLETE_LOCAL_NAME)
            && payload.len() == target.as_bytes().len()
        {
            return payload == target.as_bytes();
        }
    }
    false
}

/// True iff the payload carries an appearance fragment whose first byte
/// equals the target's low byte. The first appearance fragment found
/// decides the outcome.
pub fn appearance_filter(data: &[u8], target: u16) -> bool {
    for (ad_type, payload) in AdFragments::new(data) {
        if ad_type == ADV_TYPE_APPEARANCE {
            return payload.first() == Some(&(target as u8));
        }
    }
    false
}

/// True iff the payload carries a UUID-list fragment of the target's width
/// class containing the target value. The first fragment of the matching
/// AD-type pair decides the outcome. A target of invalid width never
/// matches.
pub fn uuid_filter(data: &[u8], target: &UuidTarget) -> bool {
    let Some(width) = target.width() else {
        return false;
    };

    let (partial, complete) = match width {
        UuidWidth::Uuid16 => (
            ADV_TYPE_16BIT_SERVICE_UUID_PARTIAL,
            ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE,
        ),
        UuidWidth::Uuid32 => (
            ADV_TYPE_32BIT_SERVICE_UUID_PARTIAL,
            ADV_TYPE_32BIT_SERVICE_UUID_COMPLETE,
        ),
        UuidWidth::Uuid128 => (
            ADV_TYPE_128BIT_SERVICE_UUID_PARTIAL,
            ADV_TYPE_128BIT_SERVICE_UUID_COMPLETE,
        ),
    };

    for (ad_type, payload) in AdFragments::new(data) {
        if ad_type == partial || ad_type == complete {
            return payload
                .chunks_exact(width.bytes())
                .any(|chunk| chunk == target.as_bytes());
        }
    }
    false
}

/// True iff the address types match and all six address bytes are equal.
pub fn addr_filter(src_addr: &PeerAddress, target: &PeerAddress) -> bool {
    src_addr.address_type == target.address_type && src_addr.address == target.address
}
