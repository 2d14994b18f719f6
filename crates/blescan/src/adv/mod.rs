//! Advertising-data (AD structure) parsing
//!
//! Decodes the length-prefixed TLV format used for legacy advertising and
//! scan-response payloads into a [`ParsedReport`]: a sequence of
//! `(ad_type, data)` records backed by one owned raw buffer, plus typed
//! views of the recognized AD types (flags, tx power, appearance, local
//! name, manufacturer data, service UUID lists).

use byteorder::{ByteOrder, LittleEndian};
use tracing::warn;

use crate::gap::constants::*;
use crate::gap::{PeerAddress, ReportType};
use crate::uuid::Uuid;

#[cfg(test)]
mod tests;

/// Maximum length of one legacy advertising report payload.
pub const RAW_DATA_LEN_MAX: usize = 31;
/// Maximum number of AD structures recorded from one payload.
pub const AD_RECORD_NUM_MAX: usize = 10;

/// Maximum number of 16-bit service UUIDs collected from one payload.
pub const UUID_16_BIT_NUM_MAX: usize = 14;
/// Maximum number of 32-bit service UUIDs collected from one payload.
pub const UUID_32_BIT_NUM_MAX: usize = 7;
/// Maximum number of 128-bit service UUIDs collected from one payload.
pub const UUID_128_BIT_NUM_MAX: usize = 1;

/// Byte width of a service UUID found in an AD fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UuidWidth {
    Uuid16 = 2,
    Uuid32 = 4,
    Uuid128 = 16,
}

impl UuidWidth {
    pub const fn bytes(self) -> usize {
        self as usize
    }

    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            2 => Some(UuidWidth::Uuid16),
            4 => Some(UuidWidth::Uuid32),
            16 => Some(UuidWidth::Uuid128),
            _ => None,
        }
    }
}

/// Iterator over the `[length][type][data...]` fragments of an advertising
/// payload.
///
/// Iteration stops at a zero length byte (the AD early terminator) or at the
/// end of the buffer. A fragment whose declared length runs past the end of
/// the buffer is yielded truncated to the available bytes and ends the
/// iteration.
pub struct AdFragments<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> AdFragments<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }
}

impl<'a> Iterator for AdFragments<'a> {
    type Item = (u8, &'a [u8]);

    fn next(&mut self) -> Option<(u8, &'a [u8])> {
        if self.cursor >= self.data.len() {
            return None;
        }
        let fragment_len = self.data[self.cursor] as usize;
        if fragment_len == 0 {
            // Early terminator: nothing past this point is consumed.
            self.cursor = self.data.len();
            return None;
        }
        self.cursor += 1;
        if self.cursor >= self.data.len() {
            // Length byte without a type byte.
            self.cursor = self.data.len();
            return None;
        }
        let ad_type = self.data[self.cursor];
        self.cursor += 1;

        // The length byte counts the type byte itself.
        let declared = fragment_len - 1;
        let available = self.data.len() - self.cursor;
        let taken = declared.min(available);
        let payload = &self.data[self.cursor..self.cursor + taken];
        self.cursor += taken;
        if taken < declared {
            warn!(
                declared,
                taken, "AD fragment runs past end of payload, truncating"
            );
        }
        Some((ad_type, payload))
    }
}

/// Service UUIDs accumulated from the UUID-list AD types of one payload,
/// split by width, in order of appearance. Each width class is capped;
/// values past the cap are silently dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceUuidLists {
    uuid_16_bit: [u16; UUID_16_BIT_NUM_MAX],
    uuid_16_bit_count: u8,
    uuid_32_bit: [u32; UUID_32_BIT_NUM_MAX],
    uuid_32_bit_count: u8,
    uuid_128_bit: [[u8; 16]; UUID_128_BIT_NUM_MAX],
    uuid_128_bit_count: u8,
}

impl Default for ServiceUuidLists {
    fn default() -> Self {
        Self {
            uuid_16_bit: [0; UUID_16_BIT_NUM_MAX],
            uuid_16_bit_count: 0,
            uuid_32_bit: [0; UUID_32_BIT_NUM_MAX],
            uuid_32_bit_count: 0,
            uuid_128_bit: [[0; 16]; UUID_128_BIT_NUM_MAX],
            uuid_128_bit_count: 0,
        }
    }
}

impl ServiceUuidLists {
    /// Walks `data` in `width`-byte strides and appends each value to the
    /// list for that width, until the list is full. A trailing partial
    /// stride is ignored.
    pub fn collect(&mut self, data: &[u8], width: UuidWidth) {
        for chunk in data.chunks_exact(width.bytes()) {
            let pushed = match width {
                UuidWidth::Uuid16 => self.push_u16(LittleEndian::read_u16(chunk)),
                UuidWidth::Uuid32 => self.push_u32(LittleEndian::read_u32(chunk)),
                UuidWidth::Uuid128 => {
                    let mut bytes = [0u8; 16];
                    bytes.copy_from_slice(chunk);
                    self.push_u128(bytes)
                }
            };
            if !pushed {
                break;
            }
        }
    }

    fn push_u16(&mut self, uuid: u16) -> bool {
        let count = self.uuid_16_bit_count as usize;
        if count < UUID_16_BIT_NUM_MAX {
            self.uuid_16_bit[count] = uuid;
            self.uuid_16_bit_count += 1;
            true
        } else {
            false
        }
    }

    fn push_u32(&mut self, uuid: u32) -> bool {
        let count = self.uuid_32_bit_count as usize;
        if count < UUID_32_BIT_NUM_MAX {
            self.uuid_32_bit[count] = uuid;
            self.uuid_32_bit_count += 1;
            true
        } else {
            false
        }
    }

    fn push_u128(&mut self, uuid: [u8; 16]) -> bool {
        let count = self.uuid_128_bit_count as usize;
        if count < UUID_128_BIT_NUM_MAX {
            self.uuid_128_bit[count] = uuid;
            self.uuid_128_bit_count += 1;
            true
        } else {
            false
        }
    }

    /// The collected 16-bit UUIDs, in order of appearance.
    pub fn uuid_16_bit(&self) -> &[u16] {
        &self.uuid_16_bit[..self.uuid_16_bit_count as usize]
    }

    /// The collected 32-bit UUIDs, in order of appearance.
    pub fn uuid_32_bit(&self) -> &[u32] {
        &self.uuid_32_bit[..self.uuid_32_bit_count as usize]
    }

    /// The collected 128-bit UUIDs (little-endian bytes), in order of
    /// appearance.
    pub fn uuid_128_bit(&self) -> &[[u8; 16]] {
        &self.uuid_128_bit[..self.uuid_128_bit_count as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.uuid_16_bit_count == 0 && self.uuid_32_bit_count == 0 && self.uuid_128_bit_count == 0
    }

    /// Iterates over every collected UUID as a full 128-bit [`Uuid`],
    /// 16-bit first, then 32-bit, then 128-bit.
    pub fn iter(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.uuid_16_bit()
            .iter()
            .map(|&u| Uuid::from_u16(u))
            .chain(self.uuid_32_bit().iter().map(|&u| Uuid::from_u32(u)))
            .chain(self.uuid_128_bit().iter().map(|&b| Uuid::from_bytes_le(b)))
    }
}

/// Offset + length view into a `ParsedReport`'s raw buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
struct FieldRef {
    offset: u8,
    len: u8,
}

impl FieldRef {
    fn slice<'a>(&self, raw: &'a [u8]) -> &'a [u8] {
        &raw[self.offset as usize..self.offset as usize + self.len as usize]
    }

    fn skip(self, n: u8) -> FieldRef {
        FieldRef {
            offset: self.offset.saturating_add(n),
            len: self.len.saturating_sub(n),
        }
    }
}

/// One AD structure recorded from the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
struct AdRecord {
    ad_type: u8,
    field: FieldRef,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ManufacturerRef {
    company_id: u16,
    data: FieldRef,
}

/// Everything decoded from one advertising or scan-response payload.
///
/// Owns a copy of the fragment data, so it stays valid after the stack
/// callback that supplied the raw report returns. Scalar fields are `None`
/// when the corresponding AD type was absent; if a scalar AD type appears
/// more than once the last occurrence wins.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedReport {
    pub report_type: ReportType,
    pub peer: PeerAddress,
    pub flags: Option<u8>,
    pub tx_power: Option<i8>,
    pub appearance: Option<u16>,
    pub service_uuids: ServiceUuidLists,
    local_name: Option<FieldRef>,
    manufacturer: Option<ManufacturerRef>,
    records: [AdRecord; AD_RECORD_NUM_MAX],
    record_count: u8,
    raw: [u8; RAW_DATA_LEN_MAX],
    raw_len: u8,
}

impl ParsedReport {
    /// An empty report with no fields set.
    pub fn empty(report_type: ReportType, peer: PeerAddress) -> Self {
        Self {
            report_type,
            peer,
            flags: None,
            tx_power: None,
            appearance: None,
            service_uuids: ServiceUuidLists::default(),
            local_name: None,
            manufacturer: None,
            records: [AdRecord::default(); AD_RECORD_NUM_MAX],
            record_count: 0,
            raw: [0; RAW_DATA_LEN_MAX],
            raw_len: 0,
        }
    }

    /// The advertised local name (shortened or complete), if present.
    pub fn local_name(&self) -> Option<&[u8]> {
        self.local_name.map(|r| r.slice(&self.raw))
    }

    /// Manufacturer-specific data as `(company_id, payload)`, if present.
    pub fn manufacturer_data(&self) -> Option<(u16, &[u8])> {
        self.manufacturer
            .as_ref()
            .map(|m| (m.company_id, m.data.slice(&self.raw)))
    }

    /// Every recorded AD structure as `(ad_type, data)`, in order of
    /// appearance, unrecognized types included.
    pub fn records(&self) -> impl Iterator<Item = (u8, &[u8])> + '_ {
        self.records[..self.record_count as usize]
            .iter()
            .map(|r| (r.ad_type, r.field.slice(&self.raw)))
    }

    pub fn record_count(&self) -> usize {
        self.record_count as usize
    }

    /// The contiguous copy of all recorded fragment data.
    pub fn raw_data(&self) -> &[u8] {
        &self.raw[..self.raw_len as usize]
    }

    /// Copies `payload` into the raw buffer and records the `(ad_type,
    /// offset, length)` triple. Returns the stored location, or `None` when
    /// the record table is full (which ends parsing). A payload larger than
    /// the remaining raw capacity is stored truncated.
    fn push_record(&mut self, ad_type: u8, payload: &[u8]) -> Option<FieldRef> {
        let count = self.record_count as usize;
        if count == AD_RECORD_NUM_MAX {
            warn!(ad_type, "AD record table full, dropping remaining fragments");
            return None;
        }

        let offset = self.raw_len as usize;
        let room = RAW_DATA_LEN_MAX - offset;
        let stored_len = payload.len().min(room);
        if stored_len < payload.len() {
            warn!(ad_type, "raw buffer full, storing truncated fragment");
        }
        self.raw[offset..offset + stored_len].copy_from_slice(&payload[..stored_len]);

        let field = FieldRef {
            offset: offset as u8,
            len: stored_len as u8,
        };
        self.records[count] = AdRecord { ad_type, field };
        self.record_count += 1;
        self.raw_len += stored_len as u8;
        Some(field)
    }
}

/// Decodes a raw advertising/scan-response payload into a [`ParsedReport`].
///
/// Unrecognized AD types are still recorded in the report's record table.
/// Malformed input is never an error: oversized fragments are truncated and
/// capacity overflow drops the excess, mirroring the permissive behavior
/// scanners need against non-conformant advertisers.
pub fn parse_report(report_type: ReportType, peer: PeerAddress, data: &[u8]) -> ParsedReport {
    let mut report = ParsedReport::empty(report_type, peer);

    for (ad_type, payload) in AdFragments::new(data) {
        let Some(stored) = report.push_record(ad_type, payload) else {
            break;
        };

        match ad_type {
            ADV_TYPE_FLAGS => {
                if let Some(&flags) = payload.first() {
                    report.flags = Some(flags);
                }
            }
            ADV_TYPE_TX_POWER_LEVEL => {
                if let Some(&power) = payload.first() {
                    report.tx_power = Some(power as i8);
                }
            }
            ADV_TYPE_APPEARANCE => {
                if payload.len() >= 2 {
                    report.appearance = Some(LittleEndian::read_u16(payload));
                }
            }
            ADV_TYPE_SHORT_LOCAL_NAME | ADV_TYPE_COMPLETE_LOCAL_NAME => {
                report.local_name = Some(stored);
            }
            ADV_TYPE_MANUFACTURER_SPECIFIC => {
                // The company id must have made it into the raw buffer, not
                // just the wire payload, or the data reference would point
                // past the stored bytes.
                if stored.len >= 2 {
                    report.manufacturer = Some(ManufacturerRef {
                        company_id: LittleEndian::read_u16(payload),
                        data: stored.skip(2),
                    });
                }
            }
            ADV_TYPE_16BIT_SERVICE_UUID_PARTIAL | ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE => {
                report.service_uuids.collect(payload, UuidWidth::Uuid16);
            }
            ADV_TYPE_32BIT_SERVICE_UUID_PARTIAL | ADV_TYPE_32BIT_SERVICE_UUID_COMPLETE => {
                report.service_uuids.collect(payload, UuidWidth::Uuid32);
            }
            ADV_TYPE_128BIT_SERVICE_UUID_PARTIAL | ADV_TYPE_128BIT_SERVICE_UUID_COMPLETE => {
                report.service_uuids.collect(payload, UuidWidth::Uuid128);
            }
            _ => {}
        }
    }

    report
}
