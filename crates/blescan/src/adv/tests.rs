//! Unit tests for advertising-data parsing and UUID collection

use super::*;
use crate::gap::{AddressType, BdAddr};

fn peer() -> PeerAddress {
    PeerAddress::new(
        AddressType::Random,
        BdAddr::new([0xC0, 0x01, 0x02, 0x03, 0x04, 0x05]),
    )
}

fn frag(ad_type: u8, data: &[u8]) -> Vec<u8> {
    let mut out = vec![(data.len() + 1) as u8, ad_type];
    out.extend_from_slice(data);
    out
}

fn parse(data: &[u8]) -> ParsedReport {
    parse_report(ReportType::LegacyAdvertising, peer(), data)
}

#[test]
fn round_trip_well_formed_packet() {
    let mut data = frag(ADV_TYPE_FLAGS, &[0x06]);
    data.extend_from_slice(&frag(ADV_TYPE_COMPLETE_LOCAL_NAME, b"Widget"));
    data.extend_from_slice(&frag(ADV_TYPE_TX_POWER_LEVEL, &[0xF4]));
    data.extend_from_slice(&frag(0x20, &[0xAA, 0xBB])); // unrecognized type

    let report = parse(&data);

    assert_eq!(report.report_type, ReportType::LegacyAdvertising);
    assert_eq!(report.peer, peer());

    let records: Vec<(u8, Vec<u8>)> = report
        .records()
        .map(|(t, d)| (t, d.to_vec()))
        .collect();
    assert_eq!(
        records,
        vec![
            (ADV_TYPE_FLAGS, vec![0x06]),
            (ADV_TYPE_COMPLETE_LOCAL_NAME, b"Widget".to_vec()),
            (ADV_TYPE_TX_POWER_LEVEL, vec![0xF4]),
            (0x20, vec![0xAA, 0xBB]),
        ]
    );

    assert_eq!(report.flags, Some(0x06));
    assert_eq!(report.tx_power, Some(-12));
    assert_eq!(report.local_name(), Some(&b"Widget"[..]));
    assert_eq!(report.appearance, None);
    assert_eq!(report.manufacturer_data(), None);
}

#[test]
fn empty_input_yields_empty_report() {
    let report = parse(&[]);
    assert_eq!(report.record_count(), 0);
    assert_eq!(report.flags, None);
    assert_eq!(report.local_name(), None);
    assert!(report.service_uuids.is_empty());
    assert!(report.raw_data().is_empty());
}

#[test]
fn zero_length_fragment_terminates_parsing() {
    let mut data = frag(ADV_TYPE_FLAGS, &[0x06]);
    data.push(0x00); // early terminator
    data.extend_from_slice(&frag(ADV_TYPE_COMPLETE_LOCAL_NAME, b"Ghost"));

    let report = parse(&data);
    assert_eq!(report.record_count(), 1);
    assert_eq!(report.local_name(), None);
}

#[test]
fn oversized_fragment_is_truncated_and_final() {
    // Declared 10 data bytes, only 4 present.
    let data = [11, ADV_TYPE_COMPLETE_LOCAL_NAME, b'W', b'i', b'd', b'g'];
    let report = parse(&data);

    assert_eq!(report.record_count(), 1);
    assert_eq!(report.local_name(), Some(&b"Widg"[..]));
}

#[test]
fn last_occurrence_of_scalar_type_wins() {
    let mut data = frag(ADV_TYPE_FLAGS, &[0x05]);
    data.extend_from_slice(&frag(ADV_TYPE_FLAGS, &[0x06]));
    data.extend_from_slice(&frag(ADV_TYPE_SHORT_LOCAL_NAME, b"Wid"));
    data.extend_from_slice(&frag(ADV_TYPE_COMPLETE_LOCAL_NAME, b"Widget"));

    let report = parse(&data);
    assert_eq!(report.flags, Some(0x06));
    assert_eq!(report.local_name(), Some(&b"Widget"[..]));
    // Both name fragments are still in the record table.
    assert_eq!(report.record_count(), 4);
}

#[test]
fn appearance_is_little_endian() {
    let data = frag(ADV_TYPE_APPEARANCE, &[0x41, 0x03]);
    let report = parse(&data);
    assert_eq!(report.appearance, Some(0x0341));
}

#[test]
fn manufacturer_data_splits_company_id() {
    let data = frag(ADV_TYPE_MANUFACTURER_SPECIFIC, &[0x4C, 0x00, 0xDE, 0xAD]);
    let report = parse(&data);
    assert_eq!(report.manufacturer_data(), Some((0x004C, &[0xDE, 0xAD][..])));
}

#[test]
fn manufacturer_data_too_short_is_ignored() {
    let data = frag(ADV_TYPE_MANUFACTURER_SPECIFIC, &[0x4C]);
    let report = parse(&data);
    assert_eq!(report.manufacturer_data(), None);
    // Still recorded generically.
    assert_eq!(report.record_count(), 1);
}

#[test]
fn manufacturer_data_truncated_below_company_id_is_dropped() {
    // 30 filler bytes leave one byte of raw capacity, so the manufacturer
    // fragment is stored truncated to a single byte. The reference must not
    // be recorded, and reading it back must not touch past the buffer.
    let mut data = frag(0x20, &[0xAB; 30]);
    data.extend_from_slice(&frag(ADV_TYPE_MANUFACTURER_SPECIFIC, &[0x4C, 0x00, 0xDE, 0xAD]));

    let report = parse(&data);
    assert_eq!(report.record_count(), 2);
    assert_eq!(report.raw_data().len(), RAW_DATA_LEN_MAX);
    assert_eq!(report.manufacturer_data(), None);
}

#[test]
fn manufacturer_data_truncated_to_company_id_keeps_empty_payload() {
    // 29 filler bytes leave exactly room for the company id.
    let mut data = frag(0x20, &[0xAB; 29]);
    data.extend_from_slice(&frag(ADV_TYPE_MANUFACTURER_SPECIFIC, &[0x4C, 0x00, 0xDE, 0xAD]));

    let report = parse(&data);
    assert_eq!(report.manufacturer_data(), Some((0x004C, &[][..])));
}

#[test]
fn uuid_lists_route_by_width() {
    let mut data = frag(ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE, &[0x0A, 0x18, 0x0F, 0x18]);
    data.extend_from_slice(&frag(
        ADV_TYPE_32BIT_SERVICE_UUID_COMPLETE,
        &[0x78, 0x56, 0x34, 0x12],
    ));
    let uuid128: [u8; 16] = [
        0x9E, 0xCA, 0xDC, 0x24, 0x0E, 0xE5, 0xA9, 0xE0, 0x93, 0xF3, 0xA3, 0xB5, 0x01, 0x00, 0x40,
        0x6E,
    ];
    data.extend_from_slice(&frag(ADV_TYPE_128BIT_SERVICE_UUID_COMPLETE, &uuid128));

    let report = parse(&data);
    let uuids = &report.service_uuids;
    assert_eq!(uuids.uuid_16_bit(), &[0x180A, 0x180F]);
    // 32-bit values land in the 32-bit list, never in the 16-bit one.
    assert_eq!(uuids.uuid_32_bit(), &[0x1234_5678]);
    assert_eq!(uuids.uuid_128_bit(), &[uuid128]);

    let all: Vec<Uuid> = uuids.iter().collect();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0], Uuid::from_u16(0x180A));
    assert_eq!(all[2], Uuid::from_u32(0x1234_5678));
    assert_eq!(all[3], Uuid::from_bytes_le(uuid128));
}

#[test]
fn uuid_16_bit_list_caps_at_fourteen() {
    let mut lists = ServiceUuidLists::default();
    let mut data = Vec::new();
    for i in 0..16u16 {
        data.extend_from_slice(&i.to_le_bytes());
    }
    lists.collect(&data, UuidWidth::Uuid16);

    assert_eq!(lists.uuid_16_bit().len(), UUID_16_BIT_NUM_MAX);
    assert_eq!(lists.uuid_16_bit()[13], 13);
    assert!(lists.uuid_32_bit().is_empty());
}

#[test]
fn uuid_128_bit_list_caps_at_one() {
    let mut lists = ServiceUuidLists::default();
    let mut data = [0u8; 32];
    data[16] = 0xAA;
    lists.collect(&data, UuidWidth::Uuid128);

    assert_eq!(lists.uuid_128_bit().len(), 1);
    assert_eq!(lists.uuid_128_bit()[0], [0u8; 16]);
}

#[test]
fn uuid_collect_ignores_partial_stride() {
    let mut lists = ServiceUuidLists::default();
    lists.collect(&[0x0A, 0x18, 0x0F], UuidWidth::Uuid16);
    assert_eq!(lists.uuid_16_bit(), &[0x180A]);
}

#[test]
fn record_table_caps_at_ten() {
    let mut data = Vec::new();
    for i in 0..12u8 {
        data.extend_from_slice(&frag(0x20, &[i]));
    }

    let report = parse(&data);
    assert_eq!(report.record_count(), AD_RECORD_NUM_MAX);
    let last = report.records().last().unwrap();
    assert_eq!(last.1, &[9u8][..]);
}

#[test]
fn raw_buffer_caps_at_thirty_one_bytes() {
    // 28 data bytes, then a fragment that would overflow the raw buffer.
    let mut data = frag(0x20, &[0xAB; 28]);
    data.extend_from_slice(&frag(0x21, &[0xCD; 10]));

    let report = parse(&data);
    assert_eq!(report.record_count(), 2);
    assert_eq!(report.raw_data().len(), RAW_DATA_LEN_MAX);
    let second = report.records().nth(1).unwrap();
    assert_eq!(second.1, &[0xCD, 0xCD, 0xCD][..]);
}

#[test]
fn fragment_iterator_stops_on_missing_type_byte() {
    // A lone length byte at the end of the buffer.
    let data = [2, ADV_TYPE_FLAGS, 0x06, 5];
    let fragments: Vec<_> = AdFragments::new(&data).collect();
    assert_eq!(fragments, vec![(ADV_TYPE_FLAGS, &[0x06][..])]);
}
