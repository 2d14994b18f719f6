//! Example: Driving a scan session against a stub stack
//!
//! This example shows the full event flow of the scan module without any
//! Bluetooth hardware: a stub stack that just prints the operations it is
//! asked to perform, a closure event handler, and a couple of synthetic
//! advertising reports.

use blescan::{
    AddressType, AdvReport, BdAddr, ConnParams, FilterTarget, GapStack, NameTarget,
    OwnAddressType, PeerAddress, ReportType, ScanConfig, ScanError, ScanEvent, ScanParams,
    ScanSession,
};

struct StubStack;

impl GapStack for StubStack {
    fn scan_param_set(
        &mut self,
        own_addr_type: OwnAddressType,
        params: &ScanParams,
    ) -> Result<(), ScanError> {
        println!("stack: scan_param_set({own_addr_type:?}, interval={})", params.interval);
        Ok(())
    }

    fn scan_start(&mut self) -> Result<(), ScanError> {
        println!("stack: scan_start");
        Ok(())
    }

    fn scan_stop(&mut self) -> Result<(), ScanError> {
        println!("stack: scan_stop");
        Ok(())
    }

    fn connect(
        &mut self,
        _own_addr_type: OwnAddressType,
        params: &ConnParams,
    ) -> Result<(), ScanError> {
        println!("stack: connect to {}", params.peer);
        Ok(())
    }
}

fn report(name: &[u8]) -> Vec<u8> {
    let mut data = vec![2, 0x01, 0x06]; // flags
    data.push((name.len() + 1) as u8);
    data.push(0x09); // complete local name
    data.extend_from_slice(name);
    data
}

fn main() -> Result<(), ScanError> {
    let peer = PeerAddress::new(
        AddressType::Public,
        BdAddr::new([0x66, 0x55, 0x44, 0x33, 0x22, 0x11]),
    );

    let handler = Box::new(|event: &ScanEvent<'_>| match event {
        ScanEvent::DataParseComplete(parsed) => {
            let name = parsed
                .local_name()
                .map(|n| String::from_utf8_lossy(n).into_owned())
                .unwrap_or_else(|| "<unnamed>".into());
            println!("app: parsed report from {}: name={name}", parsed.peer);
        }
        ScanEvent::FilterMatch { matched, report } => {
            println!("app: filter match {matched:?} for {}", report.peer);
        }
        other => println!("app: event {other:?}"),
    });

    let config = ScanConfig {
        connect_auto: true,
        conn_params: ConnParams {
            peer,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut session = ScanSession::new(StubStack, config, Some(handler))?;
    session.set_filter(FilterTarget::Name(NameTarget::new(b"Target")?));
    session.start()?;

    // A report from some other device: parsed, no match, nothing else.
    let other = report(b"Widget");
    session.handle_event(ScanEvent::AdvReport(AdvReport {
        report_type: ReportType::LegacyAdvertising,
        peer,
        data: &other,
    }))?;

    // The device we are looking for: the session stops the scan and, once
    // the stop completes, connects.
    let target = report(b"Target");
    session.handle_event(ScanEvent::AdvReport(AdvReport {
        report_type: ReportType::LegacyAdvertising,
        peer,
        data: &target,
    }))?;
    session.handle_event(ScanEvent::ScanStopped { status: Ok(()) })?;
    session.handle_event(ScanEvent::Connected { peer })?;

    Ok(())
}
