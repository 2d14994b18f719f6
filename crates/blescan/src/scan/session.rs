use tracing::{debug, trace};

use crate::adv::{parse_report, ParsedReport};
use crate::error::ScanError;
use crate::filter::{FilterConfig, FilterMatch, FilterTarget};
use crate::gap::{ConnParams, GapStack, OwnAddressType, PeerAddress, ScanParams};
use crate::scan::events::{AdvReport, EventSink, ScanEvent};

/// Scan session configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScanConfig {
    /// On filter match, stop scanning and connect to the target instead of
    /// notifying the application.
    pub connect_auto: bool,
    pub own_addr_type: OwnAddressType,
    pub scan_params: ScanParams,
    /// Only consulted when `connect_auto` is set.
    pub conn_params: ConnParams,
}

type Handler = Box<dyn EventSink>;

/// The scan session controller.
///
/// Owns the configuration, the filter state, and the most recent parse
/// result; drives the external stack through [`GapStack`] and notifies the
/// application through an optional [`EventSink`]. A `None` handler
/// suppresses notification but internal transitions (auto-connect) still
/// execute.
///
/// All operations run synchronously on the caller's thread; the session has
/// no interior locking and expects events one at a time, matching the
/// single-threaded delivery contract of BLE stack callbacks.
pub struct ScanSession<S: GapStack> {
    stack: S,
    config: ScanConfig,
    handler: Option<Handler>,
    filter: FilterConfig,
    last_report: ParsedReport,
    filter_matched: bool,
}

impl<S: GapStack> ScanSession<S> {
    /// Creates a session and forwards the scan parameters to the stack.
    ///
    /// Fails with `InvalidParameter` on inconsistent scan or (when
    /// `connect_auto` is set) connection parameters, and propagates any
    /// status the stack returns for the parameter set request.
    pub fn new(
        mut stack: S,
        config: ScanConfig,
        handler: Option<Handler>,
    ) -> Result<Self, ScanError> {
        config.scan_params.validate()?;
        if config.connect_auto {
            config.conn_params.validate()?;
        }

        stack.scan_param_set(config.own_addr_type, &config.scan_params)?;

        Ok(Self {
            stack,
            config,
            handler,
            filter: FilterConfig::default(),
            last_report: ParsedReport::empty(Default::default(), PeerAddress::default()),
            filter_matched: false,
        })
    }

    /// Starts scanning. With whitelist mode configured, a
    /// `WhitelistRequest` event is dispatched first so the application can
    /// load whitelist entries into the stack.
    pub fn start(&mut self) -> Result<(), ScanError> {
        if self.config.scan_params.use_whitelist {
            Self::dispatch(&mut self.handler, &ScanEvent::WhitelistRequest);
        }
        self.stack.scan_start()
    }

    /// Enables the filter kind carried by `target`. Kinds combine; setting
    /// a kind again replaces its target.
    pub fn set_filter(&mut self, target: FilterTarget) {
        self.filter.set(target);
    }

    /// Disables all filter kinds and clears their targets. Idempotent.
    pub fn disable_filter(&mut self) {
        self.filter.clear();
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    /// The most recently parsed report.
    pub fn last_report(&self) -> &ParsedReport {
        &self.last_report
    }

    /// The single event-delivery entry point.
    ///
    /// The stack adapter feeds `AdvReport`, `ScanTimeout`, `ScanStopped`
    /// and `Connected` here; everything else is forwarded to the handler
    /// unchanged. Stack status codes from actions taken while handling an
    /// event propagate to the caller unmodified.
    pub fn handle_event(&mut self, event: ScanEvent<'_>) -> Result<(), ScanError> {
        trace!(?event, "scan event");

        match event {
            ScanEvent::AdvReport(report) => {
                if self.config.scan_params.use_whitelist {
                    // Whitelist mode: the stack already filtered; hand the
                    // raw report straight to the application.
                    Self::dispatch(&mut self.handler, &ScanEvent::WhitelistDeviceFound(report));
                    Ok(())
                } else {
                    self.on_adv_report(&report)
                }
            }
            ScanEvent::FilterMatch { matched, .. } => self.on_filter_match(matched),
            ScanEvent::ScanTimeout => {
                if self.filter_matched {
                    Self::dispatch(&mut self.handler, &ScanEvent::ScanTimeout);
                } else {
                    Self::dispatch(&mut self.handler, &ScanEvent::FilterNoMatch);
                }
                Ok(())
            }
            ScanEvent::ScanStopped { ref status } => {
                if status.is_ok() && self.config.connect_auto {
                    debug!(peer = %self.config.conn_params.peer, "scan stopped, connecting");
                    self.stack
                        .connect(self.config.own_addr_type, &self.config.conn_params)
                } else {
                    Self::dispatch(&mut self.handler, &event);
                    Ok(())
                }
            }
            other => {
                Self::dispatch(&mut self.handler, &other);
                Ok(())
            }
        }
    }

    fn on_adv_report(&mut self, report: &AdvReport<'_>) -> Result<(), ScanError> {
        self.last_report = parse_report(report.report_type, report.peer, report.data);
        Self::dispatch(
            &mut self.handler,
            &ScanEvent::DataParseComplete(&self.last_report),
        );

        if !self.filter.is_enabled() {
            return Ok(());
        }

        self.filter_matched = false;
        let matched = self.filter.evaluate(report.data, &report.peer);
        if matched.any() {
            self.filter_matched = true;
            self.on_filter_match(matched)
        } else {
            Ok(())
        }
    }

    fn on_filter_match(&mut self, matched: FilterMatch) -> Result<(), ScanError> {
        if self.config.connect_auto {
            debug!("filter matched, stopping scan for auto-connect");
            self.stack.scan_stop()
        } else {
            Self::dispatch(
                &mut self.handler,
                &ScanEvent::FilterMatch {
                    matched,
                    report: &self.last_report,
                },
            );
            Ok(())
        }
    }

    fn dispatch(handler: &mut Option<Handler>, event: &ScanEvent<'_>) {
        if let Some(handler) = handler {
            handler.on_scan_event(event);
        }
    }
}
