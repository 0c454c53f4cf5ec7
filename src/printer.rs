//! Job submission through the local print bridge.
//!
//! The bridge itself (certificate handshake, printer discovery, the socket)
//! lives outside this crate and is reached through [`PrintBridge`]. This
//! module only encodes finished jobs, keeps at most one connection attempt
//! in flight, and reports failures to the user.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use tokio::sync::OnceCell;

use crate::builder::build_delivery_label;
use crate::config::PrintSettings;
use crate::error::{LabelError, Result};
use crate::graphics::FontBook;
use crate::label::DeliveryLabelFields;

/// The narrow contract of the external print bridge.
#[async_trait]
pub trait PrintBridge: Send + Sync {
    async fn connect(&self) -> Result<bool>;

    async fn find_printers(&self) -> Result<Vec<String>>;

    /// Send `data` verbatim to `printer`. With `is_base64` the bridge decodes
    /// it back to binary first.
    async fn print_raw(&self, printer: &str, data: &str, is_base64: bool) -> Result<bool>;
}

/// Where user-facing messages go (a blocking dialog in the host UI).
pub trait Alerts: Send + Sync {
    fn alert(&self, message: &str);

    fn warn(&self, message: &str);
}

/// Alerts that only go to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerts;

impl Alerts for LogAlerts {
    fn alert(&self, message: &str) {
        tracing::error!(alert = message, "print alert");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(warning = message, "print warning");
    }
}

/// A bridge plus its lazily established connection.
///
/// Concurrent callers of [`ensure_connected`](Self::ensure_connected) wait on
/// the same in-flight `connect()`. A successful connection is kept for the
/// life of the session; a failed one is not, so the next caller retries.
#[derive(Debug)]
pub struct BridgeSession<B> {
    bridge: B,
    ready: OnceCell<()>,
    connecting: AtomicBool,
}

impl<B: PrintBridge> BridgeSession<B> {
    pub fn new(bridge: B) -> Self {
        Self { bridge, ready: OnceCell::new(), connecting: AtomicBool::new(false) }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn is_connected(&self) -> bool {
        self.ready.initialized()
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::Acquire)
    }

    pub async fn ensure_connected(&self) -> Result<()> {
        self.ready
            .get_or_try_init(|| async {
                let connected = {
                    let _connecting = ConnectingFlag::raise(&self.connecting);
                    self.bridge.connect().await
                };
                match connected {
                    Ok(true) => {
                        tracing::info!("print bridge connected");
                        Ok(())
                    }
                    Ok(false) => Err(LabelError::BridgeUnavailable("bridge refused the connection".into())),
                    Err(e) => Err(e),
                }
            })
            .await
            .map(|_| ())
    }

    pub async fn find_printers(&self) -> Result<Vec<String>> {
        self.ensure_connected().await?;
        self.bridge.find_printers().await
    }
}

/// Holds `connecting` up for as long as a connect is in flight, including
/// when the awaiting future is dropped part-way.
struct ConnectingFlag<'a>(&'a AtomicBool);

impl<'a> ConnectingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for ConnectingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Base64 of the whole job buffer.
pub fn encode_job(job: &[u8]) -> String {
    general_purpose::STANDARD.encode(job)
}

/// Send one finished job. Returns the bridge's verdict; any error becomes
/// `false` plus an alert carrying the raw error text. No retry.
pub async fn submit<B: PrintBridge>(
    session: &BridgeSession<B>,
    alerts: &dyn Alerts,
    printer: &str,
    job: &[u8],
) -> bool {
    let data = encode_job(job);
    match send(session, printer, &data).await {
        Ok(ok) => {
            tracing::info!(printer, bytes = job.len(), accepted = ok, "submitted label job");
            ok
        }
        Err(e) => {
            tracing::error!(printer, error = %e, "label job failed");
            alerts.alert(&raw_message(&e));
            false
        }
    }
}

async fn send<B: PrintBridge>(session: &BridgeSession<B>, printer: &str, data: &str) -> Result<bool> {
    session.ensure_connected().await?;
    session.bridge.print_raw(printer, data, true).await
}

fn raw_message(e: &LabelError) -> String {
    match e {
        LabelError::BridgeUnavailable(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// Outcome of a sequential batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub printed: usize,
    /// Serials whose job was rejected or failed, in input order.
    pub failed: Vec<String>,
}

/// Print one delivery label per entry, strictly one after another.
///
/// Settings are validated first; on a missing printer or bridge the user is
/// warned and nothing is rasterized. A failed label does not stop the rest.
pub async fn print_batch<B: PrintBridge>(
    session: &BridgeSession<B>,
    alerts: &dyn Alerts,
    settings: &PrintSettings,
    fonts: &FontBook,
    labels: &[DeliveryLabelFields],
) -> Result<BatchReport> {
    let printer = match settings.printer() {
        Ok(p) => p,
        Err(e) => {
            alerts.warn(&e.to_string());
            return Err(e);
        }
    };

    let mut report = BatchReport::default();
    for fields in labels {
        let job = build_delivery_label(fonts, &settings.font_family, fields);
        if submit(session, alerts, printer, &job).await {
            report.printed += 1;
        } else {
            report.failed.push(fields.serial.clone());
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockBridge {
        connects: AtomicUsize,
        fail_connects: AtomicUsize,
        print_error: Option<String>,
        jobs: Mutex<Vec<(String, String, bool)>>,
    }

    #[async_trait]
    impl PrintBridge for MockBridge {
        async fn connect(&self) -> Result<bool> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail_connects.load(Ordering::SeqCst) > 0 {
                self.fail_connects.fetch_sub(1, Ordering::SeqCst);
                return Err(LabelError::BridgeUnavailable("socket closed".into()));
            }
            Ok(true)
        }

        async fn find_printers(&self) -> Result<Vec<String>> {
            Ok(vec!["LP-2824".into(), "Office".into()])
        }

        async fn print_raw(&self, printer: &str, data: &str, is_base64: bool) -> Result<bool> {
            if let Some(e) = &self.print_error {
                return Err(LabelError::BridgeUnavailable(e.clone()));
            }
            self.jobs.lock().unwrap().push((printer.into(), data.into(), is_base64));
            Ok(true)
        }
    }

    struct SlowBridge;

    #[async_trait]
    impl PrintBridge for SlowBridge {
        async fn connect(&self) -> Result<bool> {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(true)
        }

        async fn find_printers(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn print_raw(&self, _printer: &str, _data: &str, _is_base64: bool) -> Result<bool> {
            Ok(true)
        }
    }

    #[derive(Default)]
    struct RecordingAlerts {
        alerts: Mutex<Vec<String>>,
        warnings: Mutex<Vec<String>>,
    }

    impl Alerts for RecordingAlerts {
        fn alert(&self, message: &str) {
            self.alerts.lock().unwrap().push(message.into());
        }

        fn warn(&self, message: &str) {
            self.warnings.lock().unwrap().push(message.into());
        }
    }

    #[test]
    fn test_encode_job_is_binary_safe() {
        let job: Vec<u8> = (0..=255u8).chain([b'\n', 0, 0xFF]).collect();
        let encoded = encode_job(&job);
        assert_eq!(general_purpose::STANDARD.decode(encoded).unwrap(), job);
    }

    #[tokio::test]
    async fn test_submit_sends_base64() {
        let session = BridgeSession::new(MockBridge::default());
        let alerts = RecordingAlerts::default();
        let job = b"N\nGW0,0,1,1\n\x00\nP1\n";

        assert!(submit(&session, &alerts, "LP-2824", job).await);

        let jobs = session.bridge().jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].0, "LP-2824");
        assert!(jobs[0].2);
        assert_eq!(general_purpose::STANDARD.decode(&jobs[0].1).unwrap(), job.to_vec());
        assert!(alerts.alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_failure_alerts_raw_text() {
        let bridge = MockBridge { print_error: Some("Printer offline".into()), ..MockBridge::default() };
        let session = BridgeSession::new(bridge);
        let alerts = RecordingAlerts::default();

        assert!(!submit(&session, &alerts, "LP-2824", b"P1\n").await);
        assert_eq!(*alerts.alerts.lock().unwrap(), vec!["Printer offline".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_connect() {
        let session = BridgeSession::new(MockBridge::default());
        let (a, b, c) = tokio::join!(
            session.ensure_connected(),
            session.ensure_connected(),
            session.ensure_connected()
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(session.bridge().connects.load(Ordering::SeqCst), 1);
        assert!(session.is_connected());
        assert!(!session.is_connecting());
    }

    #[tokio::test]
    async fn test_cancelled_connect_clears_connecting() {
        let session = BridgeSession::new(SlowBridge);
        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            session.ensure_connected(),
        )
        .await
        .is_err();

        assert!(timed_out);
        assert!(!session.is_connecting());
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_failed_connect_is_retried() {
        let bridge = MockBridge { fail_connects: AtomicUsize::new(1), ..MockBridge::default() };
        let session = BridgeSession::new(bridge);

        assert!(session.ensure_connected().await.is_err());
        assert!(!session.is_connected());
        assert_eq!(session.find_printers().await.unwrap(), vec!["LP-2824", "Office"]);
        assert_eq!(session.bridge().connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_batch_rejects_missing_printer_before_work() {
        let session = BridgeSession::new(MockBridge::default());
        let alerts = RecordingAlerts::default();
        let settings = PrintSettings { bridge_url: Some("wss://localhost:8181".into()), ..PrintSettings::default() };
        let labels = [DeliveryLabelFields::new("min", "Ring", "FC1")];

        let result = print_batch(&session, &alerts, &settings, &FontBook::new(), &labels).await;

        assert!(matches!(result, Err(LabelError::MissingPrinterSelection)));
        assert_eq!(alerts.warnings.lock().unwrap().len(), 1);
        assert_eq!(session.bridge().connects.load(Ordering::SeqCst), 0);
        assert!(session.bridge().jobs.lock().unwrap().is_empty());
    }
}
