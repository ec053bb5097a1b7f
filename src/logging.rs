//! Tracing setup and the per-session span.
//!
//! Session operations run inside [`session_span`], so every event they emit
//! carries the session kind and sprint id: as a prefix on stderr and as a
//! `span` object in the JSON log file.

use crate::session::SessionKind;
use std::path::{Path, PathBuf};
use tracing::Span;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILE: &str = "sprig.log";

/// Install the global subscriber: compact stderr output plus, with
/// `log_file`, daily-rotated JSON lines next to it.
///
/// `RUST_LOG` overrides the level picked by `verbose`. Calling this when a
/// subscriber is already installed does nothing.
pub fn init(verbose: bool, log_file: Option<PathBuf>) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(stderr_layer)
        .with(log_file.map(|path| json_layer(file_appender(&path))))
        .try_init();
}

/// Span that scopes one operation on a session.
pub fn session_span(kind: SessionKind, session_id: &str) -> Span {
    tracing::info_span!("session", kind = %kind, session_id = %session_id)
}

fn env_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("sprig={}", level)))
}

fn file_appender(path: &Path) -> RollingFileAppender {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let _ = std::fs::create_dir_all(dir);

    let file_name = path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new(DEFAULT_LOG_FILE));
    rolling::daily(dir, file_name)
}

/// One JSON object per event, with the innermost span's fields under `span`.
fn json_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .json()
        .with_current_span(true)
        .with_span_list(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    #[test]
    fn test_json_events_carry_session_fields() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::registry().with(json_layer(move || writer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("outside");
            let _span = session_span(SessionKind::Retrospective, "AlphaTeam_Sprint_3").entered();
            tracing::info!(count = 2, "Feedback added");
        });

        let lines = captured.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].get("span").is_none());

        let event = &lines[1];
        assert_eq!(event["fields"]["message"], "Feedback added");
        assert_eq!(event["span"]["name"], "session");
        assert_eq!(event["span"]["kind"], "retrospective");
        assert_eq!(event["span"]["session_id"], "AlphaTeam_Sprint_3");
    }

    #[test]
    fn test_file_appender_creates_log_dir() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs").join("sprig.log");

        let _appender = file_appender(&log_path);

        assert!(temp_dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(true, None);
        init(false, None);
    }
}
