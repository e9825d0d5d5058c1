//! Tracing setup for the `jotter` binary.
//!
//! | Variable     | Effect                                                   |
//! |--------------|----------------------------------------------------------|
//! | `LOG_FORMAT` | `json` for structured lines, anything else for text      |
//! | `LOG_FILE`   | write to a daily-rolled file instead of stderr           |
//! | `LOG_ANSI`   | `true`/`1` or `false`/`0` to force colours on or off     |
//! | `RUST_LOG`   | env filter, `jotter=warn` when unset                     |
//!
//! Command results own stdout, so console logging always goes to stderr.

use std::path::{Path, PathBuf};

use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "jotter=warn";
const DEFAULT_FILE_NAME: &str = "jotter.log";

/// Logging choices read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    json: bool,
    file: Option<PathBuf>,
    ansi: Option<bool>,
}

impl LogSettings {
    fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            json: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            file: var("LOG_FILE").filter(|p| !p.is_empty()).map(PathBuf::from),
            ansi: var("LOG_ANSI").and_then(|v| parse_switch(&v)),
        }
    }

    /// Whether text output is coloured. A log file stays plain unless
    /// `LOG_ANSI` turns colours on; stderr defers to terminal detection.
    fn colours(&self) -> Option<bool> {
        match (&self.file, self.ansi) {
            (Some(_), ansi) => Some(ansi.unwrap_or(false)),
            (None, ansi) => ansi,
        }
    }

    /// Directory and file name for the rolling appender.
    fn file_parts(&self) -> Option<(&Path, &str)> {
        let path = self.file.as_deref()?;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(DEFAULT_FILE_NAME);
        Some((dir, name))
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered file output is flushed.
pub fn init() -> Option<WorkerGuard> {
    let settings = LogSettings::from_env();

    let guard = match settings.file_parts() {
        Some((dir, name)) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
            install(&settings, writer);
            Some(guard)
        }
        None => {
            install(&settings, std::io::stderr);
            None
        }
    };

    debug!(
        json = settings.json,
        log_file = ?settings.file,
        ansi = ?settings.colours(),
        "Logging initialized"
    );
    guard
}

fn install<W>(settings: &LogSettings, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if settings.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
        return;
    }

    let mut layer = tracing_subscriber::fmt::layer().with_writer(writer);
    if let Some(ansi) = settings.colours() {
        layer = layer.with_ansi(ansi);
    }
    registry.with(layer).init();
}
