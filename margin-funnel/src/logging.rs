//! Logging for the funnel binary.
//!
//! The funnel renders to stdout, so log records go to stderr. The level can
//! be changed from the REPL and a log file attached once the config is
//! loaded.

use anyhow::{Context, Result};
use chrono::Local;
use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, OnceLock},
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
};

pub const DEFAULT_FILTER: &str = "info";

/// `<local timestamp> <LEVEL> <file>:<line> <fields>`.
struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();
        let stamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");

        if ansi {
            write!(writer, "\x1b[2m{stamp}\x1b[0m ")?;
        } else {
            write!(writer, "{stamp} ")?;
        }

        let color = match *meta.level() {
            Level::ERROR => "1;31",
            Level::WARN => "1;33",
            Level::INFO => "1;32",
            Level::DEBUG => "1;34",
            Level::TRACE => "1;35",
        };
        if ansi {
            write!(writer, "\x1b[{color}m{:>5}\x1b[0m ", meta.level())?;
        } else {
            write!(writer, "{:>5} ", meta.level())?;
        }

        if let (Some(file), Some(line)) = (meta.file().map(short_path), meta.line()) {
            write!(writer, "{file}:{line} ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Strips everything up to a crate's `src/` so records show `funnel.rs:42`.
fn short_path(file: &str) -> &str {
    file.rsplit_once("src/")
        .or_else(|| file.rsplit_once("src\\"))
        .map_or(file, |(_, rest)| rest)
}

/// Destination for the optional `log_file` setting.
///
/// The subscriber is installed before the config is read, so the layer
/// writing here exists from the start and the file is plugged in later.
/// Until then records sent to it go nowhere.
#[derive(Clone, Default)]
struct LateFile(Arc<Mutex<Option<File>>>);

impl LateFile {
    fn attach(
        &self,
        file: File,
    ) {
        *self.guard() = Some(file);
    }

    fn guard(&self) -> MutexGuard<'_, Option<File>> {
        // A poisoned lock still holds a usable file handle.
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct LateFileWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for LateFileWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.as_mut().map_or(Ok(buf.len()), |file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), |file| file.flush())
    }
}

impl<'a> MakeWriter<'a> for LateFile {
    type Writer = LateFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LateFileWriter(self.guard())
    }
}

type ReloadLevel = Box<dyn Fn(&str) -> Result<()> + Send + Sync>;

/// Runtime knobs kept once the subscriber is installed.
struct Controls {
    reload_level: ReloadLevel,
    log_file: LateFile,
}

static CONTROLS: OnceLock<Controls> = OnceLock::new();

fn controls() -> Result<&'static Controls> {
    CONTROLS
        .get()
        .ok_or_else(|| anyhow::anyhow!("logging not yet initialized"))
}

/// `RUST_LOG` wins; otherwise `fallback`, and [`DEFAULT_FILTER`] if that
/// does not parse.
fn make_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Backs the REPL `log <level>` command.
///
/// `level` is any `EnvFilter` directive, e.g. `debug` or
/// `info,margin_funnel::webhook=debug`.
pub fn set_log_level(level: &str) -> Result<()> {
    (controls()?.reload_level)(level)
}

/// Appends funnel logs to `path` from now on, as set by `log_file` in the
/// config.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;
    controls()?.log_file.attach(file);
    Ok(())
}

/// Installs stderr logging plus the (initially detached) log file layer.
///
/// `level` applies when `RUST_LOG` is unset. Only the first call has an
/// effect.
pub fn init_logging(level: &str) {
    let log_file = LateFile::default();
    let (level_filter, level_handle) = reload::Layer::new(make_filter(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(false)
        .with_writer(log_file.clone());

    let installed = tracing_subscriber::registry()
        .with(level_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_ok();
    if !installed {
        return;
    }

    let reload_level: ReloadLevel = Box::new(move |level: &str| {
        let filter =
            EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))?;
        level_handle.reload(filter).context("filter reload failed")
    });
    let _ = CONTROLS.set(Controls {
        reload_level,
        log_file,
    });
}
