//! Logging via the tracing crate.
//!
//! Embedders call [`init`] or [`init_with_config`] once at startup; host functions then log
//! through the ordinary `tracing` macros.

use std::{fmt, io};

use ansi_term::{Color, Style};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        format,
        time::{FormatTime, SystemTime},
        FmtContext, FormatEvent, FormatFields, FormattedFields,
    },
    prelude::*,
    registry::LookupSpan,
    EnvFilter,
};

/// Filter applied when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Output format.
    format: LoggingFormat,
    /// Shorten every module path segment but the last to its first letter, so
    /// `halcyon_execution_engine::runtime::storage` is printed as `h:r:storage`.
    abbreviate_modules: bool,
    /// Color levels and dim metadata in the text format.
    color: bool,
    /// Filter directives used when `RUST_LOG` is unset.
    filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            format: LoggingFormat::default(),
            abbreviate_modules: false,
            color: true,
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration with colored output and the default filter.
    pub fn new(format: LoggingFormat, abbreviate_modules: bool) -> Self {
        LoggingConfig {
            format,
            abbreviate_modules,
            ..LoggingConfig::default()
        }
    }

    /// Enables or disables colored text output.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Sets the filter used when `RUST_LOG` is unset.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Returns the output format.
    pub fn format(&self) -> LoggingFormat {
        self.format
    }

    fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.filter)
                .with_context(|| format!("invalid log filter {:?}", self.filter)),
        }
    }
}

/// Logging output format.
///
/// Defaults to "text".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFormat {
    /// Human-readable single-line events.
    Text,
    /// One JSON object per event.
    Json,
}

impl Default for LoggingFormat {
    fn default() -> Self {
        LoggingFormat::Text
    }
}

/// Shortens all but the last segment of `module_path` to their first character, joined by `:`.
fn abbreviate_module_path(module_path: &str) -> String {
    let mut segments: SmallVec<[&str; 6]> = module_path.split("::").collect();
    if let Some((_, parents)) = segments.split_last_mut() {
        for segment in parents {
            if let Some(first) = segment.get(0..1) {
                *segment = first;
            }
        }
    }
    segments.join(":")
}

fn level_color(level: &Level) -> Color {
    match *level {
        Level::TRACE => Color::Purple,
        Level::DEBUG => Color::Blue,
        Level::INFO => Color::Green,
        Level::WARN => Color::Yellow,
        Level::ERROR => Color::Red,
    }
}

/// The text format: timestamp, level, spans, `[module file:line]`, then the fields.
struct TextFormat {
    abbreviate_modules: bool,
    color: bool,
}

impl TextFormat {
    fn styled(
        &self,
        writer: &mut dyn fmt::Write,
        style: Style,
        body: impl FnOnce(&mut dyn fmt::Write) -> fmt::Result,
    ) -> fmt::Result {
        if self.color {
            write!(writer, "{}", style.prefix())?;
            body(writer)?;
            write!(writer, "{}", style.suffix())
        } else {
            body(writer)
        }
    }

    fn location(&self, event: &Event<'_>) -> String {
        let meta = event.metadata();
        let module_path = meta.module_path().unwrap_or_default();
        let line = meta.line().unwrap_or_default();
        if self.abbreviate_modules {
            format!("{}:{}", abbreviate_module_path(module_path), line)
        } else {
            let file = meta
                .file()
                .and_then(|file| file.rsplit('/').next())
                .unwrap_or_default();
            format!("{} {}:{}", module_path, file, line)
        }
    }
}

impl<S, N> FormatEvent<S, N> for TextFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        writer: &mut dyn fmt::Write,
        event: &Event<'_>,
    ) -> fmt::Result {
        let dimmed = Style::new().dimmed();
        self.styled(writer, dimmed, |writer| SystemTime.format_time(writer))?;

        let level = event.metadata().level();
        self.styled(writer, level_color(level).normal(), |writer| {
            write!(writer, " {:<6}", level.to_string())
        })?;

        let mut in_span = false;
        ctx.visit_spans(|span| {
            write!(writer, "{}", span.metadata().name())?;
            let extensions = span.extensions();
            if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                if !fields.is_empty() {
                    write!(writer, "{{{}}}", fields)?;
                }
            }
            in_span = true;
            writer.write_char(':')
        })?;
        if in_span {
            writer.write_char(' ')?;
        }

        let location = self.location(event);
        self.styled(writer, dimmed, |writer| write!(writer, "[{}]", location))?;
        writer.write_char(' ')?;

        ctx.format_fields(writer, event)?;
        writeln!(writer)
    }
}

/// Initializes the logging system with the default parameters.
///
/// See [`init_with_config`] for details.
pub fn init() -> anyhow::Result<()> {
    init_with_config(&LoggingConfig::default())
}

/// Installs a global subscriber writing to `stdout`.
///
/// The filter is read from `RUST_LOG`, falling back to the configured filter. Fails if a global
/// subscriber is already installed.
pub fn init_with_config(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_writer(io::stdout)
        .with_env_filter(env_filter);

    let installed = match config.format {
        LoggingFormat::Text => {
            let fields = format::debug_fn(|writer, field, value| {
                if field.name() == "message" {
                    write!(writer, "{:?}", value)
                } else {
                    write!(writer, "{}={:?}", field, value)
                }
            })
            .delimited("; ");
            let subscriber = builder
                .fmt_fields(fields)
                .event_format(TextFormat {
                    abbreviate_modules: config.abbreviate_modules,
                    color: config.color,
                })
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LoggingFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
    installed.context("global tracing subscriber already installed")
}
