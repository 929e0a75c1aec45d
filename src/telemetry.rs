//! Logging setup for the terminal client.
//!
//! LOG_LEVEL takes a bare level ("debug") or full directives
//! ("warn,gateway=debug"). LOG_FORMAT picks `pretty` or `json`.
//! Output goes to stderr; stdout belongs to the practice prompts.

use tracing_subscriber::EnvFilter;

/// Targets the client logs under: `act_prep` (binary), `gateway`, `session`, `auth`.
const DEFAULT_DIRECTIVES: &str = "warn,act_prep=info,gateway=info,session=info,auth=info";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Unknown or missing values fall back to `Pretty`.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Filter from LOG_LEVEL, or the client defaults when unset or unparsable.
fn filter_for(level: Option<&str>) -> EnvFilter {
    level
        .filter(|l| !l.trim().is_empty())
        .and_then(|l| EnvFilter::try_new(l).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

pub fn init_tracing() {
    let level = std::env::var("LOG_LEVEL").ok();
    let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_for(level.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(true);

    // `try_init` so a second call (or a test harness subscriber) is not fatal.
    let installed = match format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Pretty => builder.compact().try_init(),
    };
    if installed.is_ok() {
        tracing::debug!(target: "act_prep", ?format, "Tracing initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_pretty() {
        assert_eq!(LogFormat::parse(None), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(Some("text")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
    }

    #[test]
    fn bad_level_falls_back_to_defaults() {
        let defaults = EnvFilter::new(DEFAULT_DIRECTIVES).to_string();
        assert_eq!(filter_for(Some("gateway=loud")).to_string(), defaults);
        assert_eq!(filter_for(Some("  ")).to_string(), defaults);
        assert_eq!(filter_for(None).to_string(), defaults);
        assert_ne!(filter_for(Some("debug")).to_string(), defaults);
    }
}
