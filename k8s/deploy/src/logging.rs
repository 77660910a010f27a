use clap::ValueEnum;
use tracing_subscriber::{fmt, EnvFilter};

/// Formatting style of the log lines.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum FmtStyle {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Initialize logging components -- tracing. Log lines go to stderr so that the output of
/// the deployment tools stays readable. RUST_LOG overrides the default 'info' level.
pub fn init_logging(style: FmtStyle, ansi_colours: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi_colours);

    match style {
        FmtStyle::Pretty => builder.pretty().init(),
        FmtStyle::Compact => builder.compact().init(),
        FmtStyle::Json => builder.json().init(),
    }
}
