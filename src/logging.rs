use color_eyre::config::{HookBuilder, Theme};
use tracing::error;
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::FmtSpan;

const DEFAULT_FILTER: &str = "info,firehose_gate=debug,shuttle=trace";

/// Installs the eyre report hook and routes panics into the JSON log instead
/// of stderr, with the panic location as its own field.
fn init_report_hooks() -> eyre::Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::new()
        .theme(Theme::new())
        .display_env_section(false)
        .display_location_section(false)
        .add_default_filters()
        .into_hooks();

    eyre_hook.install()?;
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        error!(
            %location,
            report = %panic_hook.panic_report(info),
            "gate panicked"
        );
    }));
    Ok(())
}

fn init_tracing() -> eyre::Result<()> {
    use tracing_subscriber::prelude::*;

    // RUST_LOG wins over the default when set
    let filter = tracing_subscriber::filter::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::filter::EnvFilter::try_new(DEFAULT_FILTER))?;

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .json(),
        )
        .with(filter)
        .try_init()?;
    Ok(())
}

/// Installs the JSON subscriber and the color-eyre report hooks.
pub fn init_logging() -> eyre::Result<()> {
    init_tracing()?;
    init_report_hooks()
}
