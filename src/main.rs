use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use logview::cli::{self, Cli};
use logview::config::Settings;
use logview::logs::time::{DEFAULT_OFFSET, DisplayTimer, offset_from_hours};

fn init_tracing(settings: Option<&Settings>) {
    let offset = settings
        .and_then(|s| offset_from_hours(s.display.utc_offset_hours).ok())
        .unwrap_or(DEFAULT_OFFSET);
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_timer(DisplayTimer::new(offset))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref());
    init_tracing(settings.as_ref().ok());

    let result = match settings {
        Ok(settings) => cli::run(cli, settings).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
