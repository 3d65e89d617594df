// Entrypoint for the exerciser.
// - Keeps `main` small: set up logging, build the client, hand over to the
//   driver in `ui`.
// - Scenario failures are printed, never turned into a failing exit status.

use crossterm::tty::IsTty;
use parse_api_exerciser::ui::{run_all, Report};
use parse_api_exerciser::{ExerciserConfig, ParseClient};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug shows request details on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = ExerciserConfig::default();
    let client = ParseClient::new(&config)?;

    let stdout = std::io::stdout();
    // Colour only when a person is watching.
    let styled = stdout.is_tty();
    let mut out = stdout.lock();
    let mut report = Report::new(&mut out).styled(styled);
    run_all(&client, &config, &mut report);
    Ok(())
}
