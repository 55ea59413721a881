use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod inputs;
mod output;

use cli::Cli;
use commands::App;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut app = App::new(cli.settings.clone(), cli.lang.into());
    let locale = app.locale;
    match commands::run(&mut app, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            let message = match err.downcast_ref::<genai::GenAiError>() {
                Some(ai) => ai.localized(locale),
                None => format!("{err:#}"),
            };
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let format = fmt::format().with_target(false).compact();

    // RUST_LOG wins over --verbose.
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
