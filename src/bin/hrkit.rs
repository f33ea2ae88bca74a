use hrkit::cli::{self, HrkitCommand};
use hrkit::config;
use hrkit::HrkitError;

fn init_tracing() {
    use tracing_subscriber::{
        filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt as _, Registry,
    };

    Registry::default()
        .with(
            fmt::Layer::new()
                .with_ansi(true)
                .with_file(false)
                .with_line_number(false)
                .with_target(true)
                .with_timer(fmt::time::ChronoLocal::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .with(
            EnvFilter::try_from_env(config::env::LOG_DIRECTIVE)
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    if let Err(err) = run(cli::parse()).await {
        let code = match err {
            HrkitError::Unauthenticated | HrkitError::InvalidCredentials { .. } => {
                eprintln!("{}", err);
                2
            }
            _ => {
                eprintln!("{}", err);
                1
            }
        };
        std::process::exit(code);
    }
}

async fn run(HrkitCommand { app, command }: HrkitCommand) -> hrkit::Result<()> {
    let running = app.launch().await?;
    let result = command.run(&running.client()).await;
    running.shutdown().await?;
    result
}
