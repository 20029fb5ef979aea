//! Connect to the configured database once, report the outcome, and close.
//!
//! Configuration is read from the environment (see [`dbconnect::config`]).
//! Status goes to stdout; diagnostics go to stderr, filtered by `RUST_LOG`.

use dbconnect::ConnectionHelper;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let mut helper = ConnectionHelper::stdout();

    let config = match dbconnect::config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "could not load configuration");
            println!("error: {}", e);
            return;
        }
    };

    let mut handle = helper.connect(&config).await;
    if handle.is_some() {
        helper.report_success();
    }
    helper.close(&mut handle).await;
}
