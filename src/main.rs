use anyhow::Context;
use mock_server::{config::Config, listener::Listener};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // keep stdout for the received data, diagnostics go to stderr
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let listener = Listener::bind(Config::default()).context("mock server failed to start")?;

    let mut stdout = tokio::io::stdout();
    listener.run(&mut stdout).await?;

    Ok(())
}
