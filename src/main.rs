use gitstuff::presentation::cli::CliApp;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Tracing is configured by the CLI once the verbosity is known
    let app = CliApp::new();
    app.run().await
}
