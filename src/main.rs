#[tokio::main]
async fn main() {
    // Startup failures are already logged by the server framework.
    if broker_server::run_with_config().await.is_err() {
        std::process::exit(1);
    }
}
