#[tokio::main]
async fn main() -> std::io::Result<()> {
    duel_relay::run_with_config().await
}
