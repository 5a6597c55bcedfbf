#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lounge_timer_lib::run(std::env::args().collect()).await
}
