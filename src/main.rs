use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    wd_actions_cli::cli::app::run().await
}
