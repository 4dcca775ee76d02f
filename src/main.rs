#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = orish_api::run().await {
        eprintln!("orish-api fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
