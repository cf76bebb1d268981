use exam_seating::config::Config;
use exam_seating::server;
use exam_seating::store::Store;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // reads .env first so RUST_LOG can come from there
    let config = Config::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store = Store::open(&config.db_path)?;

    server::run_server(&config, store).await?;
    Ok(())
}
