use anyhow::Result;
use prompt_sheet_flow::utils::logging;
use prompt_sheet_flow::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: the log level depends on it
    let config = Config::load()?;

    logging::init(config.verbose_logging);

    App::initialize(config)?.run().await
}
