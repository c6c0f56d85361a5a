use log::info;
use photoroll_lib::cli;
use photoroll_lib::config::{Config, IndexSource};
use photoroll_lib::index::{DirectoryMediaIndex, JsonlMediaIndex};
use photoroll_lib::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse()?;
    init_logging(&config.log)?;
    info!("{:?}", &config);

    match config.index.source {
        IndexSource::Jsonl => cli::run(JsonlMediaIndex::new(&config.index.path), config).await,
        IndexSource::Dir => cli::run(DirectoryMediaIndex::new(&config.index.path), config).await,
    }
}
