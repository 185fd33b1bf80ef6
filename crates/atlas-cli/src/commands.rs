use std::sync::Arc;

use anyhow::Context;
use atlas_media::{DirectoryMediaStore, PngCodec};
use atlas_nav::{AlbumPreload, Collaborators, Navigator};
use atlas_services::{GoogleMapsClient, GooglePhotosClient, HttpImageFetcher, PhotoLibrary};
use atlas_store::{EntityRepository, JsonFileTable};
use colored::Colorize;
use tracing::info;

use crate::cli::*;
use crate::config::AppConfig;
use crate::console::ConsolePrompter;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(&cli.config)?.with_env_overrides();
    match cli.command() {
        Command::Run(args) => cmd_run(config, args).await,
        Command::ShowConfig => cmd_show_config(&config),
    }
}

async fn cmd_run(config: AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let api_key = config.api_key()?;
    let token = config.photos_access_token()?;

    let table_path = &config.storage.table_path;
    let table = JsonFileTable::open(table_path)
        .with_context(|| format!("opening table {}", table_path.display()))?;
    info!(path = %table_path.display(), records = table.len(), "table opened");
    let repo = EntityRepository::new(Arc::new(table));

    let library: Arc<dyn PhotoLibrary> = Arc::new(GooglePhotosClient::new(token));
    let collaborators = Collaborators {
        places: Arc::new(GoogleMapsClient::new(api_key)),
        library: library.clone(),
        fetcher: Arc::new(HttpImageFetcher::new()),
        media: Arc::new(DirectoryMediaStore::new(
            config.media.root.clone(),
            config.media.base_url.clone(),
        )),
        codec: Arc::new(PngCodec),
    };
    let preload = AlbumPreload::start(library);
    let navigator = Navigator::new(repo, collaborators, preload, Arc::new(ConsolePrompter::new()));

    match args.section {
        Some(section) => {
            let result = navigator.run_section(section.into()).await;
            navigator.preload().cancel().await;
            result?;
        }
        None => navigator.run().await?,
    }
    println!("{} Goodbye.", "✓".green().bold());
    Ok(())
}

fn cmd_show_config(config: &AppConfig) -> anyhow::Result<()> {
    let text = toml::to_string_pretty(&config.masked()).context("rendering config")?;
    println!("{}", "Effective configuration".bold());
    println!("{text}");
    Ok(())
}
