mod cli;
mod extract;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use common::{assert_dir_exists, get_env_usize, ConfigLoader, FsExt};
use dotenv::dotenv;
use env_logger::Env;
use log::info;

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Some(threads) = get_env_usize("EXTRACT_THREADS")? {
        info!("Using {} worker threads", threads);
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let cli = Cli::parse();

    match &cli.command {
        Commands::Extract(extract_args) => {
            let config_path = extract_args.config.relative_to_cwd()?;
            let config = ConfigLoader::new(config_path, "extract".to_string())?;

            let extract_options: corpus::ExtractOptions = config.load()?;
            let encoding_options: features::EncodingOptions = config.load()?;

            assert_dir_exists(&extract_options.games_dir)?;

            extract::extract(&extract_options, &encoding_options)?
        }
        Commands::Stats(stats_args) => {
            let config_path = stats_args.config.relative_to_cwd()?;
            let config = ConfigLoader::new(config_path, "extract".to_string())?;

            let extract_options: corpus::ExtractOptions = config.load()?;

            assert_dir_exists(&extract_options.games_dir)?;

            extract::action_types(&extract_options)?
        }
    }

    Ok(())
}
