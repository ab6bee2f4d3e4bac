use clap::Parser;
use directories::ProjectDirs;
use feed_preload::cli::{Cli, Command};
use feed_preload::error::AppError;
use feed_preload::settings::{load_settings, save_settings, settings_path};
use feed_preload::window::ItemCount;
use feed_preload::{logging, session};

fn item_count(items: Option<usize>) -> ItemCount {
    items.map(ItemCount::Finite).unwrap_or(ItemCount::Unbounded)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| {
        ProjectDirs::from("dev", "feed-preload", "feed-preload")
            .map(|p| p.data_local_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("feed-preload"))
    });

    let _log_guard = logging::init(
        &data_dir,
        logging::LogConfig {
            dir: cli.log_dir.clone(),
            filter: cli.log_filter.clone(),
            stderr: cli.stderr_log,
        },
    );
    tracing::info!(data_dir = %data_dir.display(), "feed-preload 启动");

    let settings = load_settings(&data_dir);

    match cli.command {
        Command::Simulate { items, path } => {
            tracing::info!(steps = path.len(), "启动模式: Simulate");
            session::run_session(&settings, &data_dir, item_count(items), &path).await?;
            Ok(())
        }
        Command::Walk { items, steps, seed } => {
            tracing::info!(steps, seed, "启动模式: Walk");
            let total = item_count(items);
            let path = session::random_walk(total, steps, seed);
            session::run_session(&settings, &data_dir, total, &path).await?;
            Ok(())
        }
        Command::Settings => {
            if !settings_path(&data_dir).exists() {
                save_settings(&data_dir, &settings)?;
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}
