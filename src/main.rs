use std::fs::File;
use std::path::PathBuf;

use chatai::Theme;
use chatai::core::config::{self, CliOverrides};
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "chatai", about = "Terminal chat client with resumable history")]
struct Args {
    /// User id for the profile lookup (overrides CHATAI_USER_ID)
    #[arg(long)]
    user_id: Option<String>,

    /// Directory holding the local transcript copy
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Color theme
    #[arg(long, value_enum)]
    theme: Option<Theme>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to chatai.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("chatai.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!("chatai starting up");

    let file_config = config::load_config().map_err(std::io::Error::other)?;
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            user_id: args.user_id,
            state_dir: args.state_dir,
            theme: args.theme,
        },
    );

    chatai::tui::run(resolved).await
}
