pub use clap::Parser;

use std::path::PathBuf;

use letterbox_daemon::state::APP_NAME;

#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(about = "Share folders of letters behind access codes")]
pub struct Args {
    /// Path to the config file (defaults to ./letterbox.toml)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
