mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Check, Init, Serve, Version};

command_enum! {
    (Serve, Serve),
    (Init, Init),
    (Check, Check),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    // flags fall back to the environment, so .env has to land first
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let ctx = cli::op::OpContext::new(args.config_path);

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
