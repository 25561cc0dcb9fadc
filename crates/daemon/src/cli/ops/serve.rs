use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Args;

use letterbox_daemon::state::{AppConfig, AppState, StateError};
use letterbox_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Override the HTTP port (default from config)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Override the root of the shared directory tree
    #[arg(long, env = "LETTERBOX_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Override the access codes file
    #[arg(long, env = "LETTERBOX_CODES_FILE")]
    pub codes_file: Option<PathBuf>,

    /// Override the directory holding the code entry page
    #[arg(long, env = "LETTERBOX_PUBLIC_DIR")]
    pub public_dir: Option<PathBuf>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Default log level, `RUST_LOG` takes precedence
    #[arg(long, default_value_t = tracing::Level::INFO)]
    pub log_level: tracing::Level,
}

impl Serve {
    /// Layer the flags over the loaded config file
    pub fn service_config(&self, config: &AppConfig) -> ServiceConfig {
        let port = self.port.unwrap_or(config.port);
        let public_dir = self
            .public_dir
            .clone()
            .unwrap_or_else(|| config.public_dir.clone());

        ServiceConfig {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            // the entry page is optional, /api and /letters work without it
            public_dir: public_dir.is_dir().then_some(public_dir),
            upload_dir: self
                .upload_dir
                .clone()
                .unwrap_or_else(|| config.upload_dir.clone()),
            codes_file: self
                .codes_file
                .clone()
                .unwrap_or_else(|| config.codes_file.clone()),
            rate_limit: config.rate_limit,
            log_level: self.log_level,
            log_dir: self.log_dir.clone().or_else(|| config.log_dir.clone()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("state error: {0}")]
    StateError(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;
        let config = self.service_config(&state.config);

        spawn_service(&config).await;
        Ok("letterbox stopped".to_string())
    }
}
