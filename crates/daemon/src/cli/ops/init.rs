use std::path::PathBuf;

use clap::Args;

use letterbox_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone, Default)]
pub struct Init {
    /// HTTP port to record in the config
    #[arg(long)]
    pub port: Option<u16>,

    /// Root of the shared directory tree
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,

    /// Access codes file
    #[arg(long)]
    pub codes_file: Option<PathBuf>,
}

impl Init {
    fn app_config(&self) -> AppConfig {
        let defaults = AppConfig::default();
        AppConfig {
            port: self.port.unwrap_or(defaults.port),
            upload_dir: self.upload_dir.clone().unwrap_or(defaults.upload_dir),
            codes_file: self.codes_file.clone().unwrap_or(defaults.codes_file),
            ..defaults
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = StateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::init(ctx.config_path.clone(), Some(self.app_config()))?;

        Ok(format!(
            "Initialized letterbox config at {}\n  upload dir: {}\n  codes file: {}",
            state.config_path.display(),
            state.config.upload_dir.display(),
            state.config.codes_file.display(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::cli::op::{Op, OpContext};

    #[tokio::test]
    async fn test_init_writes_config_once() {
        let temp = TempDir::new().unwrap();
        let ctx = OpContext::new(Some(temp.path().join("letterbox.toml")));
        let init = Init {
            upload_dir: Some(temp.path().join("upload")),
            codes_file: Some(temp.path().join("upload/codes.json")),
            ..Init::default()
        };

        let output = init.execute(&ctx).await.unwrap();
        assert!(output.contains("letterbox.toml"));
        assert!(temp.path().join("upload/codes.json").is_file());

        assert!(matches!(
            init.execute(&ctx).await,
            Err(StateError::AlreadyInitialized(_))
        ));
    }
}
