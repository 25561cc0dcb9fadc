use std::fmt;
use std::path::PathBuf;

use clap::Args;

use common::registry::{CodeRegistry, RegistryError};
use letterbox_daemon::state::{AppState, StateError};

/// Validate the config and codes file without starting the server
#[derive(Args, Debug, Clone)]
pub struct Check;

#[derive(Debug)]
pub struct CheckReport {
    pub codes_file: PathBuf,
    pub upload_dir: PathBuf,
    pub code_count: usize,
    /// Each unlockable directory and whether it exists on disk
    pub directories: Vec<(String, bool)>,
}

impl CheckReport {
    fn build(codes_file: PathBuf, upload_dir: PathBuf, registry: &CodeRegistry) -> Self {
        let directories = registry
            .directories()
            .into_iter()
            .map(|directory| {
                let exists = upload_dir.join(directory.as_str()).is_dir();
                (directory.to_string(), exists)
            })
            .collect();

        Self {
            codes_file,
            upload_dir,
            code_count: registry.len(),
            directories,
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "codes file: {} ({} codes)",
            self.codes_file.display(),
            self.code_count
        )?;
        write!(f, "upload dir: {}", self.upload_dir.display())?;
        for (directory, exists) in &self.directories {
            let status = if *exists { "ok" } else { "missing" };
            write!(f, "\n  {:<24} {}", directory, status)?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("state error: {0}")]
    StateError(#[from] StateError),

    #[error("codes file error: {0}")]
    Registry(#[from] RegistryError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Check {
    type Error = CheckError;
    type Output = CheckReport;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;
        let registry = CodeRegistry::load(&state.config.codes_file)?;

        Ok(CheckReport::build(
            state.config.codes_file,
            state.config.upload_dir,
            &registry,
        ))
    }
}
