use std::net::SocketAddr;
use std::path::PathBuf;

use crate::state::RateLimitConfig;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address the HTTP server listens on
    pub listen_addr: SocketAddr,
    /// directory of static assets (the code entry page),
    ///  if not set then unknown paths are simply not found
    pub public_dir: Option<PathBuf>,

    // storage configuration
    /// root of the directory tree access codes unlock
    pub upload_dir: PathBuf,
    /// JSON file mapping access codes to directories
    pub codes_file: PathBuf,

    // verification throttling
    pub rate_limit: RateLimitConfig,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}
