use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // Static asset directory for the code entry page
    pub public_dir: Option<PathBuf>,
    // log level for http tracing
    pub log_level: tracing::Level,
}

impl Config {
    pub fn new(listen_addr: SocketAddr, public_dir: Option<PathBuf>) -> Self {
        tracing::info!(
            "Creating HTTP server Config: listen_addr={}, public_dir={:?}",
            listen_addr,
            public_dir
        );
        Self {
            listen_addr,
            public_dir,
            log_level: tracing::Level::INFO,
        }
    }
}
