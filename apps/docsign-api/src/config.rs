//! Command-line and environment configuration

use clap::Parser;
use std::path::PathBuf;

/// Default JSON body limit; base64 PDFs and images are inflated by a third
const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Parser, Debug, Clone)]
#[command(name = "docsign-api")]
#[command(about = "Places signature images on uploaded PDFs and tracks their digests")]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Directory holding stored documents (defaults to the platform data dir)
    #[arg(long, env = "DOCSIGN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Largest accepted request body in bytes
    #[arg(long, env = "DOCSIGN_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
