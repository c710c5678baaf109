use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "newsprobe-server")]
#[command(author, version, about = "Fake news classifier inference service")]
pub struct Cli {
    /// Configuration file path (ignored if it does not exist)
    #[arg(short, long, env = "NEWSPROBE_CONFIG", default_value = "newsprobe.yaml")]
    pub config: String,

    /// Listen address
    #[arg(short = 'l', long, env = "HOST")]
    pub host: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "PORT")]
    pub port: Option<u16>,

    /// Classifier artifact path (empty means default)
    #[arg(long, env = "MODEL_PATH")]
    pub model_path: Option<String>,

    /// Vectorizer artifact path (empty means default)
    #[arg(long, env = "VECTORIZER_PATH")]
    pub vectorizer_path: Option<String>,

    /// Directory holding the default artifact files
    #[arg(long, env = "ARTIFACT_DIR")]
    pub artifact_dir: Option<PathBuf>,

    /// Skip the background artifact load at startup
    #[arg(long)]
    pub no_eager_load: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
