use clap::Parser;
use std::path::PathBuf;

/// Argus - OSINT research gateway bridging a hosted assistant API to web search
#[derive(Parser, Debug, Clone)]
#[command(name = "argus", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "ARGUS_CONFIG", default_value = "argus.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "ARGUS_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "ARGUS_PORT")]
    pub port: Option<u16>,

    /// Assistant model override
    #[arg(long, env = "ARGUS_MODEL")]
    pub model: Option<String>,

    /// Hard deadline in seconds for a remote run to settle
    #[arg(long, env = "ARGUS_POLL_DEADLINE")]
    pub poll_deadline: Option<u64>,
}
