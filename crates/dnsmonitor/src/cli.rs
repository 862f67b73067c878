//! Command-line interface
//!
//! Targets are positional: `www.example.com` (A record) or `type:name` with
//! type one of `a`, `cname`, `mx`, `txt`, `ns`.

use clap::Parser;
use std::env;
use std::path::PathBuf;

const USAGE_EXAMPLES: &str = "\
Usage examples:
  dnsmonitor www.example.com
  dnsmonitor mx:example.com
  dnsmonitor ns:example.com txt:example.com www.example.com
  dnsmonitor -d 1.1.1.1 example.com

Valid query types are: a, cname, mx, txt & ns. The default is \"a\".";

/// DNS Monitor - A simple DNS monitor to alert DNS changes.
#[derive(Debug, Parser)]
#[command(name = "dnsmonitor", version, after_help = USAGE_EXAMPLES)]
pub struct Cli {
    /// Domains to monitor, optionally prefixed with a query type (mx:example.com)
    #[arg(value_name = "TARGET", required = true)]
    pub targets: Vec<String>,

    /// Config file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Custom DNS server (defaults to system DNS)
    #[arg(short = 'd', long = "dns", value_name = "SERVER")]
    pub dns: Option<String>,

    /// Interval to check in minutes
    #[arg(
        short = 'i',
        long,
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DNSMONITOR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Config file to read: `--config`, or the default location
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }
}

/// `<home>/.config/dnsmonitor.json`
pub fn default_config_path() -> PathBuf {
    home_dir().join(".config").join("dnsmonitor.json")
}

/// The user's home directory
fn home_dir() -> PathBuf {
    if cfg!(windows) {
        let drive = env::var("HOMEDRIVE").unwrap_or_default();
        let path = env::var("HOMEPATH").unwrap_or_default();
        let home = format!("{}{}", drive, path);
        if home.is_empty() {
            return PathBuf::from(env::var("USERPROFILE").unwrap_or_default());
        }
        return PathBuf::from(home);
    }

    PathBuf::from(env::var("HOME").unwrap_or_default())
}
