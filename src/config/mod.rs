//! Configuration loading.
//!
//! Sources in precedence order: command-line flag, `MDVIEW_*` environment
//! variable, JSON config file (`./config.json`, then
//! `$HOME/.config/mdview/config.json`), built-in default.

use std::fmt::Display;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 8888;

#[derive(Parser, Debug, Default)]
#[command(
    name = "mdview",
    version,
    about = "Serve a directory of Markdown files as a browsable two-pane site"
)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Open the default browser after the server starts
    #[arg(short, long)]
    open: bool,

    /// Directory to serve Markdown files from
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    port: Option<u16>,
    open: Option<bool>,
    target_dir: Option<PathBuf>,
}

/// Resolved application configuration, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub open: bool,
    pub target_dir: PathBuf,
    pub static_dir: PathBuf,
    pub template_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, String> {
        Self::resolve(Args::parse())
    }

    fn resolve(args: Args) -> Result<Self, String> {
        let file = read_file_config()?;

        let port = match args.port {
            Some(port) => port,
            None => env_parsed::<u16>("MDVIEW_PORT")?
                .or(file.port)
                .unwrap_or(DEFAULT_PORT),
        };
        // The flag can only turn the browser launch on; off is the default.
        let open = args.open
            || env_parsed::<bool>("MDVIEW_OPEN")?
                .or(file.open)
                .unwrap_or(false);
        let target_dir = match args.dir {
            Some(dir) => dir,
            None => std::env::var_os("MDVIEW_TARGET_DIR")
                .map(PathBuf::from)
                .or(file.target_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        Ok(Config {
            port,
            open,
            target_dir,
            static_dir: PathBuf::from("static"),
            template_dir: PathBuf::from("templates"),
        })
    }

    /// Loopback socket address for binding. The server is local-only.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], self.port))
    }
}

fn env_parsed<T: FromStr>(name: &str) -> Result<Option<T>, String>
where
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|err| format!("invalid {name}: {err}")),
        Err(_) => Ok(None),
    }
}

fn read_file_config() -> Result<FileConfig, String> {
    let mut candidates = vec![PathBuf::from("config.json")];
    if let Some(home) = std::env::var_os("HOME") {
        candidates.push(PathBuf::from(home).join(".config/mdview/config.json"));
    }

    for path in candidates {
        match fs::read_to_string(&path) {
            Ok(raw) => {
                return serde_json::from_str(&raw)
                    .map_err(|err| format!("invalid config file {}: {}", path.display(), err));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => {
                return Err(format!(
                    "failed to read config file {}: {}",
                    path.display(),
                    err
                ));
            }
        }
    }
    Ok(FileConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_flags() {
        let config = Config::resolve(Args::default()).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!config.open);
        assert_eq!(config.target_dir, PathBuf::from("."));
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from(["mdview", "--port", "9000", "--open", "--dir", "/tmp"])
            .unwrap();
        let config = Config::resolve(args).unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.open);
        assert_eq!(config.target_dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn socket_addr_is_loopback() {
        let config = Config::resolve(Args::default()).unwrap();
        assert!(config.socket_addr().ip().is_loopback());
    }

    #[test]
    fn file_config_tolerates_unknown_keys() {
        let parsed: FileConfig =
            serde_json::from_str(r#"{"port": 9999, "extra": true}"#).unwrap();
        assert_eq!(parsed.port, Some(9999));
    }
}
