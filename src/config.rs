use std::env;
use std::path::PathBuf;

const DEFAULT_LOG_FILE: &str = "sharekey.log";
const DEFAULT_LOG_FILTER: &str = "debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub debug: bool,
    pub accounts_path: Option<PathBuf>,
    pub log_file: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Build from the process arguments and environment. A `.env` file in the
    /// working directory is loaded first if one exists.
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        let args: Vec<String> = env::args().skip(1).collect();
        Self::from_sources(&args, |key| env::var(key).ok())
    }

    /// Flags take precedence over environment variables.
    pub fn from_sources(args: &[String], env_var: impl Fn(&str) -> Option<String>) -> Self {
        let debug = args.iter().any(|s| s == "--debug");
        let flag_accounts = args
            .iter()
            .position(|s| s == "--accounts")
            .and_then(|i| args.get(i + 1))
            .map(PathBuf::from);

        Self {
            debug,
            accounts_path: flag_accounts
                .or_else(|| env_var("SHAREKEY_ACCOUNTS").map(PathBuf::from)),
            log_file: env_var("SHAREKEY_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            log_filter: env_var("SHAREKEY_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}
