use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::model::{Account, AppEvent};

const DEMO_ACCOUNTS: &str = include_str!("demo_accounts.json");

#[derive(Debug)]
pub enum CatalogError {
    Io(PathBuf, std::io::Error),
    Parse(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Failed to read {}: {}", path.display(), e),
            Self::Parse(e) => write!(f, "Invalid account catalog: {}", e),
        }
    }
}

impl Error for CatalogError {}

pub fn parse_accounts(json: &str) -> Result<Vec<Account>, CatalogError> {
    serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))
}

/// The catalog bundled with the binary.
pub fn demo_accounts() -> Result<Vec<Account>, CatalogError> {
    parse_accounts(DEMO_ACCOUNTS)
}

/// Read the catalog from `path`, or fall back to the bundled demo catalog.
pub async fn load_accounts(path: Option<PathBuf>) -> Result<Vec<Account>, CatalogError> {
    match path {
        Some(path) => {
            debug!("Reading account catalog from {}", path.display());
            let raw = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| CatalogError::Io(path.clone(), e))?;
            parse_accounts(&raw)
        }
        None => demo_accounts(),
    }
}

/// Load in the background and report through the app channel.
pub fn spawn_load(path: Option<PathBuf>, tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        match load_accounts(path).await {
            Ok(accounts) => {
                let _ = tx.send(AppEvent::AccountsLoaded(accounts));
            }
            Err(e) => {
                let _ = tx.send(AppEvent::Message(format!("Catalog load failed: {}", e)));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountStatus, AccountType};
    use tokio::sync::mpsc;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sharekey-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_demo_catalog() {
        let accounts = demo_accounts().unwrap();
        assert_eq!(accounts.len(), 6);

        let with_code: Vec<&str> = accounts
            .iter()
            .filter(|a| a.can_show_code())
            .map(|a| a.id.as_str())
            .collect();
        // id 5 has a secret but is dead
        assert_eq!(with_code, vec!["1", "2"]);
        assert_eq!(accounts[4].status, AccountStatus::Dead);
        assert_eq!(accounts[2].kind, AccountType::CapCut);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(parse_accounts("{"), Err(CatalogError::Parse(_))));
        assert!(matches!(
            parse_accounts(r#"[{"id": "1", "type": "Netflix"}]"#),
            Err(CatalogError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_load_accounts_from_file() {
        let path = temp_path("load");
        let json = serde_json::json!([{
            "id": "9",
            "type": "Other",
            "email": "ops@sharekey.demo",
            "lastUpdated": "now",
            "status": "Busy",
            "otpSecret": "ABCDEF"
        }]);
        tokio::fs::write(&path, json.to_string()).await.unwrap();

        let accounts = load_accounts(Some(path.clone())).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].password, None);
        assert!(accounts[0].tags.is_empty());
        assert!(accounts[0].can_show_code());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let path = temp_path("missing");
        let err = load_accounts(Some(path.clone())).await.unwrap_err();
        assert!(matches!(err, CatalogError::Io(p, _) if p == path));
    }

    #[tokio::test]
    async fn test_spawn_load_reports_through_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_load(None, tx.clone());
        match rx.recv().await {
            Some(AppEvent::AccountsLoaded(accounts)) => assert_eq!(accounts.len(), 6),
            other => panic!("unexpected event: {:?}", other),
        }

        spawn_load(Some(temp_path("absent")), tx);
        match rx.recv().await {
            Some(AppEvent::Message(msg)) => assert!(msg.starts_with("Catalog load failed")),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
