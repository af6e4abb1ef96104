use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AccountType {
    ChatGPT,
    CapCut,
    Studocu,
    Other,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::ChatGPT => write!(f, "ChatGPT"),
            AccountType::CapCut => write!(f, "CapCut"),
            AccountType::Studocu => write!(f, "Studocu"),
            AccountType::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AccountStatus {
    Working,
    Busy,
    Dead,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Working => write!(f, "Working"),
            AccountStatus::Busy => write!(f, "Busy"),
            AccountStatus::Dead => write!(f, "Dead"),
        }
    }
}

/// One shared account in the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub last_updated: String,
    pub status: AccountStatus,
    #[serde(default)]
    pub otp_secret: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Account {
    /// Live accounts that carry a secret get the verification code view.
    pub fn can_show_code(&self) -> bool {
        self.status != AccountStatus::Dead
            && self.otp_secret.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Local part of the email, used as the list title.
    pub fn display_name(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Values on the detail surface that can be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    Email,
    Password,
    Code,
}

impl FieldId {
    pub const ALL: [FieldId; 3] = [FieldId::Email, FieldId::Password, FieldId::Code];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldId::Email => "email",
            FieldId::Password => "password",
            FieldId::Code => "code",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Loading,
    Accounts,
    Detail,
}

#[derive(Debug)]
pub enum AppEvent {
    AccountsLoaded(Vec<Account>),
    Message(String),
}
