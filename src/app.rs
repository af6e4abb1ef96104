use crossterm::event::KeyCode;
use ratatui::widgets::ListState;
use throbber_widgets_tui::ThrobberState;
use tracing::debug;

use crate::clipboard::ClipboardWriter;
use crate::clock::Clock;
use crate::model::{Account, AppScreen, FieldId};
use crate::presentation::{Presentation, SurfaceContent};

pub struct App<C: Clock> {
    pub screen: AppScreen,
    pub accounts: Vec<Account>,
    pub selected: usize,
    pub list_state: ListState,
    pub message: Option<String>,
    pub loading: bool,
    pub throbber_state: ThrobberState,
    pub presentation: Presentation<C>,
    clipboard: Box<dyn ClipboardWriter>,
}

impl<C: Clock> App<C> {
    pub fn new(clock: C, clipboard: Box<dyn ClipboardWriter>) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            screen: AppScreen::Loading,
            accounts: Vec::new(),
            selected: 0,
            list_state,
            message: None,
            loading: true,
            throbber_state: ThrobberState::default(),
            presentation: Presentation::new(clock),
            clipboard,
        }
    }

    pub fn selected_account(&self) -> Option<&Account> {
        self.accounts.get(self.selected)
    }

    pub fn accounts_loaded(&mut self, accounts: Vec<Account>) {
        debug!("AccountsLoaded: {} accounts", accounts.len());
        self.accounts = accounts;
        self.selected = 0;
        self.list_state.select(Some(0));
        self.loading = false;
        self.screen = AppScreen::Accounts;
        self.message = Some(if self.accounts.is_empty() {
            "No accounts in the catalog".into()
        } else {
            format!(
                "{} account(s). Use ↑/↓ and Enter to open.",
                self.accounts.len()
            )
        });
    }

    pub fn open_selected(&mut self) {
        let Some(account) = self.selected_account() else {
            return;
        };
        debug!(id = %account.id, "opening account");
        let content = SurfaceContent::for_account(account);
        self.presentation.open_presentation(content);
        self.screen = AppScreen::Detail;
        self.message = None;
    }

    pub fn close_detail(&mut self) {
        self.presentation.close_presentation();
        self.screen = AppScreen::Accounts;
    }

    fn copy(&mut self, field: FieldId) {
        self.message = Some(match self.presentation.copy_field(field, self.clipboard.as_mut()) {
            Ok(()) => format!("Copied {} to clipboard", field.as_str()),
            Err(e) => e.to_string(),
        });
    }

    /// Handle one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.screen {
            AppScreen::Loading => matches!(code, KeyCode::Char('q') | KeyCode::Esc),
            AppScreen::Accounts => match code {
                KeyCode::Char('q') | KeyCode::Esc => true,
                KeyCode::Down | KeyCode::Char('j') => {
                    if !self.accounts.is_empty() {
                        self.selected = (self.selected + 1).min(self.accounts.len() - 1);
                        self.list_state.select(Some(self.selected));
                    }
                    false
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    if self.selected > 0 {
                        self.selected -= 1;
                    }
                    self.list_state.select(Some(self.selected));
                    false
                }
                KeyCode::Enter => {
                    self.open_selected();
                    false
                }
                _ => false,
            },
            AppScreen::Detail => {
                match code {
                    KeyCode::Esc | KeyCode::Char('q') => self.close_detail(),
                    KeyCode::Char('e') => self.copy(FieldId::Email),
                    KeyCode::Char('p') => self.copy(FieldId::Password),
                    KeyCode::Char('c') => self.copy(FieldId::Code),
                    KeyCode::Char('v') => {
                        self.presentation.toggle_visibility();
                    }
                    _ => {}
                }
                false
            }
        }
    }
}
