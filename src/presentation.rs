use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::ack::AcknowledgementTimer;
use crate::clipboard::{ClipboardError, ClipboardWriter};
use crate::clock::Clock;
use crate::countdown::{CountdownHandle, CountdownScheduler};
use crate::model::{Account, FieldId};
use crate::otp::WindowClock;

const MASK: &str = "••••••••••••";

/// Per-surface password masking. Starts masked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SecretVisibility {
    visible: bool,
}

impl SecretVisibility {
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn mask<'a>(&self, value: &'a str) -> &'a str {
        if self.visible { value } else { MASK }
    }
}

/// What an open surface shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceContent {
    pub label: String,
    pub password: Option<String>,
    pub secret: Option<String>,
}

impl SurfaceContent {
    pub fn for_account(account: &Account) -> Self {
        Self {
            label: account.email.clone(),
            password: account.password.clone(),
            secret: account
                .can_show_code()
                .then(|| account.otp_secret.clone())
                .flatten(),
        }
    }
}

/// Snapshot handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub label: String,
    pub code: Option<String>,
    pub remaining_secs: u32,
    pub progress: f64,
    pub urgent: bool,
    pub acknowledged: HashMap<FieldId, bool>,
    pub visible: bool,
    pub password_display: Option<String>,
}

impl RenderState {
    pub fn is_acknowledged(&self, field: FieldId) -> bool {
        self.acknowledged.get(&field).copied().unwrap_or(false)
    }
}

/// Why a copy request wrote nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyError {
    Closed,
    NothingToCopy(FieldId),
    Clipboard(ClipboardError),
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "No account is open"),
            Self::NothingToCopy(field) => write!(f, "Nothing to copy for {}", field.as_str()),
            Self::Clipboard(e) => write!(f, "{}", e),
        }
    }
}

impl Error for CopyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Clipboard(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct OpenSurface {
    content: SurfaceContent,
    countdown: Option<CountdownHandle>,
    /// Instant of the latest frame; everything rendered is as of this.
    frame_at: OffsetDateTime,
}

/// One credential-detail session: the code countdown, the copy
/// acknowledgements and the visibility flag, all torn down together.
pub struct Presentation<C: Clock> {
    windows: WindowClock<C>,
    surface: Option<OpenSurface>,
    scheduler: CountdownScheduler,
    acks: AcknowledgementTimer<FieldId>,
    visibility: SecretVisibility,
}

impl<C: Clock> Presentation<C> {
    pub fn new(clock: C) -> Self {
        Self {
            windows: WindowClock::new(clock),
            surface: None,
            scheduler: CountdownScheduler::new(),
            acks: AcknowledgementTimer::new(),
            visibility: SecretVisibility::default(),
        }
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    /// Open a fresh surface. Whatever was open before is closed first, so
    /// rebinding to another credential restarts from clean state.
    pub fn open_presentation(&mut self, content: SurfaceContent) {
        self.close_presentation();

        let frame_at = self.windows.now().taken_at;
        let countdown = content
            .secret
            .as_deref()
            .map(|secret| self.scheduler.start(secret, frame_at));
        info!(label = %content.label, with_code = countdown.is_some(), "presentation opened");
        self.surface = Some(OpenSurface {
            content,
            countdown,
            frame_at,
        });
    }

    /// Stop the countdown and cancel every pending acknowledgement before
    /// returning. Safe to call when nothing is open.
    pub fn close_presentation(&mut self) {
        let Some(surface) = self.surface.take() else {
            return;
        };
        if let Some(handle) = surface.countdown {
            debug!(derivations = self.scheduler.derivations(), "stopping countdown");
            self.scheduler.stop(handle);
        }
        debug!(pending = self.acks.pending(), "cancelling acknowledgements");
        self.acks.cancel_all();
        self.visibility = SecretVisibility::default();
        info!(label = %surface.content.label, "presentation closed");
    }

    /// Advance timers against a single clock reading.
    pub fn tick(&mut self) {
        if self.surface.is_none() {
            return;
        }
        let now = self.windows.now().taken_at;
        self.advance_to(now);
    }

    /// Move the open surface to the frame at `now`.
    fn advance_to(&mut self, now: OffsetDateTime) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.frame_at = now;
        self.scheduler.poll(now);
        for field in self.acks.expire(now) {
            debug!(field = field.as_str(), "acknowledgement expired");
        }
    }

    pub fn toggle_visibility(&mut self) -> Option<bool> {
        self.surface.as_ref()?;
        let visible = self.visibility.toggle();
        debug!(visible, "visibility toggled");
        Some(visible)
    }

    /// Copy `text` and acknowledge `field` as of the current frame if the
    /// write succeeds. A failed write leaves the surface as it was.
    pub fn request_copy(
        &mut self,
        field: FieldId,
        text: &str,
        clipboard: &mut dyn ClipboardWriter,
    ) -> Result<(), CopyError> {
        let frame_at = self.surface.as_ref().ok_or(CopyError::Closed)?.frame_at;
        match clipboard.write_text(text) {
            Ok(()) => {
                self.acks.acknowledge(field, frame_at);
                debug!(field = field.as_str(), "copied");
                Ok(())
            }
            Err(e) => {
                warn!(field = field.as_str(), "copy failed: {}", e);
                Err(CopyError::Clipboard(e))
            }
        }
    }

    /// Copy the current value of `field` from the open surface. Fields with
    /// no value (no password, no code) are not copied.
    pub fn copy_field(
        &mut self,
        field: FieldId,
        clipboard: &mut dyn ClipboardWriter,
    ) -> Result<(), CopyError> {
        if self.surface.is_none() {
            return Err(CopyError::Closed);
        }
        // bring the code up to date before reading it
        let now = self.windows.now().taken_at;
        self.advance_to(now);

        let text = match (&self.surface, field) {
            (Some(s), FieldId::Email) => Some(s.content.label.clone()),
            (Some(s), FieldId::Password) => s.content.password.clone(),
            (Some(_), FieldId::Code) => self.scheduler.code().map(String::from),
            (None, _) => None,
        };
        let text = text.ok_or(CopyError::NothingToCopy(field))?;
        self.request_copy(field, &text, clipboard)
    }

    /// Snapshot of the open surface as of its latest frame. Reads no clock.
    pub fn render_state(&self) -> Option<RenderState> {
        let surface = self.surface.as_ref()?;
        let reading = self.scheduler.reading();
        let acknowledged = FieldId::ALL
            .iter()
            .map(|field| (*field, self.acks.is_acknowledged(*field, surface.frame_at)))
            .collect();

        Some(RenderState {
            label: surface.content.label.clone(),
            code: self.scheduler.code().map(String::from),
            remaining_secs: reading.map_or(0, |r| r.remaining_secs),
            progress: reading.map_or(0.0, |r| r.progress()),
            urgent: reading.is_some_and(|r| r.is_urgent()),
            acknowledged,
            visible: self.visibility.is_visible(),
            password_display: surface
                .content
                .password
                .as_deref()
                .map(|p| self.visibility.mask(p).to_string()),
        })
    }
}
