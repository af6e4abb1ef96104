use time::OffsetDateTime;

use crate::clock::Clock;

/// Length of one code window, in seconds.
pub const WINDOW_SECS: i64 = 30;

/// Number of characters in a displayed code.
pub const CODE_DIGITS: usize = 6;

/// Below this many remaining seconds the countdown is shown as urgent.
pub const URGENT_BELOW_SECS: u32 = 10;

/// Derive the displayed code for `secret` in time window `window`.
///
/// This is a deterministic simulation, not RFC 6238: the seed is the secret's
/// length (in UTF-16 code units) plus the window index, passed through `sin`
/// and scaled to six digits. The rounded magnitude is truncated to six
/// characters and then right-padded with `'0'`, so a small magnitude such as
/// `8851` becomes `"885100"`, not `"008851"`.
pub fn derive_code(secret: &str, window: u64) -> String {
    // summed as floats so huge windows cannot overflow
    let seed = secret.encode_utf16().count() as f64 + window as f64;
    let magnitude = (seed.sin() * 1_000_000.0).abs().round() as u64;

    let mut code: String = magnitude.to_string().chars().take(CODE_DIGITS).collect();
    while code.len() < CODE_DIGITS {
        code.push('0');
    }
    code
}

/// Split a code into two groups for display, e.g. `"123456"` -> `"123-456"`.
pub fn format_code(code: &str) -> String {
    let mid = code.len() / 2;
    match (code.get(..mid), code.get(mid..)) {
        (Some(head), Some(tail)) if !head.is_empty() => format!("{}-{}", head, tail),
        _ => code.to_string(),
    }
}

/// Where "now" falls relative to the 30-second windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowReading {
    /// Complete windows since the Unix epoch.
    pub window: u64,
    /// Seconds left in the current window, in `1..=30`. Exactly 30 at the
    /// instant a window starts.
    pub remaining_secs: u32,
    /// The clock reading this was computed from.
    pub taken_at: OffsetDateTime,
}

impl WindowReading {
    /// Read the window for `instant`. Callers pass in one clock reading so
    /// every value derived in the same tick agrees.
    pub fn at(instant: OffsetDateTime) -> Self {
        // windows before the epoch clamp to window 0
        let secs = instant.unix_timestamp().max(0);
        let window = (secs / WINDOW_SECS) as u64;
        let remaining_secs = (WINDOW_SECS - secs % WINDOW_SECS) as u32;
        Self {
            window,
            remaining_secs,
            taken_at: instant,
        }
    }

    /// Fraction of the window still left, for the progress bar.
    pub fn progress(&self) -> f64 {
        f64::from(self.remaining_secs) / WINDOW_SECS as f64
    }

    pub fn is_urgent(&self) -> bool {
        self.remaining_secs < URGENT_BELOW_SECS
    }
}

/// Window readings from an injected clock. Holds nothing between calls
/// except the clock itself.
pub struct WindowClock<C: Clock> {
    clock: C,
}

impl<C: Clock> WindowClock<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Read the clock once and place that instant in its window.
    pub fn now(&self) -> WindowReading {
        WindowReading::at(self.clock.now())
    }
}
