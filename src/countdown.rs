use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::otp::{WindowReading, derive_code};

const TICK: Duration = Duration::SECOND;

/// Identifies one `start` of the scheduler. A handle from an earlier start is
/// stale and cannot stop a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownHandle(u64);

#[derive(Debug)]
struct Running {
    handle: CountdownHandle,
    secret: String,
    reading: WindowReading,
    code: String,
    next_tick: OffsetDateTime,
    derivations: u64,
}

/// Recurring one-second trigger that keeps the displayed code and the
/// remaining-seconds label in step with the wall-clock windows.
///
/// The trigger is a deadline checked by `poll`, driven from the event loop.
/// Dropping the deadline in `stop` is all it takes to cancel it.
#[derive(Debug, Default)]
pub struct CountdownScheduler {
    running: Option<Running>,
    next_handle: u64,
}

impl CountdownScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the code for `now` immediately and arm the next tick.
    /// Any earlier session is discarded.
    pub fn start(&mut self, secret: &str, now: OffsetDateTime) -> CountdownHandle {
        self.next_handle += 1;
        let handle = CountdownHandle(self.next_handle);
        let reading = WindowReading::at(now);
        let code = derive_code(secret, reading.window);
        debug!(
            window = reading.window,
            remaining = reading.remaining_secs,
            "countdown started"
        );
        self.running = Some(Running {
            handle,
            secret: secret.to_string(),
            reading,
            code,
            next_tick: next_whole_second(now),
            derivations: 1,
        });
        handle
    }

    /// Cancel the session started with `handle`. Stale handles and repeated
    /// calls are ignored.
    pub fn stop(&mut self, handle: CountdownHandle) {
        if self.running.as_ref().is_some_and(|r| r.handle == handle) {
            debug!("countdown stopped");
            self.running = None;
        }
    }

    /// Run the tick if it is due at `now`. Returns true when it ran.
    pub fn poll(&mut self, now: OffsetDateTime) -> bool {
        let Some(running) = self.running.as_mut() else {
            return false;
        };

        if now < running.next_tick {
            // wall clock stepped backwards past the last tick; re-arm from here
            if running.next_tick - now > TICK {
                running.next_tick = next_whole_second(now);
            }
            return false;
        }

        let reading = WindowReading::at(now);
        if reading.window != running.reading.window {
            running.code = derive_code(&running.secret, reading.window);
            running.derivations += 1;
            debug!(
                from = running.reading.window,
                to = reading.window,
                "window rolled over"
            );
        }
        running.reading = reading;
        // a late tick (suspend, slow loop) is not replayed
        running.next_tick = next_whole_second(now);
        true
    }

    pub fn code(&self) -> Option<&str> {
        self.running.as_ref().map(|r| r.code.as_str())
    }

    pub fn reading(&self) -> Option<WindowReading> {
        self.running.as_ref().map(|r| r.reading)
    }

    /// Codes computed since the last `start`, the initial one included.
    pub fn derivations(&self) -> u64 {
        self.running.as_ref().map_or(0, |r| r.derivations)
    }
}

fn next_whole_second(now: OffsetDateTime) -> OffsetDateTime {
    now - Duration::nanoseconds(i64::from(now.nanosecond())) + TICK
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + Duration::seconds(secs)
    }

    #[test]
    fn test_start_evaluates_immediately() {
        let mut scheduler = CountdownScheduler::new();
        assert_eq!(scheduler.code(), None);

        scheduler.start("ABCDEF", at(30 * 1000 + 12));

        assert_eq!(scheduler.code(), Some("636808"));
        let reading = scheduler.reading().unwrap();
        assert_eq!(reading.window, 1000);
        assert_eq!(reading.remaining_secs, 18);
        assert_eq!(scheduler.derivations(), 1);
    }

    #[test]
    fn test_tick_fires_once_per_second() {
        let mut scheduler = CountdownScheduler::new();
        let start = at(30 * 1000 + 5) + Duration::milliseconds(400);
        scheduler.start("ABCDEF", start);

        // not yet due
        assert!(!scheduler.poll(start + Duration::milliseconds(500)));
        // due at the next whole second
        assert!(scheduler.poll(at(30 * 1000 + 6)));
        assert_eq!(scheduler.reading().unwrap().remaining_secs, 24);
        // already handled this second
        assert!(!scheduler.poll(at(30 * 1000 + 6) + Duration::milliseconds(999)));
    }

    #[test]
    fn test_recomputes_exactly_once_per_rollover() {
        let mut scheduler = CountdownScheduler::new();
        let base = 30 * 1000;
        scheduler.start("ABCDEF", at(base));

        let mut last_remaining = scheduler.reading().unwrap().remaining_secs;
        let mut codes = vec![scheduler.code().unwrap().to_string()];

        // 90 seconds of ticks crosses three window boundaries
        for s in 1..=90 {
            assert!(scheduler.poll(at(base + s)));
            let reading = scheduler.reading().unwrap();
            if reading.remaining_secs == 30 {
                codes.push(scheduler.code().unwrap().to_string());
            } else {
                assert!(reading.remaining_secs < last_remaining);
            }
            last_remaining = reading.remaining_secs;
        }

        assert_eq!(scheduler.derivations(), 4);
        assert_eq!(codes[0], "636808");
        assert_eq!(codes[1], "992862");
        assert_eq!(codes.len(), 4);
    }

    #[test]
    fn test_code_stable_within_window() {
        let mut scheduler = CountdownScheduler::new();
        scheduler.start("JBSWY3DPEHPK3PXP", at(30 * 2000));
        let code = scheduler.code().unwrap().to_string();

        for s in 1..30 {
            scheduler.poll(at(30 * 2000 + s));
            assert_eq!(scheduler.code().unwrap(), code);
        }
        assert_eq!(scheduler.derivations(), 1);
    }

    #[test]
    fn test_late_tick_rederives_without_replay() {
        let mut scheduler = CountdownScheduler::new();
        scheduler.start("ABCDEF", at(30 * 1000 + 1));

        // suspended for five minutes
        assert!(scheduler.poll(at(30 * 1010 + 7)));
        assert_eq!(scheduler.reading().unwrap().window, 1010);
        assert_eq!(scheduler.reading().unwrap().remaining_secs, 23);
        assert_eq!(scheduler.code(), Some(derive_code("ABCDEF", 1010).as_str()));
        assert_eq!(scheduler.derivations(), 2);

        // next tick is one second after the resumed reading
        assert!(!scheduler.poll(at(30 * 1010 + 7) + Duration::milliseconds(10)));
        assert!(scheduler.poll(at(30 * 1010 + 8)));
    }

    #[test]
    fn test_clock_moving_backwards_rearms() {
        let mut scheduler = CountdownScheduler::new();
        scheduler.start("ABCDEF", at(30 * 1000 + 20));

        // clock corrected back by a minute: first poll re-arms, next second ticks
        assert!(!scheduler.poll(at(30 * 998 + 20)));
        assert!(scheduler.poll(at(30 * 998 + 21)));
        assert_eq!(scheduler.reading().unwrap().window, 998);
        assert_eq!(scheduler.code(), Some(derive_code("ABCDEF", 998).as_str()));
    }

    #[test]
    fn test_stop_is_idempotent_and_ignores_stale_handles() {
        let mut scheduler = CountdownScheduler::new();
        let first = scheduler.start("ABCDEF", at(30 * 1000));
        let second = scheduler.start("KRSXG5CTMVRXEZLU", at(30 * 1000));
        assert_ne!(first, second);

        // stale handle leaves the new session running
        scheduler.stop(first);
        assert!(scheduler.code().is_some());
        assert_eq!(
            scheduler.code(),
            Some(derive_code("KRSXG5CTMVRXEZLU", 1000).as_str())
        );

        scheduler.stop(second);
        assert!(scheduler.code().is_none());
        scheduler.stop(second);
        assert!(scheduler.code().is_none());

        // stopped scheduler never ticks
        assert!(!scheduler.poll(at(30 * 1000 + 5)));
        assert_eq!(scheduler.code(), None);
        assert_eq!(scheduler.derivations(), 0);
    }
}
