// Sleep timer. Polled, not scheduled: one Tick per elapsed second, then one
// Completed. There is at most one next_tick deadline, so a replaced countdown
// never completes.

use std::time::{Duration, Instant};

use crate::error::{MixerError, Result};

const TICK: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownEvent {
    Tick(Duration), // time left when the tick fired
    Completed,
}

#[derive(Clone, Copy, Debug)]
struct Running {
    end: Instant,
    next_tick: Instant,
}

#[derive(Clone, Debug, Default)]
pub struct Countdown {
    slot: Option<Running>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down `minutes`, cancelling any countdown already running.
    /// Returns the initial tick. Zero minutes is rejected and changes nothing.
    pub fn start(&mut self, minutes: u32, now: Instant) -> Result<CountdownEvent> {
        if minutes == 0 {
            return Err(MixerError::InvalidInput("countdown needs at least one minute".into()));
        }
        let end = now + Duration::from_secs(u64::from(minutes) * 60);
        self.slot = Some(Running { end, next_tick: now + TICK });
        Ok(CountdownEvent::Tick(end - now))
    }

    pub fn stop(&mut self) {
        self.slot = None;
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_some()
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.slot
            .map(|r| r.end.saturating_duration_since(now))
            .unwrap_or_default()
    }

    /// Fire every tick that has come due by `now`. A tick that would report no
    /// time left is reported as `Completed` instead, and the countdown goes idle.
    pub fn poll(&mut self, now: Instant) -> Vec<CountdownEvent> {
        let mut events = Vec::new();
        loop {
            let Some(run) = self.slot.as_mut() else { break };
            if run.next_tick > now {
                break;
            }
            let left = run.end.saturating_duration_since(run.next_tick);
            if left.is_zero() {
                self.slot = None;
                events.push(CountdownEvent::Completed);
                break;
            }
            run.next_tick += TICK;
            events.push(CountdownEvent::Tick(left));
        }
        events
    }
}

// M:SS, rounded down
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn zero_minutes_is_rejected_without_side_effects() {
        let mut c = Countdown::new();
        let t0 = Instant::now();
        assert!(matches!(c.start(0, t0), Err(MixerError::InvalidInput(_))));
        assert!(!c.is_running());
        assert!(c.poll(t0 + secs(3600)).is_empty());
    }

    #[test]
    fn one_minute_runs_to_a_single_completion() {
        let mut c = Countdown::new();
        let t0 = Instant::now();
        let mut ticks = vec![c.start(1, t0).unwrap()];
        let mut completions = 0;

        for s in 1..=60 {
            for ev in c.poll(t0 + secs(s)) {
                match ev {
                    CountdownEvent::Tick(_) => ticks.push(ev),
                    CountdownEvent::Completed => completions += 1,
                }
            }
        }

        assert_eq!(completions, 1);
        assert_eq!(ticks.len(), 60);
        assert_eq!(ticks[0], CountdownEvent::Tick(secs(60)));
        assert_eq!(ticks[59], CountdownEvent::Tick(secs(1)));
        assert!(!c.is_running());
        assert!(c.poll(t0 + secs(120)).is_empty());
    }

    #[test]
    fn stop_right_after_start_never_completes() {
        let mut c = Countdown::new();
        let t0 = Instant::now();
        c.start(5, t0).unwrap();
        c.stop();
        c.stop(); // idempotent
        assert!(c.poll(t0 + secs(600)).is_empty());
        assert_eq!(c.remaining(t0), Duration::ZERO);
    }

    #[test]
    fn restart_replaces_previous_deadline() {
        let mut c = Countdown::new();
        let t0 = Instant::now();
        c.start(1, t0).unwrap();
        c.start(2, t0 + secs(30)).unwrap();

        let events = c.poll(t0 + secs(90));
        assert!(!events.contains(&CountdownEvent::Completed));
        assert_eq!(c.remaining(t0 + secs(90)), secs(60));
    }

    #[test]
    fn late_poll_catches_up_tick_by_tick() {
        let mut c = Countdown::new();
        let t0 = Instant::now();
        c.start(1, t0).unwrap();
        let events = c.poll(t0 + Duration::from_millis(3500));
        assert_eq!(
            events,
            vec![
                CountdownEvent::Tick(secs(59)),
                CountdownEvent::Tick(secs(58)),
                CountdownEvent::Tick(secs(57)),
            ]
        );
    }

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_remaining(secs(0)), "0:00");
        assert_eq!(format_remaining(secs(65)), "1:05");
        assert_eq!(format_remaining(Duration::from_millis(59_999)), "0:59");
        assert_eq!(format_remaining(secs(3600)), "60:00");
    }
}
