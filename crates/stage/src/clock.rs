//! Frame-interval pacing for a channel driver.
//!
//! The clock hands out a monotonic sequence of tick deadlines at the
//! channel's frame rate. A tick that misses its deadline is reported as an
//! overrun and the sequence realigns to now instead of bursting to catch
//! up, so one slow tick costs exactly the frames it covered.

use std::thread;
use std::time::{Duration, Instant};

use fc_common::FormatDesc;

pub struct ChannelClock {
    interval: Duration,
    deadline: Instant,
}

impl ChannelClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: Instant::now() + interval,
        }
    }

    pub fn for_format(format: &FormatDesc) -> Self {
        Self::new(format.frame_interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until the next tick deadline. Returns how late the caller
    /// was if the previous tick overran its interval.
    pub fn wait_for_tick(&mut self) -> Option<Duration> {
        let now = Instant::now();
        let overrun = if now <= self.deadline {
            thread::sleep(self.deadline - now);
            None
        } else {
            let late = now - self.deadline;
            self.deadline = now;
            Some(late)
        };
        self.deadline += self.interval;
        overrun
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_common::VideoFormat;

    #[test]
    fn interval_follows_format() {
        let clock = ChannelClock::for_format(&FormatDesc::new(VideoFormat::Pal));
        assert_eq!(clock.interval(), Duration::from_millis(40));

        let clock = ChannelClock::for_format(&FormatDesc::new(VideoFormat::Hd1080p50));
        assert_eq!(clock.interval(), Duration::from_millis(20));
    }

    #[test]
    fn prompt_ticks_do_not_overrun() {
        let mut clock = ChannelClock::new(Duration::from_millis(2));
        for _ in 0..3 {
            assert!(clock.wait_for_tick().is_none());
        }
    }

    #[test]
    fn ticks_pace_to_the_interval() {
        let mut clock = ChannelClock::new(Duration::from_millis(2));
        let start = Instant::now();
        for _ in 0..5 {
            clock.wait_for_tick();
        }
        assert!(start.elapsed() >= Duration::from_millis(8));
    }

    #[test]
    fn slow_tick_reports_overrun_then_recovers() {
        let mut clock = ChannelClock::new(Duration::from_millis(1));
        clock.wait_for_tick();
        thread::sleep(Duration::from_millis(10));

        let late = clock.wait_for_tick().expect("should have overrun");
        assert!(late >= Duration::from_millis(5));
        // Realigned: the next tick is on time again.
        assert!(clock.wait_for_tick().is_none());
    }
}
