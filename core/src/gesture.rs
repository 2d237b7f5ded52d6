//! Pointer gestures that open the message detail drawer.

use std::time::{Duration, Instant};

pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(500);
pub const DEFAULT_DOUBLE_CLICK: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressState<K> {
    Idle,
    Pressing { target: K, since: Instant },
    Fired(K),
    Cancelled,
}

/// Long-press recogniser: `Idle -> Pressing -> Fired | Cancelled`.
///
/// The caller arms a timer on press and calls [`LongPress::poll`] when it
/// expires. A release before that moves to `Cancelled`, so the stale timer
/// does nothing.
#[derive(Debug, Clone)]
pub struct LongPress<K> {
    threshold: Duration,
    state: PressState<K>,
}

impl<K: Clone + PartialEq> LongPress<K> {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            state: PressState::Idle,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn state(&self) -> &PressState<K> {
        &self.state
    }

    pub fn press(&mut self, target: K, at: Instant) {
        self.state = PressState::Pressing { target, since: at };
    }

    /// Returns true if this release cancelled a press in progress.
    pub fn release(&mut self) -> bool {
        match self.state {
            PressState::Pressing { .. } => {
                self.state = PressState::Cancelled;
                true
            }
            _ => {
                self.state = PressState::Idle;
                false
            }
        }
    }

    /// Fire once the press has been held for the threshold.
    pub fn poll(&mut self, now: Instant) -> Option<K> {
        let PressState::Pressing { target, since } = &self.state else {
            return None;
        };
        if now.saturating_duration_since(*since) < self.threshold {
            return None;
        }
        let target = target.clone();
        self.state = PressState::Fired(target.clone());
        Some(target)
    }
}

impl<K: Clone + PartialEq> Default for LongPress<K> {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_PRESS)
    }
}

/// Second click on the same target within the window.
#[derive(Debug, Clone)]
pub struct DoubleClick<K> {
    window: Duration,
    last: Option<(K, Instant)>,
}

impl<K: PartialEq> DoubleClick<K> {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn click(&mut self, target: K, at: Instant) -> bool {
        let is_double = matches!(
            &self.last,
            Some((previous, when))
                if *previous == target && at.saturating_duration_since(*when) <= self.window
        );
        self.last = if is_double { None } else { Some((target, at)) };
        is_double
    }
}

impl<K: PartialEq> Default for DoubleClick<K> {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_CLICK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_long_press_fires_once_after_threshold() {
        let t0 = Instant::now();
        let mut press = LongPress::default();
        press.press(7usize, t0);

        assert_eq!(press.poll(t0 + ms(200)), None);
        assert_eq!(press.poll(t0 + ms(500)), Some(7));
        assert_eq!(press.state(), &PressState::Fired(7));
        assert_eq!(press.poll(t0 + ms(900)), None);

        assert!(!press.release());
        assert_eq!(press.state(), &PressState::Idle);
    }

    #[test]
    fn test_release_cancels_stale_timer() {
        let t0 = Instant::now();
        let mut press = LongPress::new(ms(500));
        press.press("m1", t0);
        assert!(press.release());
        assert_eq!(press.state(), &PressState::Cancelled);
        assert_eq!(press.poll(t0 + ms(600)), None);
    }

    #[test]
    fn test_new_press_replaces_previous_target() {
        let t0 = Instant::now();
        let mut press = LongPress::new(ms(500));
        press.press(1, t0);
        press.press(2, t0 + ms(300));
        assert_eq!(press.poll(t0 + ms(600)), None);
        assert_eq!(press.poll(t0 + ms(800)), Some(2));
    }

    #[test]
    fn test_double_click_window_and_target() {
        let t0 = Instant::now();
        let mut clicks = DoubleClick::new(ms(400));

        assert!(!clicks.click(1, t0));
        assert!(clicks.click(1, t0 + ms(250)));
        // Third click starts over.
        assert!(!clicks.click(1, t0 + ms(300)));

        assert!(!clicks.click(2, t0 + ms(350)));
        assert!(!clicks.click(2, t0 + ms(1000)));

        assert!(!clicks.click(3, t0 + ms(1100)));
        assert!(!clicks.click(4, t0 + ms(1200)));
    }
}
