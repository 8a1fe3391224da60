//! Rest timer between sets.

use crate::format::format_clock;
use serde::{Deserialize, Serialize};

/// Rest timer preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RestTimerSettings {
    /// Countdown length a fresh timer starts with.
    pub default_secs: u64,
    /// Amount added or removed per adjustment.
    pub step_secs: u64,
    /// Start the countdown as soon as a set is completed.
    pub auto_start: bool,
    /// Play a sound when the countdown ends.
    pub sound_enabled: bool,
}

impl Default for RestTimerSettings {
    fn default() -> Self {
        Self {
            default_secs: 60,
            step_secs: 15,
            auto_start: false,
            sound_enabled: true,
        }
    }
}

/// Timer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestTimerMode {
    /// Counts down to zero.
    Countdown,
    /// Counts up from zero.
    Stopwatch,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestTick {
    /// The timer is not running.
    Idle,
    /// Still running, with the value now shown.
    Running(u64),
    /// The countdown reached zero and stopped.
    Finished,
}

/// Countdown / stopwatch state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestTimer {
    settings: RestTimerSettings,
    mode: RestTimerMode,
    value: u64,
    initial: u64,
    elapsed: u64,
    running: bool,
}

impl RestTimer {
    /// Create an idle countdown at the configured default.
    pub fn new(settings: RestTimerSettings) -> Self {
        let default = settings.default_secs;
        Self {
            settings,
            mode: RestTimerMode::Countdown,
            value: default,
            initial: default,
            elapsed: 0,
            running: false,
        }
    }

    /// Add one step to the countdown.
    pub fn increase(&mut self) {
        self.value += self.settings.step_secs;
        if !self.running {
            self.initial = self.value;
        }
    }

    /// Remove one step, never going to or below a single step.
    pub fn decrease(&mut self) {
        if self.value > self.settings.step_secs {
            self.value -= self.settings.step_secs;
            if !self.running {
                self.initial = self.value;
            }
        }
    }

    /// Start counting.
    pub fn start(&mut self) {
        if self.mode == RestTimerMode::Countdown {
            self.initial = self.value;
        }
        self.running = true;
    }

    /// Stop counting. A countdown returns to where it started; a stopwatch
    /// keeps its elapsed time.
    pub fn stop(&mut self) {
        self.running = false;
        if self.mode == RestTimerMode::Countdown {
            self.value = self.initial;
        }
    }

    /// Back to the configured default with nothing elapsed.
    pub fn reset(&mut self) {
        self.running = false;
        self.value = self.settings.default_secs;
        self.initial = self.settings.default_secs;
        self.elapsed = 0;
    }

    /// React to a set being ticked off.
    ///
    /// With auto-start on and nothing running, restarts the countdown from
    /// the configured default. Returns whether it started.
    pub fn on_set_completed(&mut self) -> bool {
        if !self.settings.auto_start || self.running {
            return false;
        }
        self.set_mode(RestTimerMode::Countdown);
        self.start();
        true
    }

    /// Switch mode; always resets.
    pub fn set_mode(&mut self, mode: RestTimerMode) {
        self.mode = mode;
        self.reset();
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> RestTick {
        if !self.running {
            return RestTick::Idle;
        }

        match self.mode {
            RestTimerMode::Countdown => {
                if self.value <= 1 {
                    self.value = 0;
                    self.running = false;
                    RestTick::Finished
                } else {
                    self.value -= 1;
                    RestTick::Running(self.value)
                }
            }
            RestTimerMode::Stopwatch => {
                self.elapsed += 1;
                RestTick::Running(self.elapsed)
            }
        }
    }

    /// Value shown for the current mode as `MM:SS`.
    pub fn display(&self) -> String {
        match self.mode {
            RestTimerMode::Countdown => format_clock(self.value),
            RestTimerMode::Stopwatch => format_clock(self.elapsed),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> RestTimerMode {
        self.mode
    }

    /// Remaining countdown seconds.
    pub fn remaining(&self) -> u64 {
        self.value
    }

    /// Stopwatch seconds.
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn settings(&self) -> &RestTimerSettings {
        &self.settings
    }
}

impl Default for RestTimer {
    fn default() -> Self {
        Self::new(RestTimerSettings::default())
    }
}
