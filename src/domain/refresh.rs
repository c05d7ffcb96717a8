//! Refresh scheduling state for the dashboard loop.
//!
//! Lifecycle: `new` → `tick(now)` on every loop iteration → refresh when the
//! decision says so. The first tick always refreshes. Afterwards a refresh is
//! due when auto refresh is on and the interval has elapsed, or when one was
//! requested manually.

use chrono::{DateTime, TimeDelta, Utc};

pub const DEFAULT_REFRESH_SECS: i64 = 60;
pub const MIN_REFRESH_SECS: i64 = 10;
pub const MAX_REFRESH_SECS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    pub auto_refresh: bool,
    pub interval: TimeDelta,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            auto_refresh: false,
            interval: TimeDelta::seconds(DEFAULT_REFRESH_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    Refresh,
    /// Nothing to do yet. Carries the time until the next scheduled refresh,
    /// or `None` when only a manual request can trigger one.
    Wait(Option<TimeDelta>),
}

#[derive(Debug, Clone)]
pub struct RefreshDriver {
    settings: RefreshSettings,
    last_refresh: Option<DateTime<Utc>>,
    manual_requested: bool,
}

impl RefreshDriver {
    pub fn new(settings: RefreshSettings) -> Self {
        Self {
            settings,
            last_refresh: None,
            manual_requested: false,
        }
    }

    pub fn settings(&self) -> RefreshSettings {
        self.settings
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    pub fn request_refresh(&mut self) {
        self.manual_requested = true;
    }

    /// Decide whether to refresh at `now`, recording it if so.
    pub fn tick(&mut self, now: DateTime<Utc>) -> RefreshDecision {
        let decision = match self.last_refresh {
            None => RefreshDecision::Refresh,
            Some(_) if self.manual_requested => RefreshDecision::Refresh,
            Some(last) if self.settings.auto_refresh => {
                let due = last + self.settings.interval;
                if now >= due {
                    RefreshDecision::Refresh
                } else {
                    RefreshDecision::Wait(Some(due - now))
                }
            }
            Some(_) => RefreshDecision::Wait(None),
        };

        if decision == RefreshDecision::Refresh {
            self.last_refresh = Some(now);
            self.manual_requested = false;
        }
        decision
    }
}
