//! Session configuration.

use std::time::Duration;

/// Configuration for duel sessions handed out by a registry.
#[derive(Debug, Clone)]
pub struct DuelConfig {
    /// Maximum number of items per roster.
    pub max_roster: usize,
    /// How often the background task re-renders the rosters.
    pub refresh_interval: Duration,
    /// Elapsed time after which the one-shot timeout warning is rendered.
    pub warn_after: Duration,
    /// Elapsed time after which the duel times out.
    pub timeout_after: Duration,
    /// Pause after a fight's opening announcement.
    pub intro_pause: Duration,
    /// Pause between narrated blows.
    pub blow_pause: Duration,
    /// Pause between rounds.
    pub round_pause: Duration,
    /// RNG seed for deterministic duels; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            max_roster: 10,
            refresh_interval: Duration::from_secs(15),
            warn_after: Duration::from_secs(25 * 60),
            timeout_after: Duration::from_secs(30 * 60),
            intro_pause: Duration::from_secs(2),
            blow_pause: Duration::from_millis(1500),
            round_pause: Duration::from_secs(4),
            seed: None,
        }
    }
}

impl DuelConfig {
    /// Set the maximum roster size.
    pub fn with_max_roster(mut self, max: usize) -> Self {
        self.max_roster = max;
        self
    }

    /// Set the background refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the elapsed time that triggers the timeout warning.
    pub fn with_warn_after(mut self, warn_after: Duration) -> Self {
        self.warn_after = warn_after;
        self
    }

    /// Set the elapsed time that times the duel out.
    pub fn with_timeout_after(mut self, timeout_after: Duration) -> Self {
        self.timeout_after = timeout_after;
        self
    }

    /// Set the RNG seed for deterministic duels.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Zero out all narration pauses; rounds resolve as fast as the surface
    /// accepts them.
    pub fn without_pacing(mut self) -> Self {
        self.intro_pause = Duration::ZERO;
        self.blow_pause = Duration::ZERO;
        self.round_pause = Duration::ZERO;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = DuelConfig::default();
        assert_eq!(config.max_roster, 10);
        assert_eq!(config.refresh_interval, Duration::from_secs(15));
        assert_eq!(config.warn_after, Duration::from_secs(1500));
        assert_eq!(config.timeout_after, Duration::from_secs(1800));
        assert!(config.seed.is_none());
    }

    #[test]
    fn config_builder_chain() {
        let config = DuelConfig::default()
            .with_max_roster(3)
            .with_refresh_interval(Duration::from_millis(100))
            .with_warn_after(Duration::from_secs(5))
            .with_timeout_after(Duration::from_secs(10))
            .with_seed(99)
            .without_pacing();
        assert_eq!(config.max_roster, 3);
        assert_eq!(config.refresh_interval, Duration::from_millis(100));
        assert_eq!(config.warn_after, Duration::from_secs(5));
        assert_eq!(config.timeout_after, Duration::from_secs(10));
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.blow_pause, Duration::ZERO);
    }
}
