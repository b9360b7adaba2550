//! Throttle for repeated network-bound actions

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::ShError;
use crate::ports::Clock;
use crate::settings::SettingsState;
use crate::validation::Validator;

/// Rejects an action started again within `window` of its previous start
pub struct Cooldown {
    window: Duration,
    clock: Arc<dyn Clock>,
    started: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl Cooldown {
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { window, clock, started: Mutex::new(HashMap::new()) }
    }

    /// Record a start of `action`. Returns false if it is still cooling down.
    pub fn try_start(&self, action: &str) -> bool {
        let now = self.clock.now();
        let mut started = self.started.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = started.get(action) {
            let elapsed = (now - *previous).to_std().unwrap_or(Duration::ZERO);
            if elapsed < self.window {
                tracing::debug!(action, "Action is cooling down");
                return false;
            }
        }

        started.insert(action.to_string(), now);
        true
    }

    /// Check `validators`, then run `f` unless `action` is cooling down.
    ///
    /// A failed validator does not start the cooldown. `Ok(None)` means the action was skipped.
    pub fn run<T, E, F>(
        &self,
        action: &str,
        settings: &SettingsState,
        validators: &[Validator],
        f: F,
    ) -> std::result::Result<Option<T>, E>
    where
        E: From<ShError>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        for validate in validators {
            validate(settings)?;
        }

        if !self.try_start(action) {
            return Ok(None);
        }

        f().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::Result;
    use crate::validation::{require_instance, require_layer};
    use chrono::TimeZone;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap()))
    }

    #[test]
    fn test_cooldown_per_action() {
        let clock = clock();
        let cooldown = Cooldown::new(Duration::from_secs(2), clock.clone());

        assert!(cooldown.try_start("download"));
        assert!(!cooldown.try_start("download"));
        assert!(cooldown.try_start("login"));

        clock.advance(chrono::Duration::milliseconds(1999));
        assert!(!cooldown.try_start("download"));

        clock.advance(chrono::Duration::milliseconds(1));
        assert!(cooldown.try_start("download"));
    }

    #[test]
    fn test_repeated_run_is_skipped_within_window() {
        let clock = clock();
        let cooldown = Cooldown::new(Duration::from_secs(2), clock.clone());
        let settings = SettingsState::default();
        let mut runs = 0;

        assert_eq!(cooldown.run("cloud-cover", &settings, &[], || { runs += 1; Ok::<_, ShError>(runs) }).unwrap(), Some(1));
        assert_eq!(cooldown.run("cloud-cover", &settings, &[], || { runs += 1; Ok::<_, ShError>(runs) }).unwrap(), None);
        assert_eq!(runs, 1);

        clock.advance(chrono::Duration::seconds(2));
        assert_eq!(cooldown.run("cloud-cover", &settings, &[], || { runs += 1; Ok::<_, ShError>(runs) }).unwrap(), Some(2));
    }

    #[test]
    fn test_failed_validation_does_not_start_cooldown() {
        let cooldown = Cooldown::new(Duration::from_secs(2), clock());
        let mut settings = SettingsState::default();

        let err = cooldown
            .run("download", &settings, &[require_instance, require_layer], || Ok::<_, ShError>(()))
            .unwrap_err();
        assert!(matches!(err, ShError::Validation { .. }));

        settings.instance_id = "abc".to_string();
        settings.layer_id = "TRUE-COLOR".to_string();
        assert_eq!(cooldown.run("download", &settings, &[require_instance, require_layer], || Ok::<_, ShError>(())).unwrap(), Some(()));
    }

    #[test]
    fn test_action_errors_propagate() {
        let cooldown = Cooldown::new(Duration::from_secs(2), clock());
        let result: Result<Option<()>> =
            cooldown.run("login", &SettingsState::default(), &[], || Err(ShError::download("boom")));
        assert!(result.is_err());
    }
}
