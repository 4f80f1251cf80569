//! Runs state-machine effects against storage, the generator and the clock.
//!
//! Events are processed one at a time to completion. Effects that produce a
//! follow-up event (the shake timer, generator calls) queue it, so a single
//! box click drives the whole open cycle before `dispatch` returns.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::clock::Clock;
use crate::generator::FortuneGenerator;
use crate::machine::{AppState, Effect, Event, Session};
use crate::persistence::{Persistence, SaveOutcome};
use crate::storage::KeyValueStore;

/// Default time the box shakes before generation starts.
pub const DEFAULT_SHAKE_DELAY: Duration = Duration::from_millis(1500);

/// What happened while handling one dispatched event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Every state entered, in order. Empty if the state never changed.
    pub states: Vec<AppState>,
    /// Messages to show the user once.
    pub notices: Vec<&'static str>,
    /// Result of the last collection save, if one ran.
    pub saved: Option<SaveOutcome>,
}

type Observer = Box<dyn FnMut(&Session) + Send>;

/// Owns the session and executes its effects.
pub struct Controller<S, G, C> {
    session: Session,
    persistence: Persistence<S, C>,
    generator: G,
    shake_delay: Duration,
    observer: Option<Observer>,
}

impl<S, G, C> std::fmt::Debug for Controller<S, G, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("state", &self.session.state())
            .field("shake_delay", &self.shake_delay)
            .finish_non_exhaustive()
    }
}

impl<S, G, C> Controller<S, G, C>
where
    S: KeyValueStore,
    G: FortuneGenerator,
    C: Clock,
{
    /// Start a session from whatever profile and collection are stored.
    #[must_use]
    pub fn new(persistence: Persistence<S, C>, generator: G, shake_delay: Duration) -> Self {
        let profile = persistence.load_profile();
        let collection = persistence.load_collection();
        debug!(
            has_profile = profile.is_some(),
            collection = collection.len(),
            "Session restored"
        );
        Self {
            session: Session::restore(profile, collection),
            persistence,
            generator,
            shake_delay,
            observer: None,
        }
    }

    /// Call `observer` every time the state changes.
    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(&Session) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn persistence(&self) -> &Persistence<S, C> {
        &self.persistence
    }

    pub const fn persistence_mut(&mut self) -> &mut Persistence<S, C> {
        &mut self.persistence
    }

    /// Click the box, checking today's quota first.
    pub async fn click(&mut self) -> Report {
        let quota_available = self.persistence.check_daily_limit();
        self.dispatch(Event::BoxClicked { quota_available }).await
    }

    /// Apply `event` and every event its effects lead to.
    #[instrument(skip_all, fields(event = event.name()))]
    pub async fn dispatch(&mut self, event: Event) -> Report {
        let mut report = Report::default();
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let before = self.session.state();
            let transition = std::mem::take(&mut self.session).apply(event);
            self.session = transition.session;

            let after = self.session.state();
            if after != before {
                debug!(from = %before, to = %after, "State changed");
                report.states.push(after);
                if let Some(observer) = self.observer.as_mut() {
                    observer(&self.session);
                }
            }

            for effect in transition.effects {
                if let Some(next) = self.run(effect, &mut report).await {
                    queue.push_back(next);
                }
            }
        }

        report
    }

    async fn run(&mut self, effect: Effect, report: &mut Report) -> Option<Event> {
        match effect {
            Effect::StartShake => {
                sleep(self.shake_delay).await;
                Some(Event::ShakeElapsed)
            }
            Effect::RequestFortune(profile) => {
                match self.generator.generate_fortune(&profile).await {
                    Ok(data) => Some(Event::FortuneGenerated(data)),
                    Err(e) => {
                        warn!(error = %e, "Fortune text generation failed");
                        Some(Event::GenerationFailed(e.to_string()))
                    }
                }
            }
            Effect::RequestImage {
                visual_prompt,
                base_label,
            } => match self
                .generator
                .generate_image(&visual_prompt, &base_label)
                .await
            {
                Ok(image_url) => Some(Event::ImageGenerated {
                    image_url,
                    at: self.persistence.clock().now(),
                }),
                Err(e) => {
                    warn!(error = %e, "Image generation failed");
                    Some(Event::GenerationFailed(e.to_string()))
                }
            },
            Effect::PersistCollection => {
                report.saved = Some(self.persistence.save_collection(self.session.collection()));
                None
            }
            Effect::IncrementDailyCount => {
                self.persistence.increment_daily_count();
                None
            }
            Effect::ResetDailyCount => {
                self.persistence.reset_daily_count();
                None
            }
            Effect::PersistProfile(profile) => {
                self.persistence.save_profile(&profile);
                None
            }
            Effect::Announce(message) => {
                info!(message, "Notice");
                report.notices.push(message);
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Utc};
    use paw_fortune_core::{Animal, ChineseZodiac, FortuneData, ProfileForm, Rarity, UserProfile};

    use super::*;
    use crate::clock::ManualClock;
    use crate::generator::GenerationError;
    use crate::machine::{QUOTA_EXHAUSTED_MESSAGE, QUOTA_RESET_NOTICE};
    use crate::storage::MemoryStore;

    struct Scripted {
        fail_image: bool,
    }

    impl FortuneGenerator for Scripted {
        async fn generate_fortune(
            &self,
            _profile: &UserProfile,
        ) -> Result<FortuneData, GenerationError> {
            Ok(FortuneData {
                animal: Animal::Dog,
                title: "夜跑达人".into(),
                action_description: "戴头灯夜跑的哈士奇".into(),
                fortune_quote: "坚持就是胜利".into(),
                base_label: "RUN".into(),
                visual_prompt: "husky running at night".into(),
                rarity: Rarity::Rare,
            })
        }

        async fn generate_image(
            &self,
            _visual_prompt: &str,
            _base_label: &str,
        ) -> Result<String, GenerationError> {
            if self.fail_image {
                Err(GenerationError::Other("No image generated".into()))
            } else {
                Ok("data:image/png;base64,AAAA".into())
            }
        }
    }

    fn clock() -> ManualClock {
        ManualClock::new(
            DateTime::parse_from_rfc3339("2026-10-17T08:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    fn profile() -> UserProfile {
        ProfileForm {
            month: "1".into(),
            day: "20".into(),
            chinese_zodiac: ChineseZodiac::Horse,
            ..ProfileForm::default()
        }
        .submit()
        .unwrap()
    }

    fn controller(fail_image: bool) -> Controller<MemoryStore, Scripted, ManualClock> {
        Controller::new(
            Persistence::with_clock(MemoryStore::unbounded(), clock()),
            Scripted { fail_image },
            DEFAULT_SHAKE_DELAY,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_runs_full_cycle() {
        let mut c = controller(false);
        c.dispatch(Event::ProfileSaved(profile())).await;

        let started = tokio::time::Instant::now();
        let report = c.click().await;
        assert!(started.elapsed() >= DEFAULT_SHAKE_DELAY);
        assert_eq!(
            report.states,
            vec![
                AppState::Shaking,
                AppState::GeneratingText,
                AppState::GeneratingImage,
                AppState::Revealed,
            ]
        );
        assert_eq!(report.saved, Some(SaveOutcome::Stored { items: 1, tier: 10 }));

        let session = c.session();
        let current = session.current().unwrap();
        assert_eq!(current.data.title, "夜跑达人");
        assert_eq!(current.timestamp, c.persistence().clock().now().timestamp_millis());
        assert_eq!(session.collection().first(), Some(current));
        assert_eq!(c.persistence().daily_usage().count, 1);
        assert_eq!(c.persistence().load_collection().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_image_failure_does_not_count() {
        let mut c = controller(true);
        c.dispatch(Event::ProfileSaved(profile())).await;
        let report = c.click().await;
        assert_eq!(report.states.last(), Some(&AppState::Error));
        assert_eq!(
            c.session().error(),
            Some("哎呀！盲盒机走神了，请重试！No image generated")
        );
        assert_eq!(c.persistence().daily_usage().count, 0);
        assert!(c.session().collection().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_exhausted_then_hidden_reset() {
        let mut c = controller(false);
        c.dispatch(Event::ProfileSaved(profile())).await;
        for _ in 0..3 {
            c.click().await;
            c.dispatch(Event::Reset).await;
        }

        let report = c.click().await;
        assert!(report.states.is_empty());
        assert_eq!(c.session().error(), Some(QUOTA_EXHAUSTED_MESSAGE));

        c.dispatch(Event::ErrorTapped).await;
        c.dispatch(Event::ErrorTapped).await;
        assert!(!c.persistence().check_daily_limit());
        let report = c.dispatch(Event::ErrorTapped).await;
        assert_eq!(report.notices, vec![QUOTA_RESET_NOTICE]);
        assert!(c.persistence().check_daily_limit());
        assert_eq!(c.session().error(), None);
    }

    #[tokio::test]
    async fn test_restores_saved_state() {
        let mut c = controller(false);
        c.dispatch(Event::ProfileSaved(profile())).await;
        let store = c.persistence().store().clone();

        let restored = Controller::new(
            Persistence::with_clock(store, clock()),
            Scripted { fail_image: false },
            Duration::ZERO,
        );
        assert_eq!(restored.session().profile(), Some(&profile()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_sees_each_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut c = controller(false).with_observer(move |s| {
            sink.lock().unwrap().push((s.state(), s.status_text()));
        });
        c.dispatch(Event::ProfileSaved(profile())).await;
        c.click().await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen.first(), Some(&(AppState::Shaking, "好运加载中...")));
        assert_eq!(seen.get(1), Some(&(AppState::GeneratingText, "正在掐爪一算...")));
    }
}
