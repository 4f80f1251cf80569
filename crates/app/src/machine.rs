//! Interaction state machine.
//!
//! A [`Session`] is a plain value. Each event is a pure transition that
//! returns the next session plus the [`Effect`]s the host must run: timers,
//! generator calls and storage writes. The controller runs the effects and
//! feeds their outcomes back as further events.
//!
//! ```text
//! IDLE ──click──▶ SHAKING ──delay──▶ GENERATING_TEXT ──ok──▶ GENERATING_IMAGE ──ok──▶ REVEALED
//!   ▲                                      │ fail                   │ fail              │
//!   │                                      ▼                        ▼                   │
//!   └────────────reset────────────────── ERROR ◀────────────────────┘                   │
//!   └──────────────────────────────────────reset────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use paw_fortune_core::{
    Collection, FortuneData, GeneratedFortune, SidebarWindow, SortOrder, UserProfile,
};

/// Shown when today's three generations are used up.
pub const QUOTA_EXHAUSTED_MESSAGE: &str = "明天再来吧，不然好运都用光了 (每日限抽3次) 🌙";
/// Prefix of every generation failure message.
pub const GENERATION_FAILED_PREFIX: &str = "哎呀！盲盒机走神了，请重试！";
/// Announced when the hidden quota reset fires.
pub const QUOTA_RESET_NOTICE: &str = "🎉 隐藏彩蛋触发！今日额度已重置！";
/// Taps on the error message that reset the daily quota.
pub const ERROR_TAPS_TO_RESET: u8 = 3;

/// Where the box is in its open cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Idle,
    Shaking,
    GeneratingText,
    GeneratingImage,
    Revealed,
    Error,
}

impl AppState {
    /// Whether an open cycle is in flight.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(
            self,
            Self::Shaking | Self::GeneratingText | Self::GeneratingImage
        )
    }

    /// Whether a box click is accepted.
    #[must_use]
    pub const fn accepts_click(self) -> bool {
        matches!(self, Self::Idle | Self::Error)
    }

    /// Caption under the box.
    #[must_use]
    pub const fn status_text(self) -> &'static str {
        match self {
            Self::Shaking => "好运加载中...",
            Self::GeneratingText => "正在掐爪一算...",
            Self::GeneratingImage => "3D打印显灵中...",
            Self::Idle | Self::Revealed | Self::Error => "点击开启今日盲盒",
        }
    }

    /// Upper-case name, e.g. `GENERATING_TEXT`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Shaking => "SHAKING",
            Self::GeneratingText => "GENERATING_TEXT",
            Self::GeneratingImage => "GENERATING_IMAGE",
            Self::Revealed => "REVEALED",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Home,
    Collection,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Wait the shake delay, then send [`Event::ShakeElapsed`].
    StartShake,
    /// Generate fortune text for this profile.
    RequestFortune(UserProfile),
    /// Generate the figurine image.
    RequestImage {
        visual_prompt: String,
        base_label: String,
    },
    /// Save the collection through the fallback cascade.
    PersistCollection,
    IncrementDailyCount,
    ResetDailyCount,
    PersistProfile(UserProfile),
    /// Show a one-off message to the user.
    Announce(&'static str),
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The box was clicked. `quota_available` is today's quota check.
    BoxClicked { quota_available: bool },
    ShakeElapsed,
    FortuneGenerated(FortuneData),
    ImageGenerated {
        image_url: String,
        at: DateTime<Utc>,
    },
    /// A generator call failed with this detail.
    GenerationFailed(String),
    /// "Open another" from the result card.
    Reset,
    /// The visible error message was tapped.
    ErrorTapped,
    /// A history item at this collection index was picked.
    HistorySelected(usize),
    ProfileSaved(UserProfile),
    ProfilePromptOpened,
    ProfilePromptClosed,
    ViewChanged(View),
    SidebarNext,
    SidebarPrev,
    GalleryOrderToggled,
}

impl Event {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BoxClicked { .. } => "box_clicked",
            Self::ShakeElapsed => "shake_elapsed",
            Self::FortuneGenerated(_) => "fortune_generated",
            Self::ImageGenerated { .. } => "image_generated",
            Self::GenerationFailed(_) => "generation_failed",
            Self::Reset => "reset",
            Self::ErrorTapped => "error_tapped",
            Self::HistorySelected(_) => "history_selected",
            Self::ProfileSaved(_) => "profile_saved",
            Self::ProfilePromptOpened => "profile_prompt_opened",
            Self::ProfilePromptClosed => "profile_prompt_closed",
            Self::ViewChanged(_) => "view_changed",
            Self::SidebarNext => "sidebar_next",
            Self::SidebarPrev => "sidebar_prev",
            Self::GalleryOrderToggled => "gallery_order_toggled",
        }
    }
}

/// Result of applying one event.
#[derive(Debug, Clone)]
#[must_use]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl Transition {
    const fn none(session: Session) -> Self {
        Self {
            session,
            effects: Vec::new(),
        }
    }

    fn with(session: Session, effects: impl Into<Vec<Effect>>) -> Self {
        Self {
            session,
            effects: effects.into(),
        }
    }
}

/// Everything the interaction layer knows.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: AppState,
    view: View,
    profile: Option<UserProfile>,
    collection: Collection,
    current: Option<GeneratedFortune>,
    pending: Option<FortuneData>,
    error: Option<String>,
    error_taps: u8,
    profile_prompt_open: bool,
    sidebar: SidebarWindow,
    gallery_order: SortOrder,
}

impl Session {
    /// A fresh session around previously saved data.
    #[must_use]
    pub fn restore(profile: Option<UserProfile>, collection: Collection) -> Self {
        Self {
            profile,
            collection,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn state(&self) -> AppState {
        self.state
    }

    #[must_use]
    pub const fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub const fn collection(&self) -> &Collection {
        &self.collection
    }

    /// The fortune on the result card.
    #[must_use]
    pub const fn current(&self) -> Option<&GeneratedFortune> {
        self.current.as_ref()
    }

    /// Visible error message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn error_taps(&self) -> u8 {
        self.error_taps
    }

    #[must_use]
    pub const fn profile_prompt_open(&self) -> bool {
        self.profile_prompt_open
    }

    #[must_use]
    pub const fn sidebar(&self) -> SidebarWindow {
        self.sidebar
    }

    #[must_use]
    pub const fn gallery_order(&self) -> SortOrder {
        self.gallery_order
    }

    /// Caption under the box.
    #[must_use]
    pub const fn status_text(&self) -> &'static str {
        self.state.status_text()
    }

    /// Apply any event.
    pub fn apply(self, event: Event) -> Transition {
        match event {
            Event::BoxClicked { quota_available } => self.click(quota_available),
            Event::ShakeElapsed => self.shake_elapsed(),
            Event::FortuneGenerated(data) => self.fortune_generated(data),
            Event::ImageGenerated { image_url, at } => self.image_generated(image_url, at),
            Event::GenerationFailed(detail) => self.generation_failed(&detail),
            Event::Reset => self.reset(),
            Event::ErrorTapped => self.error_tap(),
            Event::HistorySelected(index) => self.select_history(index),
            Event::ProfileSaved(profile) => self.save_profile(profile),
            Event::ProfilePromptOpened => self.open_profile_prompt(),
            Event::ProfilePromptClosed => self.close_profile_prompt(),
            Event::ViewChanged(view) => self.show_view(view),
            Event::SidebarNext => self.sidebar_next(),
            Event::SidebarPrev => self.sidebar_prev(),
            Event::GalleryOrderToggled => self.toggle_gallery_order(),
        }
    }

    /// Box click. Only IDLE and ERROR accept it.
    ///
    /// The quota is checked first, then the profile; only then does the
    /// box start shaking.
    pub fn click(mut self, quota_available: bool) -> Transition {
        if !self.state.accepts_click() {
            return Transition::none(self);
        }
        if !quota_available {
            self.show_error(QUOTA_EXHAUSTED_MESSAGE.to_string());
            return Transition::none(self);
        }
        if self.profile.is_none() {
            self.profile_prompt_open = true;
            return Transition::none(self);
        }
        self.state = AppState::Shaking;
        self.error = None;
        self.current = None;
        self.pending = None;
        Transition::with(self, [Effect::StartShake])
    }

    /// Shake delay over: ask for fortune text.
    pub fn shake_elapsed(mut self) -> Transition {
        if self.state != AppState::Shaking {
            return Transition::none(self);
        }
        let Some(profile) = self.profile.clone() else {
            return self.fail("profile missing");
        };
        self.state = AppState::GeneratingText;
        Transition::with(self, [Effect::RequestFortune(profile)])
    }

    /// Text arrived: ask for the image.
    pub fn fortune_generated(mut self, data: FortuneData) -> Transition {
        if self.state != AppState::GeneratingText {
            return Transition::none(self);
        }
        let effect = Effect::RequestImage {
            visual_prompt: data.visual_prompt.clone(),
            base_label: data.base_label.clone(),
        };
        self.state = AppState::GeneratingImage;
        self.pending = Some(data);
        Transition::with(self, [effect])
    }

    /// Image arrived: reveal, record and count the fortune.
    pub fn image_generated(mut self, image_url: String, at: DateTime<Utc>) -> Transition {
        if self.state != AppState::GeneratingImage {
            return Transition::none(self);
        }
        let Some(data) = self.pending.take() else {
            return self.fail("fortune text missing");
        };
        let fortune = GeneratedFortune::new(data, image_url, at);
        self.collection.prepend(fortune.clone());
        self.current = Some(fortune);
        self.state = AppState::Revealed;
        Transition::with(
            self,
            [Effect::PersistCollection, Effect::IncrementDailyCount],
        )
    }

    /// A generator call failed.
    pub fn generation_failed(self, detail: &str) -> Transition {
        if !matches!(
            self.state,
            AppState::GeneratingText | AppState::GeneratingImage
        ) {
            return Transition::none(self);
        }
        self.fail(detail)
    }

    /// Back to the closed box.
    pub fn reset(mut self) -> Transition {
        if self.state.is_busy() {
            return Transition::none(self);
        }
        self.current = None;
        self.error = None;
        self.state = AppState::Idle;
        Transition::none(self)
    }

    /// Tap on the visible error. The third tap resets today's quota.
    pub fn error_tap(mut self) -> Transition {
        if self.error.is_none() {
            return Transition::none(self);
        }
        self.error_taps = self.error_taps.saturating_add(1);
        if self.error_taps < ERROR_TAPS_TO_RESET {
            return Transition::none(self);
        }
        self.error = None;
        self.error_taps = 0;
        Transition::with(
            self,
            [Effect::ResetDailyCount, Effect::Announce(QUOTA_RESET_NOTICE)],
        )
    }

    /// Show a saved fortune on the result card.
    pub fn select_history(mut self, index: usize) -> Transition {
        if self.state.is_busy() {
            return Transition::none(self);
        }
        let Some(fortune) = self.collection.get(index).cloned() else {
            return Transition::none(self);
        };
        self.current = Some(fortune);
        self.state = AppState::Revealed;
        self.error = None;
        self.view = View::Home;
        Transition::none(self)
    }

    /// Replace and persist the profile; closes the prompt.
    pub fn save_profile(mut self, profile: UserProfile) -> Transition {
        self.profile = Some(profile.clone());
        self.profile_prompt_open = false;
        Transition::with(self, [Effect::PersistProfile(profile)])
    }

    pub fn open_profile_prompt(mut self) -> Transition {
        self.profile_prompt_open = true;
        Transition::none(self)
    }

    pub fn close_profile_prompt(mut self) -> Transition {
        self.profile_prompt_open = false;
        Transition::none(self)
    }

    /// Switch screens. The gallery cannot be opened mid-cycle.
    pub fn show_view(mut self, view: View) -> Transition {
        if view == View::Collection && self.state.is_busy() {
            return Transition::none(self);
        }
        self.view = view;
        Transition::none(self)
    }

    pub fn sidebar_next(mut self) -> Transition {
        self.sidebar.next(self.collection.len());
        Transition::none(self)
    }

    pub fn sidebar_prev(mut self) -> Transition {
        self.sidebar.prev();
        Transition::none(self)
    }

    pub fn toggle_gallery_order(mut self) -> Transition {
        self.gallery_order = self.gallery_order.toggled();
        Transition::none(self)
    }

    fn fail(mut self, detail: &str) -> Transition {
        self.pending = None;
        self.state = AppState::Error;
        self.show_error(format!("{GENERATION_FAILED_PREFIX}{detail}"));
        Transition::none(self)
    }

    fn show_error(&mut self, message: String) {
        self.error = Some(message);
        self.error_taps = 0;
    }
}
