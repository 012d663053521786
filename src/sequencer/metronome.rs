// Metronome - Playback controller
//
// Single owner of the session state. Start/stop create and discard the
// PlaybackState, wire the tick source to the scheduler and drive the
// visual loop. The tick thread and the UI share the state behind one mutex.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
#[cfg(test)]
use std::time::Instant;

use ringbuf::traits::Producer;

use crate::audio::AudioError;
use crate::audio::timing::AudioClock;
use crate::audio::trigger::SoundTrigger;
use crate::connection::wake_lock::{SystemWakeLock, WakeLock};
use crate::messaging::channels::EventProducer;
use crate::messaging::event::MetronomeEvent;
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::settings::store::SettingsStore;
use crate::settings::types::{AccentKey, AccentProfiles, ProfileField};
use crate::sequencer::pattern::AccentLevel;
use crate::sequencer::scheduler::LookAheadScheduler;
use crate::sequencer::sequence::SequenceConfig;
use crate::sequencer::session_timer::SessionTimer;
use crate::sequencer::tap_tempo::{TapResult, TapTempo};
use crate::sequencer::tick_source::{RepeatingTask, TICK_INTERVAL, ThreadTicker};
use crate::sequencer::timeline::StepMode;
use crate::sequencer::transport::{PlaybackState, TransportState};
use crate::sequencer::visual::{FrameOutcome, StepVisual, VisualSync};

/// Metronome error types
#[derive(Debug, thiserror::Error)]
pub enum MetronomeError {
    #[error("Could not start audio: {0}")]
    Audio(#[from] AudioError),

    #[error("Could not start the tick source: {0}")]
    TickSource(#[from] io::Error),
}

/// State shared between the UI thread and the tick thread
struct Shared {
    config: SequenceConfig,
    profiles: AccentProfiles,
    session: Option<PlaybackState>,
    scheduler: LookAheadScheduler,
    trigger: Box<dyn SoundTrigger>,
    visual: VisualSync,
    timer: SessionTimer,
    events: EventProducer,
}

impl Shared {
    fn emit(&mut self, event: MetronomeEvent) {
        if self.events.try_push(event).is_err() {
            log::debug!("Event queue full, UI event dropped");
        }
    }

    fn status(&mut self, notification: Notification) {
        self.emit(MetronomeEvent::Status(notification));
    }

    /// Restart the live bar counter after a bar-cycle edit
    fn restart_bar_cycle(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.current_bar_cycle = 0;
        }
    }
}

fn lock_shared(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|e| e.into_inner())
}

/// One tick: fill the look-ahead window of the running session
fn run_tick(shared: &Mutex<Shared>, clock: &dyn AudioClock) {
    let now = clock.now();
    let mut guard = lock_shared(shared);
    let shared = &mut *guard;

    let Some(session) = shared.session.as_mut() else {
        return;
    };

    let report = shared.scheduler.fill(
        now,
        &shared.config,
        &shared.profiles,
        session,
        shared.trigger.as_mut(),
    );

    if report.count_in_finished {
        shared.timer.start();
        log::info!("Count-in finished, pattern starts");
        let message = format!(
            "Pattern START. Metronome running at {} BPM.",
            shared.config.tempo().bpm()
        );
        shared.emit(MetronomeEvent::CountInFinished);
        shared.status(Notification::info(NotificationCategory::Transport, message));
    }
}

pub struct Metronome {
    shared: Arc<Mutex<Shared>>,
    clock: Arc<dyn AudioClock>,
    ticker: Box<dyn RepeatingTask>,
    wake_lock: Box<dyn WakeLock>,
    settings: Option<SettingsStore>,
    tap_tempo: TapTempo,
}

impl Metronome {
    /// Controller with default config, factory profiles, a threaded tick source,
    /// the system wake lock and no persistence
    pub fn new(
        clock: Arc<dyn AudioClock>,
        trigger: Box<dyn SoundTrigger>,
        events: EventProducer,
    ) -> Self {
        let shared = Shared {
            config: SequenceConfig::new(),
            profiles: AccentProfiles::factory(),
            session: None,
            scheduler: LookAheadScheduler::new(),
            trigger,
            visual: VisualSync::new(),
            timer: SessionTimer::new(),
            events,
        };

        Self {
            shared: Arc::new(Mutex::new(shared)),
            clock,
            ticker: Box::new(ThreadTicker::new()),
            wake_lock: Box::new(SystemWakeLock::new()),
            settings: None,
            tap_tempo: TapTempo::new(),
        }
    }

    pub fn with_ticker(mut self, ticker: impl RepeatingTask + 'static) -> Self {
        self.ticker = Box::new(ticker);
        self
    }

    pub fn with_wake_lock(mut self, wake_lock: impl WakeLock + 'static) -> Self {
        self.wake_lock = Box::new(wake_lock);
        self
    }

    /// Persist accent profiles in `store`, loading the stored ones now
    pub fn with_settings(mut self, store: SettingsStore) -> Self {
        let profiles = store.load_or_default();
        self.lock().profiles = profiles;
        self.settings = Some(store);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        lock_shared(&self.shared)
    }

    // ---- Transport ----

    /// Start playback. No-op when already playing.
    ///
    /// On audio failure nothing is scheduled, the wake lock is released and
    /// the metronome stays stopped.
    pub fn start(&mut self) -> Result<(), MetronomeError> {
        if self.is_playing() {
            return Ok(());
        }

        if let Err(e) = self.wake_lock.acquire() {
            log::warn!("Could not acquire wake lock: {}", e);
        }

        if let Err(e) = self.clock.resume() {
            log::error!("Failed to start audio engine: {}", e);
            self.wake_lock.release();
            self.lock().status(Notification::error(
                NotificationCategory::Audio,
                "Error: Could not start audio.",
            ));
            return Err(e.into());
        }

        let now = self.clock.now();
        {
            let mut shared = self.lock();
            let session = PlaybackState::begin(&shared.config, now);
            let counting_in = session.is_counting_in();
            shared.session = Some(session);
            shared.visual.start();

            let message = if counting_in {
                let bars = shared.config.count_in_bars();
                format!(
                    "Starting with {} count-in bar{}...",
                    bars,
                    if bars > 1 { "s" } else { "" }
                )
            } else {
                shared.timer.start();
                format!(
                    "Metronome running at {} BPM.",
                    shared.config.tempo().bpm()
                )
            };
            shared.status(Notification::info(NotificationCategory::Transport, message));
        }

        let shared = Arc::clone(&self.shared);
        let clock = Arc::clone(&self.clock);
        let task = Box::new(move || run_tick(&shared, clock.as_ref()));

        if let Err(e) = self.ticker.start(TICK_INTERVAL, task) {
            log::error!("Failed to start tick source: {}", e);
            {
                let mut shared = self.lock();
                shared.session = None;
                shared.visual.stop();
                shared.timer.stop();
            }
            self.wake_lock.release();
            return Err(e.into());
        }

        self.tap_tempo.clear();
        log::info!("Metronome started at {}", self.lock().config.tempo());
        Ok(())
    }

    /// Stop playback. No-op when stopped.
    ///
    /// The tick source is halted before this returns; clicks already handed
    /// to the audio clock still play out.
    pub fn stop(&mut self) {
        if !self.is_playing() {
            return;
        }

        // Joins the tick thread, so it must run without the lock held
        self.ticker.stop();

        {
            let mut shared = self.lock();
            shared.session = None;
            shared.visual.stop();
            shared.timer.stop();
            shared.status(Notification::info(
                NotificationCategory::Transport,
                "Metronome stopped.",
            ));
        }

        self.wake_lock.release();
        log::info!("Metronome stopped");
    }

    pub fn toggle(&mut self) -> Result<(), MetronomeError> {
        if self.is_playing() {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    /// Run one scheduler pass now, outside the tick source
    pub fn tick(&self) {
        run_tick(&self.shared, self.clock.as_ref());
    }

    pub fn is_playing(&self) -> bool {
        self.lock().session.is_some()
    }

    pub fn transport_state(&self) -> TransportState {
        self.lock()
            .session
            .map(|session| session.phase)
            .unwrap_or(TransportState::Stopped)
    }

    /// Copy of the live session state
    pub fn playback(&self) -> Option<PlaybackState> {
        self.lock().session
    }

    // ---- Visual loop ----

    /// One display frame. `Exit` once playback stopped.
    pub fn visual_frame(&self) -> FrameOutcome {
        let now = self.clock.now();
        let mut guard = self.lock();
        let shared = &mut *guard;
        shared
            .visual
            .frame(now, &shared.config, shared.session.as_mut())
    }

    pub fn step_visual(&self, step: usize) -> StepVisual {
        self.lock().visual.step_visual(step)
    }

    /// Drawing state of every grid cell
    pub fn step_visuals(&self) -> Vec<StepVisual> {
        let shared = self.lock();
        (0..shared.config.grid_size())
            .map(|step| shared.visual.step_visual(step))
            .collect()
    }

    /// Elapsed session time as `mm:ss`
    pub fn session_time(&self) -> String {
        self.lock().timer.display()
    }

    // ---- Sequence edits ----

    pub fn config(&self) -> SequenceConfig {
        self.lock().config.clone()
    }

    pub fn set_tempo(&self, bpm: i32) -> u16 {
        self.lock().config.set_tempo(bpm)
    }

    pub fn adjust_tempo(&self, delta: i32) -> u16 {
        self.lock().config.adjust_tempo(delta)
    }

    /// Stops playback first, then switches mode (resetting the pattern)
    pub fn set_mode(&mut self, mode: StepMode) -> bool {
        self.stop();
        self.lock().config.set_mode(mode)
    }

    pub fn set_pattern_step(&self, index: usize) -> Option<AccentLevel> {
        self.lock().config.set_pattern_step(index)
    }

    pub fn clear_pattern(&self) {
        self.lock().config.clear_pattern();
    }

    pub fn reset_pattern(&self) {
        self.lock().config.reset_pattern();
    }

    pub fn increase_play_bars(&self) -> bool {
        self.edit_bar_cycle(SequenceConfig::increase_play_bars)
    }

    /// Back to one audible bar. Always restarts the live cycle, even when
    /// the count was already 1.
    pub fn reset_play_bars(&self) -> bool {
        self.reset_bar_cycle(SequenceConfig::reset_play_bars)
    }

    pub fn increase_drop_bars(&self) -> bool {
        self.edit_bar_cycle(SequenceConfig::increase_drop_bars)
    }

    /// Back to no silent bars, restarting the live cycle
    pub fn reset_drop_bars(&self) -> bool {
        self.reset_bar_cycle(SequenceConfig::reset_drop_bars)
    }

    pub fn set_bars_to_play(&self, bars: u8) -> bool {
        self.edit_bar_cycle(|config| config.set_bars_to_play(bars))
    }

    pub fn set_bars_to_drop(&self, bars: u8) -> bool {
        self.edit_bar_cycle(|config| config.set_bars_to_drop(bars))
    }

    fn edit_bar_cycle(&self, edit: impl FnOnce(&mut SequenceConfig) -> bool) -> bool {
        let mut shared = self.lock();
        let changed = edit(&mut shared.config);
        if changed {
            shared.restart_bar_cycle();
        }
        changed
    }

    fn reset_bar_cycle(&self, reset: impl FnOnce(&mut SequenceConfig) -> bool) -> bool {
        let mut shared = self.lock();
        let changed = reset(&mut shared.config);
        shared.restart_bar_cycle();
        changed
    }

    /// Stops playback first, then advances the count-in 0 → 1 → 2 → 0
    pub fn cycle_count_in(&mut self) -> u8 {
        self.stop();
        self.lock().config.cycle_count_in()
    }

    /// Stops playback first, then sets the count-in (clamped to 0..=2)
    pub fn set_count_in(&mut self, bars: u8) -> u8 {
        self.stop();
        self.lock().config.set_count_in(bars)
    }

    // ---- Tap tempo ----

    /// Register a tap and apply the resulting tempo
    pub fn tap(&mut self) -> TapResult {
        let result = self.tap_tempo.tap();
        self.apply_tap(result)
    }

    #[cfg(test)]
    fn tap_at(&mut self, now: Instant) -> TapResult {
        let result = self.tap_tempo.tap_at(now);
        self.apply_tap(result)
    }

    fn apply_tap(&self, result: TapResult) -> TapResult {
        if let Some(bpm) = result.bpm {
            self.set_tempo(bpm);
        }
        result
    }

    pub fn clear_taps(&mut self) {
        self.tap_tempo.clear();
    }

    // ---- Accent profiles ----

    pub fn profiles(&self) -> AccentProfiles {
        self.lock().profiles
    }

    /// Edit one field of a profile and persist all profiles
    pub fn set_accent_profile(&self, key: AccentKey, field: ProfileField) {
        let profiles = {
            let mut shared = self.lock();
            shared.profiles.set_field(key, field);
            shared.profiles
        };
        self.persist(&profiles);
    }

    /// Restore and persist the factory profiles
    pub fn reset_accent_profiles(&self) -> AccentProfiles {
        let factory = match &self.settings {
            Some(store) => store.reset_factory().unwrap_or_else(|e| {
                log::error!("Could not reset accent settings: {}", e);
                AccentProfiles::factory()
            }),
            None => AccentProfiles::factory(),
        };
        self.lock().profiles = factory;
        factory
    }

    fn persist(&self, profiles: &AccentProfiles) {
        let Some(store) = &self.settings else {
            return;
        };
        if let Err(e) = store.save(profiles) {
            log::error!("Could not save accent settings: {}", e);
            self.lock().status(Notification::warning(
                NotificationCategory::Settings,
                "Could not save sound settings.",
            ));
        }
    }

    // ---- Wake lock ----

    /// Re-acquire the wake lock if the platform dropped it while playing.
    /// Call when the window becomes visible again.
    pub fn reacquire_wake_lock(&mut self) -> bool {
        if !self.is_playing() || self.wake_lock.is_held() {
            return false;
        }
        match self.wake_lock.acquire() {
            Ok(()) => {
                log::info!("Wake lock re-acquired");
                true
            }
            Err(e) => {
                log::warn!("Could not re-acquire wake lock: {}", e);
                self.lock().status(Notification::warning(
                    NotificationCategory::WakeLock,
                    "Screen may turn off during playback.",
                ));
                false
            }
        }
    }

    pub fn wake_lock_held(&self) -> bool {
        self.wake_lock.is_held()
    }
}

impl Drop for Metronome {
    fn drop(&mut self) {
        self.stop();
    }
}
