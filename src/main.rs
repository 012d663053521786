use std::sync::Arc;

use gridclick::audio::timing::AudioClock;
use gridclick::ui::MetronomeApp;
use gridclick::{
    AudioEngine, EngineTrigger, Metronome, SettingsStore, UnavailableClock, create_event_channel,
    create_tone_channel,
};

// Ringbuffer capacity constants
// At 300 BPM in 16-step mode the scheduler commits at most 3 clicks per
// 100ms window; 256 leaves room for a stalled audio callback.
const TONE_RINGBUFFER_CAPACITY: usize = 256;
const EVENT_RINGBUFFER_CAPACITY: usize = 64;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Gridclick {}", env!("CARGO_PKG_VERSION"));

    let (tone_tx, tone_rx) = create_tone_channel(TONE_RINGBUFFER_CAPACITY);
    let (event_tx, event_rx) = create_event_channel(EVENT_RINGBUFFER_CAPACITY);

    // Without an output device the UI still runs; every start reports the error
    let (engine, clock, trigger): (Option<AudioEngine>, Arc<dyn AudioClock>, EngineTrigger) =
        match AudioEngine::new(tone_rx) {
            Ok(engine) => {
                let clock: Arc<dyn AudioClock> = Arc::new(engine.clock());
                (Some(engine), clock, EngineTrigger::new(tone_tx))
            }
            Err(e) => {
                log::error!("Audio engine unavailable: {}", e);
                let clock: Arc<dyn AudioClock> = Arc::new(UnavailableClock);
                (None, clock, EngineTrigger::disconnected())
            }
        };

    let mut metronome = Metronome::new(clock, Box::new(trigger), event_tx);
    match SettingsStore::open_default() {
        Ok(store) => {
            log::info!("Accent settings: {}", store.path().display());
            metronome = metronome.with_settings(store);
        }
        Err(e) => log::warn!("Accent settings will not be saved: {}", e),
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 520.0])
            .with_title("Gridclick"),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Gridclick",
        native_options,
        Box::new(|_cc| Ok(Box::new(MetronomeApp::new(metronome, event_rx, engine)))),
    ) {
        log::error!("UI error: {}", e);
    }
}
