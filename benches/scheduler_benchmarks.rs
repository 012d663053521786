use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gridclick::audio::engine::ClickRenderer;
use gridclick::audio::parameters::AtomicF32;
use gridclick::{
    AccentLevel, AccentProfiles, AudioTiming, LookAheadScheduler, PlaybackState,
    RecordingTrigger, SequenceConfig, StepMode, ToneEvent, VoiceManager, Waveform,
    create_tone_channel,
};
use ringbuf::traits::Producer;

/// One minute of 25ms ticks through the look-ahead fill loop
fn bench_scheduler_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_fill");
    let scheduler = LookAheadScheduler::new();
    let profiles = AccentProfiles::factory();

    for bpm in [60, 120, 300] {
        let mut config = SequenceConfig::new();
        config.set_tempo(bpm);
        for index in 0..config.grid_size() {
            config.set_pattern_cell(index, AccentLevel::Weak);
        }

        group.bench_with_input(BenchmarkId::from_parameter(bpm), &config, |b, config| {
            b.iter(|| {
                let mut state = PlaybackState::begin(config, 0.0);
                let mut trigger = RecordingTrigger::new();
                for tick in 1..=2400 {
                    let now = tick as f64 * 0.025;
                    black_box(scheduler.fill(now, config, &profiles, &mut state, &mut trigger));
                }
            });
        });
    }
    group.finish();
}

/// Worst case overlap: a click on every step at 300 BPM in triplet mode
fn bench_voice_manager(c: &mut Criterion) {
    let sample_rate = 48000.0;
    let buffer_size = 512;

    c.bench_function("voice_manager_overlapping_clicks", |b| {
        let mut voices = VoiceManager::new(sample_rate);
        let mut position = 0u64;
        b.iter(|| {
            voices.schedule(position + 64, 880.0, 0.8, Waveform::Triangle);
            for offset in 0..buffer_size {
                black_box(voices.next_sample(position + offset));
            }
            position += buffer_size;
        });
    });
}

/// Full audio callback body for one stereo buffer
fn bench_click_renderer(c: &mut Criterion) {
    let (mut tone_tx, tone_rx) = create_tone_channel(64);
    let timing = AudioTiming::new(48000.0);
    let mut renderer = ClickRenderer::new(tone_rx, timing.clone(), AtomicF32::new(0.8));
    let mut buffer = vec![0.0_f32; 512 * 2];
    let step = 60.0 / 300.0 / StepMode::Twelve.beat_subdivision();

    c.bench_function("click_renderer_stereo_512", |b| {
        b.iter(|| {
            let now = timing.current_seconds();
            let _ = tone_tx.try_push(ToneEvent {
                start_time: now + step,
                frequency: 440.0,
                volume: 0.4,
                waveform: Waveform::Sine,
            });
            renderer.render(black_box(&mut buffer), 2);
        });
    });
}

criterion_group!(benches, bench_scheduler_fill, bench_voice_manager, bench_click_renderer);
criterion_main!(benches);
