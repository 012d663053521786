// Audio engine - CPAL output stream that renders scheduled clicks
//
// The device's preferred sample format is detected at startup (F32, I16 or
// U16). The mix is computed in f32 and converted per frame while writing the
// output buffer, without allocation.
//
// Clicks arrive through the lock-free tone queue with an audio-clock start
// time. The callback converts that time to a sample index and arms a voice,
// so every click starts on its exact sample whatever the buffer size.
//
// Note: on macOS (CoreAudio) the Stream is not Send/Sync. The engine must
// stay on the thread that created it; the error callback only flags the
// device status.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::Consumer;

use super::AudioError;
use crate::audio::dsp_utils::MasterGain;
use crate::audio::format_conversion::{write_mono_to_interleaved_frame, write_silence};
use crate::audio::parameters::AtomicF32;
use crate::audio::timing::{AudioTiming, EngineClock};
use crate::connection::status::{AtomicDeviceStatus, DeviceStatus};
use crate::messaging::channels::ToneConsumer;
use crate::synth::voice_manager::VoiceManager;

/// Everything the audio callback owns
///
/// Moved into the stream closure, so no lock is ever taken on the audio thread.
pub struct ClickRenderer {
    tone_rx: ToneConsumer,
    voices: VoiceManager,
    gain: MasterGain,
    timing: AudioTiming,
    volume: AtomicF32,
}

impl ClickRenderer {
    pub fn new(tone_rx: ToneConsumer, timing: AudioTiming, volume: AtomicF32) -> Self {
        let sample_rate = timing.sample_rate();
        Self {
            tone_rx,
            voices: VoiceManager::new(sample_rate),
            gain: MasterGain::new(volume.get(), sample_rate),
            timing,
            volume,
        }
    }

    /// Arm a voice for every click waiting in the tone queue
    fn drain_tones(&mut self) {
        while let Some(tone) = self.tone_rx.try_pop() {
            let start_sample = self.timing.seconds_to_samples(tone.start_time);
            self.voices
                .schedule(start_sample, tone.frequency, tone.volume, tone.waveform);
        }
    }

    /// Render one interleaved buffer and advance the audio clock past it
    pub fn render<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: SizedSample + FromSample<f32>,
    {
        // ========== REAL-TIME ZONE ==========
        // No allocations, no I/O, no blocking locks
        if channels == 0 {
            write_silence(data);
            return;
        }

        self.drain_tones();

        let first_sample = self.timing.current_sample();
        let target_volume = self.volume.get();
        let mut frames = 0;

        for (offset, frame) in data.chunks_mut(channels).enumerate() {
            let raw = self.voices.next_sample(first_sample + offset as u64);
            let sample = self.gain.process(raw, target_volume);
            write_mono_to_interleaved_frame(sample, frame);
            frames += 1;
        }

        self.timing.advance(frames);
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.active_voice_count()
    }
}

pub struct AudioEngine {
    _device: Device,
    _stream: Stream,
    sample_rate: f32,
    channels: usize,
    timing: AudioTiming,
    pub volume: AtomicF32,
    pub status: AtomicDeviceStatus,
}

impl AudioEngine {
    /// Open the default output device and start rendering clicks from `tone_rx`
    pub fn new(tone_rx: ToneConsumer) -> Result<Self, AudioError> {
        let host = cpal::default_host();

        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        log::info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device
            .default_output_config()
            .map_err(|e| AudioError::Config(e.to_string()))?;

        let sample_format = supported_config.sample_format();
        log::debug!("Audio config: {:?}", supported_config);

        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let timing = AudioTiming::new(sample_rate);
        let volume = AtomicF32::default();
        let status = AtomicDeviceStatus::new(DeviceStatus::Connecting);

        let renderer = ClickRenderer::new(tone_rx, timing.clone(), volume.clone());

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, channels, renderer, status.clone())
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, channels, renderer, status.clone())
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, channels, renderer, status.clone())
            }
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }?;

        stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))?;

        status.set(DeviceStatus::Connected);
        log::info!("Audio engine started: {} Hz, {} channels", sample_rate, channels);

        Ok(Self {
            _device: device,
            _stream: stream,
            sample_rate,
            channels,
            timing,
            volume,
            status,
        })
    }

    /// Clock the scheduler reads; shares the callback's sample counter
    pub fn clock(&self) -> EngineClock {
        EngineClock::new(self.timing.clone(), self.status.clone())
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn device_status(&self) -> DeviceStatus {
        self.status.get()
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut renderer: ClickRenderer,
        status: AtomicDeviceStatus,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    renderer.render(data, channels);
                },
                move |err| {
                    // Outside the real-time path, logging is fine here
                    log::error!("Audio stream error: {}", err);
                    status.set(DeviceStatus::Error);
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))
    }
}
