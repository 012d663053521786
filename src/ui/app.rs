// Main UI App - egui front end of the metronome
//
// `update` is the display-refresh callback: it runs one visual-sync frame and
// asks for the next repaint while the loop reports Reschedule.

use std::time::Duration;

use eframe::egui;
use ringbuf::traits::Consumer;

use crate::audio::engine::AudioEngine;
use crate::connection::status::DeviceStatus;
use crate::messaging::channels::EventConsumer;
use crate::messaging::event::MetronomeEvent;
use crate::messaging::notification::{Notification, NotificationCategory, NotificationLevel};
use crate::sequencer::metronome::Metronome;
use crate::sequencer::pattern::AccentLevel;
use crate::sequencer::timeline::StepMode;
use crate::sequencer::visual::{FrameOutcome, StepVisual};
use crate::settings::types::{
    AccentKey, MAX_FREQUENCY, MAX_VOLUME, MIN_FREQUENCY, MIN_VOLUME, ProfileField,
};
use crate::synth::oscillator::Waveform;

const READY_MESSAGE: &str = "Ready. Set your pattern and press START.";

/// Repaint period while stopped, enough to pick up late status events
const IDLE_REPAINT: Duration = Duration::from_millis(200);

const CELL_SIZE: f32 = 44.0;

fn accent_color(level: AccentLevel) -> egui::Color32 {
    match level {
        AccentLevel::Off => egui::Color32::from_gray(60),
        AccentLevel::Weak => egui::Color32::from_rgb(251, 191, 36),
        AccentLevel::Medium => egui::Color32::from_rgb(132, 204, 22),
        AccentLevel::Strong => egui::Color32::from_rgb(20, 184, 166),
    }
}

fn profile_title(key: AccentKey) -> &'static str {
    match key {
        AccentKey::State3 => "Primary",
        AccentKey::State2 => "Secondary",
        AccentKey::State1 => "Tertiary",
    }
}

fn plural(n: u8) -> &'static str {
    if n != 1 { "s" } else { "" }
}

pub struct MetronomeApp {
    metronome: Metronome,
    event_rx: EventConsumer,
    // Keeps the output stream alive; None when no device could be opened
    engine: Option<AudioEngine>,
    volume_ui: f32,
    status: Notification,
    bpm_input: Option<String>,
    show_settings: bool,
    was_focused: bool,
}

impl MetronomeApp {
    pub fn new(metronome: Metronome, event_rx: EventConsumer, engine: Option<AudioEngine>) -> Self {
        let volume_ui = engine.as_ref().map(|e| e.volume.get()).unwrap_or(0.0);

        Self {
            metronome,
            event_rx,
            engine,
            volume_ui,
            status: Notification::info(NotificationCategory::Generic, READY_MESSAGE),
            bpm_input: None,
            show_settings: false,
            was_focused: true,
        }
    }

    fn set_status(&mut self, category: NotificationCategory, message: impl Into<String>) {
        self.status = Notification::info(category, message);
    }

    /// Pull status updates posted by the controller and the tick thread
    fn update_notifications(&mut self) {
        while let Some(event) = self.event_rx.try_pop() {
            match event {
                MetronomeEvent::Status(notification) => self.status = notification,
                MetronomeEvent::CountInFinished => log::debug!("UI saw count-in finish"),
            }
        }
    }

    // ---- Actions ----

    fn toggle(&mut self) {
        if self.bpm_input.is_some() {
            self.commit_bpm_input();
        }
        // Failures already post their own status message
        if let Err(e) = self.metronome.toggle() {
            log::warn!("Start failed: {}", e);
        }
    }

    fn adjust_tempo(&mut self, delta: i32) {
        let old = self.metronome.config().tempo().bpm();
        let bpm = self.metronome.adjust_tempo(delta);
        let state = self.metronome.transport_state();
        if bpm != old && state.is_playing() && !state.is_counting_in() {
            self.set_status(
                NotificationCategory::Transport,
                format!("Tempo adjusted to {} BPM.", bpm),
            );
        }
    }

    fn commit_bpm_input(&mut self) {
        let Some(text) = self.bpm_input.take() else {
            return;
        };
        let old = self.metronome.config().tempo().bpm();
        let requested = text.trim().parse::<i32>().unwrap_or(old as i32);
        let bpm = self.metronome.set_tempo(requested);

        let state = self.metronome.transport_state();
        if bpm != old && state.is_playing() && !state.is_counting_in() {
            self.set_status(
                NotificationCategory::Transport,
                format!("Tempo adjusted manually to {} BPM.", bpm),
            );
        }
    }

    fn tap(&mut self) {
        let result = self.metronome.tap();
        if result.reset {
            log::debug!("Tap tempo sequence reset");
        }
        let message = match result.bpm {
            Some(_) => format!(
                "Tap Tempo set to {} BPM.",
                self.metronome.config().tempo().bpm()
            ),
            None => format!(
                "Tap {}. Tap {} more time(s) to set tempo.",
                result.taps,
                2usize.saturating_sub(result.taps)
            ),
        };
        self.set_status(NotificationCategory::Transport, message);
    }

    fn set_mode(&mut self, mode: StepMode) {
        if self.metronome.set_mode(mode) {
            self.set_status(
                NotificationCategory::Transport,
                format!("Mode set to {}-Step Pattern. Ready to play.", mode.steps_per_bar()),
            );
        }
    }

    fn cycle_count_in(&mut self) {
        let bars = self.metronome.cycle_count_in();
        self.set_status(
            NotificationCategory::Transport,
            format!("Count-In set to {} bar{}.", bars, plural(bars)),
        );
    }

    /// Status line after a bar-cycle edit
    fn cycle_status(&mut self) {
        let cycle = self.metronome.config().bar_cycle();
        let state = self.metronome.transport_state();
        let (play, drop) = (cycle.bars_to_play(), cycle.bars_to_drop());

        if drop > 0 {
            self.set_status(
                NotificationCategory::Transport,
                format!(
                    "Rhythm Cycle set: Play {} bar{}, then silence for {} bar{}.",
                    play,
                    plural(play),
                    drop,
                    plural(drop)
                ),
            );
        } else if state.is_playing() && !state.is_counting_in() {
            let bpm = self.metronome.config().tempo().bpm();
            self.set_status(
                NotificationCategory::Transport,
                format!("Metronome running at {} BPM.", bpm),
            );
        } else if state.is_stopped() {
            self.set_status(NotificationCategory::Generic, READY_MESSAGE);
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        // Leave keys to the BPM text field while it is open
        if ctx.wants_keyboard_input() {
            return;
        }

        let (space, left, right, up, down) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::ArrowUp),
                i.key_pressed(egui::Key::ArrowDown),
            )
        });

        if space {
            self.toggle();
        }
        if right {
            self.adjust_tempo(1);
        }
        if left {
            self.adjust_tempo(-1);
        }
        if up {
            self.adjust_tempo(5);
        }
        if down {
            self.adjust_tempo(-5);
        }
    }

    /// The platform may drop the wake lock while the window is hidden
    fn check_focus(&mut self, ctx: &egui::Context) {
        let focused = ctx.input(|i| i.viewport().focused.unwrap_or(true));
        if focused && !self.was_focused {
            self.metronome.reacquire_wake_lock();
        }
        self.was_focused = focused;
    }

    // ---- Drawing ----

    fn draw_tempo(&mut self, ui: &mut egui::Ui) {
        let bpm = self.metronome.config().tempo().bpm();

        ui.horizontal(|ui| {
            for delta in [-5, -1] {
                if ui.button(format!("{:+}", delta)).clicked() {
                    self.adjust_tempo(delta);
                }
            }

            match self.bpm_input.as_mut() {
                Some(text) => {
                    let response = ui.add(egui::TextEdit::singleline(text).desired_width(80.0));
                    if response.lost_focus() {
                        self.commit_bpm_input();
                    } else if !response.has_focus() {
                        response.request_focus();
                    }
                }
                None => {
                    let label = egui::RichText::new(format!("{}", bpm)).size(48.0).strong();
                    let response = ui
                        .add(egui::Label::new(label).sense(egui::Sense::click()))
                        .on_hover_text("Click to type a tempo");
                    if response.clicked() {
                        self.metronome.clear_taps();
                        if !self.metronome.is_playing() {
                            self.bpm_input = Some(bpm.to_string());
                        }
                    }
                }
            }
            ui.label("BPM");

            for delta in [1, 5] {
                if ui.button(format!("{:+}", delta)).clicked() {
                    self.adjust_tempo(delta);
                }
            }

            ui.add_space(10.0);
            if ui.button("TAP").clicked() {
                self.tap();
            }
        });
    }

    fn draw_transport(&mut self, ui: &mut egui::Ui) {
        let playing = self.metronome.is_playing();
        let config = self.metronome.config();

        ui.horizontal(|ui| {
            let (label, color) = if playing {
                ("STOP", egui::Color32::from_rgb(220, 38, 38))
            } else {
                ("START", egui::Color32::from_rgb(22, 163, 74))
            };
            let button = egui::Button::new(egui::RichText::new(label).size(20.0).strong())
                .fill(color)
                .min_size(egui::vec2(120.0, 40.0));
            if ui.add(button).clicked() {
                self.toggle();
            }

            ui.separator();

            for mode in [StepMode::Sixteen, StepMode::Twelve] {
                let selected = config.mode() == mode;
                if ui
                    .selectable_label(selected, format!("{}", mode.steps_per_bar()))
                    .clicked()
                    && !selected
                {
                    self.set_mode(mode);
                }
            }

            ui.separator();

            let count_in = config.count_in_bars();
            if ui
                .selectable_label(count_in > 0, format!("Count: {}", count_in))
                .clicked()
            {
                self.cycle_count_in();
            }

            ui.separator();
            ui.monospace(self.metronome.session_time());
        });
    }

    fn draw_bar_cycle(&mut self, ui: &mut egui::Ui) {
        let cycle = self.metronome.config().bar_cycle();

        ui.horizontal(|ui| {
            let play = cycle.bars_to_play();
            ui.label(format!("{} BAR{}", play, if play != 1 { "S" } else { "" }));
            if ui.small_button("+").clicked() && self.metronome.increase_play_bars() {
                self.cycle_status();
            }
            if ui.small_button("reset").clicked() {
                self.metronome.reset_play_bars();
                self.cycle_status();
            }

            ui.separator();

            ui.label(format!("{} SILENT", cycle.bars_to_drop()));
            if ui.small_button("+").clicked() && self.metronome.increase_drop_bars() {
                self.cycle_status();
            }
            if ui.small_button("reset").clicked() {
                self.metronome.reset_drop_bars();
                self.cycle_status();
            }
        });
    }

    fn draw_grid(&mut self, ui: &mut egui::Ui) {
        let config = self.metronome.config();
        let visuals = self.metronome.step_visuals();
        let beat = config.mode().steps_per_beat();

        ui.horizontal_wrapped(|ui| {
            for (index, level) in config.pattern().cells().iter().copied().enumerate() {
                if index > 0 && index % beat == 0 {
                    ui.add_space(8.0);
                }

                let visual = visuals.get(index).copied().unwrap_or_default();
                let (fill, stroke) = match visual {
                    StepVisual::Playing => (
                        accent_color(level).gamma_multiply(1.4),
                        egui::Stroke::new(3.0, egui::Color32::WHITE),
                    ),
                    StepVisual::SilentPlaying => (
                        egui::Color32::from_gray(35),
                        egui::Stroke::new(3.0, egui::Color32::from_gray(140)),
                    ),
                    StepVisual::None => (
                        accent_color(level),
                        egui::Stroke::new(1.0, egui::Color32::from_gray(90)),
                    ),
                };

                let cell = egui::Button::new("")
                    .fill(fill)
                    .stroke(stroke)
                    .min_size(egui::vec2(CELL_SIZE, CELL_SIZE));
                if ui.add(cell).clicked() {
                    self.metronome.set_pattern_step(index);
                }
            }
        });

        ui.horizontal(|ui| {
            if ui.button("Clear").clicked() {
                self.metronome.clear_pattern();
                self.set_status(
                    NotificationCategory::Generic,
                    "Pattern cleared (all pads set to Off).",
                );
            }
            if ui.button("Default").clicked() {
                self.metronome.reset_pattern();
                let steps = self.metronome.config().grid_size();
                self.set_status(
                    NotificationCategory::Generic,
                    format!("Pattern reset to Default {}-step.", steps),
                );
            }
            if ui.button("Sound settings").clicked() {
                self.show_settings = !self.show_settings;
            }
        });
    }

    fn draw_settings(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        let profiles = self.metronome.profiles();
        let mut edits: Vec<(AccentKey, ProfileField)> = Vec::new();
        let mut factory_reset = false;

        egui::Window::new("Sound settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                for key in [AccentKey::State3, AccentKey::State2, AccentKey::State1] {
                    let profile = profiles.get(key);
                    let level = match key {
                        AccentKey::State3 => AccentLevel::Strong,
                        AccentKey::State2 => AccentLevel::Medium,
                        AccentKey::State1 => AccentLevel::Weak,
                    };

                    ui.colored_label(accent_color(level), profile_title(key));

                    let mut freq = profile.freq;
                    if ui
                        .add(
                            egui::Slider::new(&mut freq, MIN_FREQUENCY..=MAX_FREQUENCY)
                                .step_by(10.0)
                                .suffix(" Hz")
                                .text("Pitch"),
                        )
                        .changed()
                    {
                        edits.push((key, ProfileField::Frequency(freq)));
                    }

                    let mut vol = profile.vol;
                    if ui
                        .add(
                            egui::Slider::new(&mut vol, MIN_VOLUME..=MAX_VOLUME)
                                .step_by(0.01)
                                .text("Volume"),
                        )
                        .changed()
                    {
                        edits.push((key, ProfileField::Volume(vol)));
                    }

                    let mut waveform = profile.waveform;
                    egui::ComboBox::from_id_salt(("waveform", key.name()))
                        .selected_text(waveform.name())
                        .show_ui(ui, |ui| {
                            for option in Waveform::ALL {
                                ui.selectable_value(&mut waveform, option, option.name());
                            }
                        });
                    if waveform != profile.waveform {
                        edits.push((key, ProfileField::Waveform(waveform)));
                    }

                    ui.separator();
                }

                if ui.button("Factory reset").clicked() {
                    factory_reset = true;
                }
            });

        for (key, field) in edits {
            self.metronome.set_accent_profile(key, field);
        }
        if factory_reset {
            self.metronome.reset_accent_profiles();
            self.set_status(
                NotificationCategory::Settings,
                "Audio settings reset to factory defaults.",
            );
        }
        self.show_settings = open;
    }

    fn draw_output(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let status = self
                .engine
                .as_ref()
                .map(|e| e.device_status())
                .unwrap_or(DeviceStatus::Disconnected);
            let (icon, color) = match status {
                DeviceStatus::Connected => ("●", egui::Color32::GREEN),
                DeviceStatus::Connecting => ("●", egui::Color32::YELLOW),
                DeviceStatus::Disconnected => ("○", egui::Color32::GRAY),
                DeviceStatus::Error => ("●", egui::Color32::RED),
            };
            let detail = match &self.engine {
                Some(engine) => format!(
                    "Audio {} ({} Hz, {} ch)",
                    status,
                    engine.sample_rate(),
                    engine.channels()
                ),
                None => format!("Audio {}", status),
            };
            ui.colored_label(color, icon).on_hover_text(detail);

            if let Some(engine) = &self.engine {
                ui.label("Volume:");
                if ui
                    .add(egui::Slider::new(&mut self.volume_ui, 0.0..=1.0))
                    .changed()
                {
                    engine.volume.set(self.volume_ui);
                }
            } else {
                ui.label("No audio output");
            }
        });
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.separator();
        let color = match self.status.level {
            NotificationLevel::Info => ui.visuals().text_color(),
            NotificationLevel::Warning => egui::Color32::from_rgb(255, 165, 0),
            NotificationLevel::Error => egui::Color32::RED,
        };
        ui.colored_label(color, &self.status.message);
    }
}

impl eframe::App for MetronomeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.metronome.visual_frame() {
            FrameOutcome::Reschedule => ctx.request_repaint(),
            FrameOutcome::Exit => ctx.request_repaint_after(IDLE_REPAINT),
        }

        self.update_notifications();
        self.check_focus(ctx);
        self.handle_keyboard(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Gridclick");
            ui.separator();

            self.draw_tempo(ui);
            ui.add_space(10.0);
            self.draw_transport(ui);
            ui.add_space(10.0);
            self.draw_bar_cycle(ui);
            ui.add_space(10.0);
            self.draw_grid(ui);
            ui.add_space(10.0);
            self.draw_output(ui);
            ui.add_space(10.0);
            self.draw_status_bar(ui);
        });

        if self.show_settings {
            self.draw_settings(ctx);
        }
    }
}
