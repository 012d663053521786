// UI module - egui desktop front end

pub mod app;

pub use app::MetronomeApp;
