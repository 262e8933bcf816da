use std::time::Instant;

use egui::{Color32, ProgressBar, RichText};

use crate::formats::{describe_category, SUPPORTED_FORMATS};
use crate::settings::CompressionSettings;
use crate::utils::{estimate_remaining, get_formatted_size};

/// What the progress indicator needs to render one running job.
#[derive(Clone)]
pub struct ProgressView {
    pub fraction: f32,
    pub file_name: String,
    pub original_size: u64,
    pub start_time: Instant,
}

impl ProgressView {
    pub fn new(file_name: String, original_size: u64) -> Self {
        Self {
            fraction: 0.0,
            file_name,
            original_size,
            start_time: Instant::now(),
        }
    }
}

pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

pub fn draw_progress(ui: &mut egui::Ui, view: &ProgressView) {
    ui.label(format!(
        "Compressing {} ({})",
        view.file_name,
        get_formatted_size(view.original_size)
    ));
    ui.add(ProgressBar::new(view.fraction).show_percentage());

    let elapsed = view.start_time.elapsed();
    let timing = match estimate_remaining(elapsed, view.fraction) {
        Some(remaining) => format!(
            "Elapsed {:.1}s, about {:.1}s remaining",
            elapsed.as_secs_f32(),
            remaining.as_secs_f32()
        ),
        None => format!("Elapsed {:.1}s", elapsed.as_secs_f32()),
    };
    ui.label(RichText::new(timing).italics());
}

pub fn draw_status(ui: &mut egui::Ui, status: &StatusMessage) {
    let color = if status.is_error {
        Color32::RED
    } else {
        Color32::GREEN
    };
    ui.colored_label(color, &status.text);
}

pub fn draw_format_info(ui: &mut egui::Ui) {
    ui.group(|ui| {
        ui.heading("Supported Formats");
        for (category, extensions) in SUPPORTED_FORMATS {
            ui.label(format!("• {}", describe_category(*category, extensions)));
        }
    });
}

pub fn draw_settings(ui: &mut egui::Ui, settings: &mut CompressionSettings) {
    ui.group(|ui| {
        ui.heading("Appearance");
        ui.checkbox(&mut settings.dark_mode, "Dark Mode");
    });
}
