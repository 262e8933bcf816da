use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use egui::{Label, RichText, Sense};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::controller::{CompressionController, CompressionResult};
use crate::formats::dialog_filters;
use crate::models::SelectedFile;
use crate::progress::ProgressReporter;
use crate::settings::CompressionSettings;
use crate::ui::{draw_format_info, draw_progress, draw_settings, draw_status, ProgressView, StatusMessage};
use crate::utils::{default_archive_name, ensure_zip_extension, get_formatted_size};

/// Messages from the compression thread back to the UI thread.
pub enum WorkerEvent {
    Progress(f32),
    Finished(CompressionResult),
}

/// Forwards writer progress onto the UI thread's channel.
struct ChannelProgress {
    tx: Sender<WorkerEvent>,
    ctx: egui::Context,
}

impl ProgressReporter for ChannelProgress {
    fn report(&mut self, fraction: f32) {
        if self.tx.send(WorkerEvent::Progress(fraction)).is_ok() {
            self.ctx.request_repaint();
        }
    }
}

pub struct CompressorApp {
    pub controller: Arc<Mutex<CompressionController>>,
    pub settings: CompressionSettings,
    pub selected: Option<SelectedFile>,
    pub progress: Option<ProgressView>,
    pub events: Option<Receiver<WorkerEvent>>,
    pub status: Option<StatusMessage>,
}

impl Default for CompressorApp {
    fn default() -> Self {
        let settings = CompressionSettings::default();
        Self {
            controller: Arc::new(Mutex::new(CompressionController::new(&settings))),
            settings,
            selected: None,
            progress: None,
            events: None,
            status: None,
        }
    }
}

impl CompressorApp {
    fn is_busy(&self) -> bool {
        self.events.is_some()
    }

    pub fn pick_file(&mut self, ctx: &egui::Context) {
        let mut dialog = rfd::FileDialog::new().set_title("Select file to compress");
        for (name, extensions) in dialog_filters() {
            dialog = dialog.add_filter(name, extensions.as_slice());
        }

        if let Some(path) = dialog.pick_file() {
            self.handle_selection(ctx, &path);
        }
    }

    /// Validates a picked or dropped file and, if accepted, asks where to save it.
    pub fn handle_selection(&mut self, ctx: &egui::Context, path: &Path) {
        info!("Handling selection: {:?}", path);

        let result = self.controller.lock().select_file(path);
        match result {
            Ok(selected) => {
                self.status = Some(StatusMessage::info(format!(
                    "Selected {}",
                    selected.file_name()
                )));
                self.selected = Some(selected);
                self.prompt_destination(ctx);
            }
            Err(e) => {
                warn!("Selection rejected: {}", e);
                self.status = Some(StatusMessage::error(e.user_message()));
            }
        }
    }

    pub fn prompt_destination(&mut self, ctx: &egui::Context) {
        let Some(selected) = self.selected.clone() else {
            return;
        };

        let destination = rfd::FileDialog::new()
            .set_title("Save compressed file")
            .add_filter("ZIP files", &["zip"])
            .set_file_name(default_archive_name(selected.path()))
            .save_file();

        match destination {
            Some(path) => self.start_compression(ctx, &selected, ensure_zip_extension(path)),
            None => {
                info!("Save dialog dismissed");
                self.status = Some(StatusMessage::info("Save cancelled"));
            }
        }
    }

    fn start_compression(&mut self, ctx: &egui::Context, selected: &SelectedFile, destination: PathBuf) {
        let original_size = std::fs::metadata(selected.path())
            .map(|meta| meta.len())
            .unwrap_or(0);
        let (tx, rx) = unbounded();
        let controller = Arc::clone(&self.controller);
        let ctx = ctx.clone();

        info!("Compressing {:?} into {:?}", selected.path(), destination);
        self.progress = Some(ProgressView::new(selected.file_name(), original_size));
        self.events = Some(rx);
        self.status = None;

        thread::spawn(move || {
            let mut reporter = ChannelProgress {
                tx: tx.clone(),
                ctx: ctx.clone(),
            };
            let result = controller
                .lock()
                .compress_selected(&destination, &mut reporter);
            if tx.send(WorkerEvent::Finished(result)).is_err() {
                warn!("UI stopped listening before compression finished");
            }
            ctx.request_repaint();
        });
    }

    fn poll_events(&mut self) {
        let Some(rx) = &self.events else {
            return;
        };

        let mut finished = None;
        loop {
            match rx.try_recv() {
                Ok(WorkerEvent::Progress(fraction)) => {
                    if let Some(view) = self.progress.as_mut() {
                        view.fraction = fraction;
                    }
                }
                Ok(WorkerEvent::Finished(result)) => {
                    finished = Some(result);
                    break;
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => break,
            }
        }

        self.events = None;
        self.progress = None;
        self.selected = None;

        match finished {
            Some(result) => self.finish(result),
            None => {
                error!("Compression thread exited without a result");
                self.status = Some(StatusMessage::error(
                    "Compression stopped unexpectedly. Please try again.",
                ));
            }
        }
    }

    fn finish(&mut self, result: CompressionResult) {
        if let Some(job) = self.controller.lock().take_last_job() {
            debug!(
                "Job for {:?} ended as {:?} at {:.0}% ({})",
                job.source(),
                job.status(),
                job.progress() * 100.0,
                job.error().unwrap_or("no error")
            );
        }

        self.status = Some(match result {
            Ok(archive) => StatusMessage::info(format!(
                "File compressed successfully!\n{} → {}",
                get_formatted_size(archive.entry.uncompressed_size),
                get_formatted_size(archive.compressed_size)
            )),
            Err(e) => {
                error!("Compression error: {}", e);
                StatusMessage::error(e.user_message())
            }
        });
    }

    pub fn handle_drops(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .find_map(|file| file.path.clone())
        });

        if let Some(path) = dropped {
            if self.is_busy() {
                warn!("Ignoring drop of {:?} while compressing", path);
                return;
            }
            self.handle_selection(ctx, &path);
        }
    }
}

impl eframe::App for CompressorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();
        self.handle_drops(ctx);
        if self.is_busy() {
            // keep the elapsed/remaining timer ticking between progress events
            ctx.request_repaint_after(Duration::from_millis(200));
        }

        ctx.set_visuals(if self.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(RichText::new("File Compressor").size(24.0).strong());
                ui.add_space(12.0);

                let busy = self.is_busy();
                let prompt = match &self.selected {
                    Some(selected) => format!("📄 {}", selected.file_name()),
                    None => "Click to select a file".to_string(),
                };
                let zone = ui.group(|ui| {
                    ui.add_space(30.0);
                    ui.add(Label::new(RichText::new(prompt)).sense(Sense::click()))
                });
                if !busy && (zone.inner.clicked() || zone.response.interact(Sense::click()).clicked()) {
                    self.pick_file(ctx);
                }

                ui.add_space(12.0);
                if let Some(view) = &self.progress {
                    draw_progress(ui, view);
                }
                if let Some(status) = &self.status {
                    draw_status(ui, status);
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if ui.add_enabled(!busy, egui::Button::new("Select File")).clicked() {
                        self.pick_file(ctx);
                    }
                    if self.selected.is_some()
                        && ui.add_enabled(!busy, egui::Button::new("Save as ZIP…")).clicked()
                    {
                        self.prompt_destination(ctx);
                    }
                });

                ui.add_space(12.0);
                draw_format_info(ui);
                ui.collapsing("Settings", |ui| draw_settings(ui, &mut self.settings));
            });
        });
    }
}
