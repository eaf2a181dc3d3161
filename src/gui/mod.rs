//! Desktop front end
//!
//! Checklist of catalog entries over the shared installer core. The batch
//! runs on a worker thread; this window only ever consumes the event
//! channel from `update()`.

use crate::catalog::{AppEntry, Catalog};
use crate::installer::{
    EventSender, Installer, InstallerEvent, LogEvent, LogLevel, SystemRunner, UreqFetcher,
};
use crate::storage::{self, paths};
use eframe::egui::{self, Color32, RichText, Rounding, Stroke, Vec2};
use std::sync::mpsc::{Receiver, channel};
use std::thread;
use std::time::Duration;

// Theme colors - deep space with amber accents
const BG_COLOR: Color32 = Color32::from_rgb(13, 15, 20);
const PANEL_COLOR: Color32 = Color32::from_rgb(23, 26, 33);
const ACCENT_COLOR: Color32 = Color32::from_rgb(255, 158, 44);
const ACCENT_HOVER: Color32 = Color32::from_rgb(255, 180, 80);
const TEXT_PRIMARY: Color32 = Color32::from_rgb(235, 235, 235);
const TEXT_SECONDARY: Color32 = Color32::from_rgb(150, 155, 165);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(80, 200, 120);
const WARNING_COLOR: Color32 = Color32::from_rgb(230, 185, 80);
const ERROR_COLOR: Color32 = Color32::from_rgb(255, 85, 85);

/// Check if we're running outside a terminal (double-clicked)
pub fn is_gui_mode() -> bool {
    !atty::is(atty::Stream::Stdin)
}

enum AppState {
    Selecting,
    Installing,
    Done { completed: usize, total: usize },
}

pub struct HangarApp {
    catalog: Catalog,
    selected: Vec<bool>,
    state: AppState,
    log_lines: Vec<LogEvent>,
    progress: f32,
    status: String,
    recv: Option<Receiver<InstallerEvent>>,
}

impl HangarApp {
    pub fn new(catalog: Catalog) -> Self {
        let selected = catalog.apps.iter().map(|a| !a.optional).collect();
        Self {
            catalog,
            selected,
            state: AppState::Selecting,
            log_lines: Vec::new(),
            progress: 0.0,
            status: String::new(),
            recv: None,
        }
    }

    fn start_installation(&mut self) {
        let entries: Vec<AppEntry> = self
            .catalog
            .apps
            .iter()
            .zip(&self.selected)
            .filter(|(_, sel)| **sel)
            .map(|(a, _)| a.clone())
            .collect();
        if entries.is_empty() {
            return;
        }

        let download_dir = crate::settings::load_settings()
            .map(|s| s.effective_download_dir())
            .unwrap_or_else(|_| paths::download_dir());

        let (tx, rx) = channel();
        let installer = Installer::new(
            Box::new(UreqFetcher::new()),
            Box::new(SystemRunner),
            download_dir,
            EventSender::new(tx),
        );

        self.state = AppState::Installing;
        self.status = "Starting installation...".to_string();
        self.recv = Some(rx);

        thread::spawn(move || {
            installer.run_batch(&entries);
        });
    }

    fn poll_events(&mut self) {
        let Some(rx) = self.recv.take() else { return };
        let ledger_path = paths::ledger_path();

        while let Ok(event) = rx.try_recv() {
            match event {
                InstallerEvent::Log(line) => self.log_lines.push(line),
                InstallerEvent::Progress(f) => self.progress = f,
                InstallerEvent::Status(s) => self.status = s,
                InstallerEvent::Download { .. } => {}
                InstallerEvent::AppResult { id, name, success } => {
                    if success {
                        storage::record_install(&ledger_path, &id, &name).ok();
                    }
                }
                InstallerEvent::Done { completed, total } => {
                    self.state = AppState::Done { completed, total };
                    self.progress = 1.0;
                }
            }
        }

        self.recv = Some(rx);
    }

    fn show_header(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(6.0);
            ui.label(
                RichText::new(crate::APP_DISPLAY_NAME.to_uppercase())
                    .size(26.0)
                    .color(ACCENT_COLOR)
                    .strong(),
            );
            ui.label(
                RichText::new(format!("v{}", crate::VERSION))
                    .size(11.0)
                    .color(TEXT_SECONDARY),
            );
            ui.add_space(12.0);
            ui.add(egui::Separator::default().spacing(8.0));
        });
    }

    fn show_selecting(&mut self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("Select the tools to install")
                .size(15.0)
                .color(TEXT_PRIMARY),
        );
        ui.add_space(8.0);

        egui::Frame::none()
            .fill(PANEL_COLOR)
            .inner_margin(10.0)
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .max_height(300.0)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for i in 0..self.catalog.apps.len() {
                            let app = &self.catalog.apps[i];
                            let mut label = format!("{} ({})", app.name, app.id);
                            if app.requires_admin {
                                label.push_str("  [admin]");
                            }
                            ui.checkbox(&mut self.selected[i], label);
                            if !app.description.is_empty() {
                                ui.label(
                                    RichText::new(format!("      {}", app.description))
                                        .size(11.0)
                                        .color(TEXT_SECONDARY),
                                );
                            }
                        }
                    });
            });

        let count = self.selected.iter().filter(|s| **s).count();
        ui.add_space(14.0);
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(
                RichText::new(format!("Install {} selected", count)).size(14.0),
            );
            if ui.add_enabled(count > 0, button).clicked() {
                self.start_installation();
            }
        });
    }

    fn show_installing(&mut self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("Installing...")
                .size(15.0)
                .color(TEXT_PRIMARY),
        );
        ui.add_space(6.0);
        ui.label(
            RichText::new(&self.status)
                .size(12.0)
                .color(TEXT_SECONDARY),
        );
        ui.add_space(10.0);
        ui.add(
            egui::ProgressBar::new(self.progress)
                .animate(true)
                .fill(ACCENT_COLOR),
        );
        ui.add_space(12.0);
        self.show_log(ui);
    }

    fn show_done(&mut self, ui: &mut egui::Ui, completed: usize, total: usize) {
        let all_ok = completed == total;
        ui.vertical_centered(|ui| {
            ui.add_space(4.0);
            if all_ok {
                ui.label(RichText::new("✓").size(34.0).color(SUCCESS_COLOR));
                ui.label(
                    RichText::new(format!(
                        "Installed {}/{} applications successfully",
                        completed, total
                    ))
                    .size(15.0)
                    .color(SUCCESS_COLOR),
                );
            } else {
                ui.label(RichText::new("⚠").size(34.0).color(WARNING_COLOR));
                ui.label(
                    RichText::new(format!(
                        "Installed {}/{} applications - check the log",
                        completed, total
                    ))
                    .size(15.0)
                    .color(WARNING_COLOR),
                );
            }
        });
        ui.add_space(12.0);
        self.show_log(ui);
        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            if ui.button(RichText::new("Close").size(14.0)).clicked() {
                std::process::exit(if all_ok { 0 } else { 1 });
            }
        });
    }

    fn show_log(&self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(PANEL_COLOR)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .max_height(260.0)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for line in &self.log_lines {
                            let color = match line.level {
                                LogLevel::Info => TEXT_PRIMARY,
                                LogLevel::Success => SUCCESS_COLOR,
                                LogLevel::Warning => WARNING_COLOR,
                                LogLevel::Error => ERROR_COLOR,
                            };
                            ui.label(
                                RichText::new(format!("[{}] {}", line.timestamp, line.message))
                                    .size(12.0)
                                    .color(color)
                                    .monospace(),
                            );
                        }
                    });
            });
    }
}

impl eframe::App for HangarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();

        if matches!(self.state, AppState::Installing) {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BG_COLOR).inner_margin(20.0))
            .show(ctx, |ui| {
                self.show_header(ui);
                ui.add_space(10.0);

                match self.state {
                    AppState::Selecting => self.show_selecting(ui),
                    AppState::Installing => self.show_installing(ui),
                    AppState::Done { completed, total } => {
                        self.show_done(ui, completed, total)
                    }
                }
            });
    }
}

fn setup_custom_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals.dark_mode = true;
    style.visuals.panel_fill = PANEL_COLOR;
    style.visuals.window_fill = BG_COLOR;
    style.visuals.extreme_bg_color = BG_COLOR;

    style.visuals.widgets.inactive.bg_fill = Color32::from_rgb(48, 52, 60);
    style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    style.visuals.widgets.inactive.rounding = Rounding::same(6.0);

    style.visuals.widgets.hovered.bg_fill = ACCENT_COLOR;
    style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    style.visuals.widgets.hovered.rounding = Rounding::same(6.0);

    style.visuals.widgets.active.bg_fill = ACCENT_HOVER;
    style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    style.visuals.widgets.active.rounding = Rounding::same(6.0);

    style.visuals.selection.bg_fill = ACCENT_COLOR;
    style.visuals.override_text_color = Some(TEXT_PRIMARY);

    style.spacing.button_padding = Vec2::new(16.0, 8.0);
    style.spacing.item_spacing = Vec2::new(8.0, 8.0);

    ctx.set_style(style);
}

/// Launch the desktop window over an already-loaded catalog
pub fn run_gui(catalog: Catalog) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 580.0])
            .with_min_inner_size([560.0, 440.0]),
        ..Default::default()
    };

    eframe::run_native(
        crate::APP_DISPLAY_NAME,
        options,
        Box::new(|cc| {
            setup_custom_style(&cc.egui_ctx);
            Ok(Box::new(HangarApp::new(catalog)))
        }),
    )
}
