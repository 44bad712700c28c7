use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use eframe::egui;
use tokio::sync::mpsc;

use crate::domain::models::{AppEvent, PairedDevice, ScanCommand, ScanState, StatusMessage, Tab};
use crate::domain::scene::SceneModel;
use crate::domain::settings::{Settings, SettingsService};
use crate::infrastructure::service::ScanService;
use crate::presentation::viewport::OrbitState;

const STATUS_LOG_CAPACITY: usize = 100;

pub struct RoomScanApp {
    // Services
    pub(crate) settings: Arc<Mutex<SettingsService>>,
    pub(crate) scene: Arc<Mutex<SceneModel>>,

    // Scan service channels
    pub(crate) scan_tx: mpsc::UnboundedSender<ScanCommand>,
    pub(crate) event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // Mirrored session state
    pub(crate) session_state: ScanState,
    pub(crate) status_message: Option<StatusMessage>,
    pub(crate) paired_device: Option<PairedDevice>,
    pub(crate) status_log: VecDeque<StatusMessage>,

    // UI state
    pub(crate) selected_tab: Tab,
    pub(crate) is_dark_mode: bool,
    pub(crate) orbit: OrbitState,

    // Logging guard
    pub(crate) _logging_guard: Option<crate::infrastructure::logging::LoggingGuard>,
}

impl RoomScanApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        crate::presentation::theme::configure_style(&cc.egui_ctx, true);

        let settings_service = SettingsService::new()
            .unwrap_or_else(|_| SettingsService::from_settings(Settings::default()));

        let logging_guard = crate::infrastructure::logging::init(
            &settings_service.get().log_settings,
        )
        .map_err(|e| eprintln!("Failed to initialize logging: {e}"))
        .ok();

        tracing::info!("Starting RoomScan");

        let settings = Arc::new(Mutex::new(settings_service));
        let scene = Arc::new(Mutex::new(SceneModel::new()));
        let (scan_tx, scan_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let service_settings = settings.clone();
        let service_scene = scene.clone();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create tokio runtime for the scan service");

            rt.block_on(ScanService::new(service_settings, service_scene, event_tx, scan_rx).run());
        });

        Self {
            settings,
            scene,
            scan_tx,
            event_rx,
            session_state: ScanState::Idle,
            status_message: None,
            paired_device: None,
            status_log: VecDeque::new(),
            selected_tab: Tab::Scan,
            is_dark_mode: true,
            orbit: OrbitState::default(),
            _logging_guard: logging_guard,
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::SessionState(state) => {
                    self.session_state = state;
                    if state == ScanState::Idle {
                        self.paired_device = None;
                    }
                }
                AppEvent::LogMessage(msg) => {
                    self.status_log.push_back(msg.clone());
                    while self.status_log.len() > STATUS_LOG_CAPACITY {
                        self.status_log.pop_front();
                    }
                    self.status_message = Some(msg);
                }
                AppEvent::DevicePaired(device) => self.paired_device = Some(device),
            }
        }
    }
}

impl eframe::App for RoomScanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        ctx.request_repaint();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.selectable_value(&mut self.selected_tab, Tab::Scan, "Scan");
                ui.selectable_value(&mut self.selected_tab, Tab::Settings, "Settings");
                ui.selectable_value(&mut self.selected_tab, Tab::Diagnostics, "Diagnostics");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let switch_icon = if self.is_dark_mode { "☀ Light" } else { "🌙 Dark" };
                    if ui.button(switch_icon).clicked() {
                        self.is_dark_mode = !self.is_dark_mode;
                        crate::presentation::theme::configure_style(ctx, self.is_dark_mode);
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.set_max_width(900.0);
                    ui.add_space(16.0);

                    use crate::presentation::tabs;
                    match self.selected_tab {
                        Tab::Scan => tabs::scan::render(self, ui),
                        Tab::Settings => tabs::settings::render(self, ui),
                        Tab::Diagnostics => tabs::diagnostics::render(self, ui),
                    }

                    ui.add_space(40.0);
                });
            });
        });
    }
}
