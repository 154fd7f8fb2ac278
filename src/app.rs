use crate::deploy::{DeployController, DeployStatus};
use crate::flux::{FluxClient, FluxContainer, FluxWorkload, WorkloadId};
use crate::settings::FluxSettings;
use crate::views::{
    containers::ContainerAction, endpoints::EndpointAction, workloads::WorkloadAction,
    ContainersView, EndpointsView, WorkloadsView,
};
use eframe::egui;
use egui::{Color32, RichText};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Clone, Copy, PartialEq, Default)]
pub enum View {
    #[default]
    Workloads,
    Containers,
    Endpoints,
}

pub struct FluxDashboard {
    runtime: Arc<Runtime>,
    flux_client: FluxClient,
    settings: FluxSettings,

    // State
    current_view: View,
    connected_endpoint: Option<String>,

    // Data
    workloads: Vec<FluxWorkload>,
    selected_workload: Option<FluxWorkload>,
    containers: Vec<FluxContainer>,

    // Loading states
    loading_workloads: bool,
    loading_containers: bool,

    // Errors
    error_workloads: Option<String>,
    error_containers: Option<String>,

    // Deploy state machine, one controller per inspected workload
    deploy_controller: Option<DeployController>,
    deploy_events: Option<Receiver<DeployStatus>>,

    // Views
    workloads_view: WorkloadsView,
    containers_view: ContainersView,
    endpoints_view: EndpointsView,

    // Message channels
    message_tx: Sender<AppMessage>,
    message_rx: Receiver<AppMessage>,

    // Notifications
    notifications: Vec<Notification>,
}

struct Notification {
    message: String,
    is_error: bool,
    timestamp: std::time::Instant,
}

enum AppMessage {
    EndpointConnected(Result<String, String>),
    WorkloadsLoaded(Result<Vec<FluxWorkload>, String>),
    ContainersLoaded(WorkloadId, Result<Vec<FluxContainer>, String>),
}

impl FluxDashboard {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let runtime = Arc::new(Runtime::new().expect("Failed to create Tokio runtime"));
        let (message_tx, message_rx) = channel();
        let settings = FluxSettings::load(cc.storage);

        let mut app = Self {
            runtime,
            flux_client: FluxClient::new(),
            settings,
            current_view: View::Workloads,
            connected_endpoint: None,
            workloads: vec![],
            selected_workload: None,
            containers: vec![],
            loading_workloads: false,
            loading_containers: false,
            error_workloads: None,
            error_containers: None,
            deploy_controller: None,
            deploy_events: None,
            workloads_view: WorkloadsView::default(),
            containers_view: ContainersView::default(),
            endpoints_view: EndpointsView::default(),
            message_tx,
            message_rx,
            notifications: vec![],
        };

        app.connect_endpoint();
        app
    }

    fn connect_endpoint(&mut self) {
        let Some(url) = self.settings.selected_url().map(str::to_owned) else {
            return;
        };
        let client = self.flux_client.clone();
        let tx = self.message_tx.clone();

        self.runtime.spawn(async move {
            let result = async {
                client.set_endpoint(&url).await?;
                client.ping().await
            }
            .await;
            match result {
                Ok(()) => {
                    let _ = tx.send(AppMessage::EndpointConnected(Ok(url)));
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::EndpointConnected(Err(format!("{e:#}"))));
                }
            }
        });
    }

    fn refresh_current_view(&mut self) {
        match self.current_view {
            View::Workloads => self.load_workloads(),
            View::Containers => {
                self.load_containers();
                self.load_workloads();
            }
            View::Endpoints => {}
        }
    }

    fn load_workloads(&mut self) {
        self.loading_workloads = true;
        self.error_workloads = None;

        let client = self.flux_client.clone();
        let tx = self.message_tx.clone();

        self.runtime.spawn(async move {
            match client.list_workloads().await {
                Ok(workloads) => {
                    let _ = tx.send(AppMessage::WorkloadsLoaded(Ok(workloads)));
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::WorkloadsLoaded(Err(format!("{e:#}"))));
                }
            }
        });
    }

    fn load_containers(&mut self) {
        let Some(workload) = &self.selected_workload else {
            return;
        };
        let workload_id = workload.id.clone();

        self.loading_containers = true;
        self.error_containers = None;

        let client = self.flux_client.clone();
        let tx = self.message_tx.clone();

        self.runtime.spawn(async move {
            match client.list_images(&workload_id).await {
                Ok(images) => {
                    let containers = images
                        .into_iter()
                        .find(|image| image.id == workload_id)
                        .map(|image| image.containers)
                        .unwrap_or_default();
                    let _ = tx.send(AppMessage::ContainersLoaded(workload_id, Ok(containers)));
                }
                Err(e) => {
                    let _ =
                        tx.send(AppMessage::ContainersLoaded(workload_id, Err(format!("{e:#}"))));
                }
            }
        });
    }

    fn inspect_workload(&mut self, workload: FluxWorkload) {
        let controller = DeployController::new(
            Arc::new(self.flux_client.clone()),
            self.runtime.handle().clone(),
            workload.id.clone(),
        );
        self.deploy_events = Some(controller.subscribe());
        self.deploy_controller = Some(controller);
        self.selected_workload = Some(workload);
        self.containers = vec![];
        self.current_view = View::Containers;
        self.load_containers();
    }

    fn handle_workload_action(&mut self, action: WorkloadAction) {
        match action {
            WorkloadAction::Inspect(workload) => self.inspect_workload(workload),
        }
    }

    fn handle_container_action(&mut self, action: ContainerAction) {
        match action {
            ContainerAction::Deploy(container_id) => {
                if let Some(controller) = &self.deploy_controller {
                    if let Err(e) = controller.deploy(&container_id) {
                        self.add_notification(&format!("Error: {}", e), true);
                    }
                }
            }
            ContainerAction::Acknowledge => {
                if let Some(controller) = &self.deploy_controller {
                    controller.acknowledge();
                }
            }
            ContainerAction::Back => {
                self.current_view = View::Workloads;
            }
        }
    }

    fn handle_endpoint_action(&mut self, action: EndpointAction) {
        match action {
            EndpointAction::Add(url) => {
                let was_empty = self.settings.flux_urls.is_empty();
                self.settings.add_url(url);
                if was_empty {
                    self.connect_endpoint();
                }
            }
            EndpointAction::Remove(index) => {
                let removed_selected = index == self.settings.selected_flux_url_index;
                self.settings.remove_url(index);
                if removed_selected {
                    self.connected_endpoint = None;
                    self.connect_endpoint();
                }
            }
            EndpointAction::Select(index) => {
                self.settings.select(index);
                self.connected_endpoint = None;
                self.connect_endpoint();
            }
        }
    }

    fn process_messages(&mut self) {
        while let Ok(msg) = self.message_rx.try_recv() {
            match msg {
                AppMessage::EndpointConnected(result) => match result {
                    Ok(url) => {
                        self.connected_endpoint = Some(url);
                        self.add_notification("Connected to Flux", false);
                        self.load_workloads();
                    }
                    Err(e) => {
                        self.add_notification(&format!("Failed to connect: {}", e), true);
                    }
                },
                AppMessage::WorkloadsLoaded(result) => {
                    self.loading_workloads = false;
                    match result {
                        Ok(workloads) => self.workloads = workloads,
                        Err(e) => self.error_workloads = Some(e),
                    }
                }
                AppMessage::ContainersLoaded(workload_id, result) => {
                    // A stale load for a previously selected workload is dropped.
                    if self.selected_workload.as_ref().map(|w| &w.id) != Some(&workload_id) {
                        continue;
                    }
                    self.loading_containers = false;
                    match result {
                        Ok(containers) => self.containers = containers,
                        Err(e) => self.error_containers = Some(e),
                    }
                }
            }
        }

        self.process_deploy_events();
    }

    fn process_deploy_events(&mut self) {
        let mut acknowledged = false;
        if let Some(events) = &self.deploy_events {
            while let Ok(status) = events.try_recv() {
                tracing::debug!(?status, "deploy status changed");
                if status.is_idle() {
                    acknowledged = true;
                }
            }
        }
        // Once a deploy is acknowledged the current version may have moved.
        if acknowledged {
            self.refresh_current_view();
        }
    }

    fn add_notification(&mut self, message: &str, is_error: bool) {
        self.notifications.push(Notification {
            message: message.to_string(),
            is_error,
            timestamp: std::time::Instant::now(),
        });
    }

    fn show_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.add_space(8.0);
            ui.heading(RichText::new("Flux Dashboard").strong());
            ui.add_space(16.0);

            // Endpoint selector
            ui.label(RichText::new("Endpoint").strong());
            egui::ComboBox::from_id_salt("endpoint_selector")
                .selected_text(
                    self.settings
                        .selected_url()
                        .unwrap_or("Select endpoint..."),
                )
                .width(180.0)
                .show_ui(ui, |ui| {
                    let mut select = None;
                    for (index, url) in self.settings.flux_urls.iter().enumerate() {
                        let selected = index == self.settings.selected_flux_url_index;
                        if ui.selectable_label(selected, url).clicked() && !selected {
                            select = Some(index);
                        }
                    }
                    if let Some(index) = select {
                        self.handle_endpoint_action(EndpointAction::Select(index));
                    }
                });
            ui.add_space(4.0);
            if self.connected_endpoint.is_some() {
                ui.label(RichText::new("Connected").small().color(Color32::from_rgb(34, 197, 94)));
            } else {
                ui.label(RichText::new("Not connected").small().color(Color32::from_rgb(156, 163, 175)));
            }

            ui.add_space(24.0);
            ui.separator();
            ui.add_space(8.0);

            // Navigation
            ui.label(RichText::new("GitOps").strong().small());
            if ui
                .selectable_label(self.current_view == View::Workloads, "  Workloads")
                .clicked()
            {
                self.current_view = View::Workloads;
                self.load_workloads();
            }
            if self.selected_workload.is_some()
                && ui
                    .selectable_label(self.current_view == View::Containers, "  Containers")
                    .clicked()
            {
                self.current_view = View::Containers;
                self.load_containers();
            }

            ui.add_space(12.0);
            ui.label(RichText::new("Configuration").strong().small());
            if ui
                .selectable_label(self.current_view == View::Endpoints, "  Endpoints")
                .clicked()
            {
                self.current_view = View::Endpoints;
            }

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                ui.add_space(8.0);
                if ui.button("Refresh").clicked() {
                    self.refresh_current_view();
                }
            });
        });
    }

    fn show_notifications(&mut self, ctx: &egui::Context) {
        let now = std::time::Instant::now();
        self.notifications
            .retain(|n| now.duration_since(n.timestamp).as_secs() < 5);

        for (i, notification) in self.notifications.iter().enumerate() {
            let color = if notification.is_error {
                Color32::from_rgb(239, 68, 68)
            } else {
                Color32::from_rgb(34, 197, 94)
            };

            egui::Area::new(egui::Id::new(format!("notification_{}", i)))
                .anchor(egui::Align2::RIGHT_TOP, [-20.0, 50.0 + i as f32 * 60.0])
                .show(ctx, |ui| {
                    egui::Frame::none()
                        .fill(Color32::from_rgb(30, 30, 30))
                        .stroke(egui::Stroke::new(2.0, color))
                        .rounding(8.0)
                        .inner_margin(12.0)
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.colored_label(color, "●");
                                ui.label(&notification.message);
                            });
                        });
                });
        }
    }
}

impl eframe::App for FluxDashboard {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_messages();

        // Request continuous repaints so async results and transitions show up
        ctx.request_repaint_after(std::time::Duration::from_millis(100));

        self.show_notifications(ctx);

        // Until an endpoint exists there is nothing to browse
        if self.settings.flux_urls.is_empty() && self.current_view != View::Endpoints {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(100.0);
                    ui.heading("Flux Dashboard");
                    ui.add_space(24.0);
                    ui.label("No Flux endpoint configured yet.");
                    ui.add_space(16.0);
                    if ui.button("Configure Endpoints").clicked() {
                        self.current_view = View::Endpoints;
                    }
                });
            });
            return;
        }

        // Sidebar
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .default_width(220.0)
            .show(ctx, |ui| {
                self.show_sidebar(ui);
            });

        // Main content
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);

            match self.current_view {
                View::Workloads => {
                    if let Some(action) = self.workloads_view.show(
                        ui,
                        &self.workloads,
                        self.loading_workloads,
                        self.error_workloads.as_deref(),
                    ) {
                        self.handle_workload_action(action);
                    }
                }
                View::Containers => {
                    let (Some(workload), Some(controller)) =
                        (self.selected_workload.clone(), self.deploy_controller.as_ref())
                    else {
                        self.current_view = View::Workloads;
                        return;
                    };
                    let status = controller.status();
                    if let Some(action) = self.containers_view.show(
                        ui,
                        &workload,
                        &self.containers,
                        &status,
                        self.loading_containers,
                        self.error_containers.as_deref(),
                    ) {
                        self.handle_container_action(action);
                    }
                }
                View::Endpoints => {
                    if let Some(action) = self.endpoints_view.show(ui, &self.settings) {
                        self.handle_endpoint_action(action);
                    }
                }
            }
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings.store(storage);
    }
}
