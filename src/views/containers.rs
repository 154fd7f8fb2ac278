use crate::deploy::DeployStatus;
use crate::flux::{format_created, FluxContainer, FluxWorkload};
use crate::views::common::*;
use egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

#[derive(Default)]
pub struct ContainersView {
    pub search_filter: String,
}

#[derive(Clone)]
pub enum ContainerAction {
    Deploy(String),
    Acknowledge,
    Back,
}

impl ContainersView {
    pub fn show(
        &mut self,
        ui: &mut Ui,
        workload: &FluxWorkload,
        containers: &[FluxContainer],
        deploy_status: &DeployStatus,
        loading: bool,
        error: Option<&str>,
    ) -> Option<ContainerAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            if ui.button("< Workloads").clicked() {
                action = Some(ContainerAction::Back);
            }
            section_header(ui, workload.id.as_str());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                search_bar(ui, &mut self.search_filter, "Search versions...");
            });
        });

        if loading {
            loading_spinner(ui);
        } else if let Some(err) = error {
            error_label(ui, err);
        } else if containers.is_empty() {
            empty_state(ui, "No containers for this workload");
        } else {
            for container in containers {
                self.show_container(ui, container, &mut action);
            }
        }

        self.show_deployment_sheet(ui, deploy_status, &mut action);

        action
    }

    fn show_container(
        &mut self,
        ui: &mut Ui,
        container: &FluxContainer,
        action: &mut Option<ContainerAction>,
    ) {
        egui::CollapsingHeader::new(RichText::new(&container.name).strong())
            .default_open(true)
            .show(ui, |ui| {
                info_row(ui, "Current", &container.current.id);
                ui.add_space(4.0);

                let filtered: Vec<_> = container
                    .available_versions()
                    .iter()
                    .filter(|d| {
                        self.search_filter.is_empty()
                            || d.id
                                .to_lowercase()
                                .contains(&self.search_filter.to_lowercase())
                    })
                    .collect();

                // Distinct table id per container, there may be several per workload.
                ui.push_id(&container.name, |ui| {
                    TableBuilder::new(ui)
                        .striped(true)
                        .resizable(true)
                        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                        .column(Column::auto().at_least(320.0)) // Version
                        .column(Column::remainder().at_least(90.0)) // Created
                        .min_scrolled_height(0.0)
                        .header(25.0, |mut header| {
                            header.col(|ui| { ui.strong("Version"); });
                            header.col(|ui| { ui.strong("Created"); });
                        })
                        .body(|mut body| {
                            for description in &filtered {
                                let is_current = container.is_current(description);
                                body.row(26.0, |mut row| {
                                    row.col(|ui| {
                                        let text = truncate_head(&description.id, 60);
                                        let label = if is_current {
                                            RichText::new(text).color(CURRENT_VERSION_COLOR)
                                        } else {
                                            RichText::new(text)
                                        };
                                        ui.label(label)
                                            .on_hover_text(&description.id)
                                            .context_menu(|ui| {
                                                if ui.button("Deploy This Version…").clicked() {
                                                    *action = Some(ContainerAction::Deploy(
                                                        description.id.clone(),
                                                    ));
                                                    ui.close_menu();
                                                }
                                            });
                                    });
                                    row.col(|ui| {
                                        ui.label(format_created(description.created_at.as_ref()));
                                    });
                                });
                            }
                        });
                });
            });
        ui.add_space(8.0);
    }

    /// The deployment modal is visible exactly while the status is not idle.
    fn show_deployment_sheet(
        &self,
        ui: &mut Ui,
        deploy_status: &DeployStatus,
        action: &mut Option<ContainerAction>,
    ) {
        if deploy_status.is_idle() {
            return;
        }

        egui::Window::new("Deployment")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ui.ctx(), |ui| {
                ui.vertical_centered(|ui| match deploy_status {
                    DeployStatus::Idle => {}
                    DeployStatus::Deploying => {
                        ui.add_space(8.0);
                        ui.label("Deploying New Version…");
                        ui.add_space(8.0);
                        ui.spinner();
                        ui.add_space(8.0);
                    }
                    DeployStatus::Deployed(Ok(())) => {
                        ui.add_space(8.0);
                        ui.label("New Version Is Deployed");
                        ui.add_space(8.0);
                        ui.label(
                            "If your deployment is monitored by Flagger, your new release is \
                             not yet available for everyone.\nMonitor the progressive deployment \
                             using Kiali.",
                        );
                        ui.add_space(12.0);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if primary_button(ui, "OK") {
                                *action = Some(ContainerAction::Acknowledge);
                            }
                        });
                    }
                    DeployStatus::Deployed(Err(failure)) => {
                        ui.add_space(8.0);
                        ui.label(
                            RichText::new(format!(
                                "Error deploying the release: {}",
                                failure.message
                            ))
                            .color(egui::Color32::from_rgb(239, 68, 68)),
                        );
                        ui.add_space(12.0);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if primary_button(ui, "OK") {
                                *action = Some(ContainerAction::Acknowledge);
                            }
                        });
                    }
                });
            });
    }
}
