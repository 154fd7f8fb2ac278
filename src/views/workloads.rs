use crate::flux::FluxWorkload;
use crate::views::common::*;
use egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

#[derive(Default)]
pub struct WorkloadsView {
    pub search_filter: String,
}

#[derive(Clone)]
pub enum WorkloadAction {
    Inspect(FluxWorkload),
}

impl WorkloadsView {
    pub fn show(
        &mut self,
        ui: &mut Ui,
        workloads: &[FluxWorkload],
        loading: bool,
        error: Option<&str>,
    ) -> Option<WorkloadAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            section_header(ui, "Workloads");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                search_bar(ui, &mut self.search_filter, "Search workloads...");
            });
        });

        if loading {
            loading_spinner(ui);
            return None;
        }

        if let Some(err) = error {
            error_label(ui, err);
            return None;
        }

        let filtered: Vec<_> = workloads
            .iter()
            .filter(|w| {
                self.search_filter.is_empty()
                    || w.id
                        .as_str()
                        .to_lowercase()
                        .contains(&self.search_filter.to_lowercase())
            })
            .collect();

        if filtered.is_empty() {
            empty_state(ui, "No workloads found");
            return None;
        }

        let available_height = ui.available_height();

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(260.0)) // Workload
            .column(Column::auto().at_least(100.0)) // Status
            .column(Column::auto().at_least(90.0))  // Containers
            .column(Column::auto().at_least(90.0))  // Automated
            .column(Column::auto().at_least(70.0))  // Locked
            .column(Column::remainder().at_least(100.0)) // Actions
            .min_scrolled_height(0.0)
            .max_scroll_height(available_height - 50.0)
            .header(25.0, |mut header| {
                header.col(|ui| { ui.strong("Workload"); });
                header.col(|ui| { ui.strong("Status"); });
                header.col(|ui| { ui.strong("Containers"); });
                header.col(|ui| { ui.strong("Automated"); });
                header.col(|ui| { ui.strong("Locked"); });
                header.col(|ui| { ui.strong("Actions"); });
            })
            .body(|mut body| {
                for workload in &filtered {
                    body.row(30.0, |mut row| {
                        row.col(|ui| {
                            if ui.link(workload.id.as_str()).clicked() {
                                action = Some(WorkloadAction::Inspect((*workload).clone()));
                            }
                        });
                        row.col(|ui| {
                            status_badge(ui, &workload.status, status_color(&workload.status));
                        });
                        row.col(|ui| {
                            ui.label(workload.containers.len().to_string());
                        });
                        row.col(|ui| {
                            ui.label(if workload.automated { "Yes" } else { "No" });
                        });
                        row.col(|ui| {
                            if workload.locked {
                                ui.label(RichText::new("Locked").color(egui::Color32::from_rgb(234, 179, 8)));
                            } else {
                                ui.label("No");
                            }
                        });
                        row.col(|ui| {
                            if ui.small_button("Versions").clicked() {
                                action = Some(WorkloadAction::Inspect((*workload).clone()));
                            }
                        });
                    });
                }
            });

        action
    }
}
