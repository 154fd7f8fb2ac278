use crate::settings::FluxSettings;
use crate::views::common::*;
use egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

#[derive(Default)]
pub struct EndpointsView {
    pub new_url: String,
}

#[derive(Clone)]
pub enum EndpointAction {
    Add(String),
    Remove(usize),
    Select(usize),
}

impl EndpointsView {
    pub fn show(&mut self, ui: &mut Ui, settings: &FluxSettings) -> Option<EndpointAction> {
        let mut action = None;

        section_header(ui, "Flux Endpoints");

        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.new_url)
                    .hint_text("http://flux.example.com:3030")
                    .desired_width(320.0),
            );
            if ui.button("Add").clicked() && !self.new_url.trim().is_empty() {
                action = Some(EndpointAction::Add(self.new_url.trim().to_owned()));
                self.new_url.clear();
            }
        });
        ui.add_space(8.0);

        if settings.flux_urls.is_empty() {
            empty_state(ui, "No Flux endpoints configured");
            return action;
        }

        let available_height = ui.available_height();

        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(320.0)) // URL
            .column(Column::auto().at_least(80.0))  // Current
            .column(Column::remainder().at_least(140.0)) // Actions
            .min_scrolled_height(0.0)
            .max_scroll_height(available_height - 50.0)
            .header(25.0, |mut header| {
                header.col(|ui| { ui.strong("URL"); });
                header.col(|ui| { ui.strong("Current"); });
                header.col(|ui| { ui.strong("Actions"); });
            })
            .body(|mut body| {
                for (index, url) in settings.flux_urls.iter().enumerate() {
                    let selected = index == settings.selected_flux_url_index;
                    body.row(30.0, |mut row| {
                        row.col(|ui| {
                            ui.label(url);
                        });
                        row.col(|ui| {
                            if selected {
                                ui.label(RichText::new("Current").color(CURRENT_VERSION_COLOR));
                            }
                        });
                        row.col(|ui| {
                            ui.horizontal(|ui| {
                                if !selected && ui.small_button("Select").clicked() {
                                    action = Some(EndpointAction::Select(index));
                                }
                                if danger_button(ui, "Remove") {
                                    action = Some(EndpointAction::Remove(index));
                                }
                            });
                        });
                    });
                }
            });

        action
    }
}
