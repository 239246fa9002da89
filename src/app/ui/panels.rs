use eframe::egui::{self, Align, Context, Key, Layout, RichText, Ui};

use crate::config::{LANGUAGES, language_name};
use crate::search::SearchStatus;

use super::super::ViewModel;

impl ViewModel {
    /// Draws the top bar. Returns a language the user picked, if it differs
    /// from the current one.
    pub(in crate::app) fn draw_top_bar(
        &mut self,
        ctx: &Context,
        is_reloading: bool,
    ) -> Option<String> {
        let mut requested_language = None;

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Taxonomy Atlas");
                    ui.separator();

                    let search_box = ui.add(
                        egui::TextEdit::singleline(&mut self.search)
                            .hint_text("Search fields and skills")
                            .desired_width(260.0),
                    );
                    let submitted =
                        search_box.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
                    if ui.button("Search").clicked() || submitted {
                        self.explorer.search(&self.search);
                    } else if search_box.changed() && self.search.is_empty() {
                        self.explorer.search("");
                    }
                    if ui.button("Fit").on_hover_text("Show the whole graph").clicked() {
                        self.explorer.fit_all();
                    }

                    ui.separator();
                    let current = self.explorer.language().to_owned();
                    let selected = language_name(&self.language_choice)
                        .map(str::to_owned)
                        .unwrap_or_else(|| self.language_choice.clone());
                    egui::ComboBox::from_id_salt("language")
                        .selected_text(selected)
                        .show_ui(ui, |ui| {
                            for language in LANGUAGES {
                                ui.selectable_value(
                                    &mut self.language_choice,
                                    language.code.to_owned(),
                                    language.name,
                                );
                            }
                        });
                    if self.language_choice != current && !is_reloading {
                        requested_language = Some(self.language_choice.clone());
                    }
                    if is_reloading {
                        ui.spinner();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let graph = self.explorer.graph();
                        ui.label(format!(
                            "nodes: {}  edges: {}",
                            graph.node_count(),
                            graph.edge_count()
                        ));
                        if let Some(notice) = &self.notice {
                            ui.colored_label(ui.visuals().warn_fg_color, notice.as_str());
                        }
                    });
                });
            });

        requested_language
    }

    pub(in crate::app) fn draw_results(&mut self, ui: &mut Ui) {
        ui.heading("Search Results");
        ui.add_space(6.0);

        match self.explorer.search_status() {
            SearchStatus::NotRun => {
                ui.label("Type a term and press Search.");
                return;
            }
            SearchStatus::NoMatches { term } => {
                ui.label(format!("No results for \"{term}\"."));
                return;
            }
            SearchStatus::Matches { term, count } => {
                ui.label(RichText::new(format!("{count} results for \"{term}\"")).strong());
            }
        }
        ui.separator();

        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("search_results_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for found in self.explorer.search_results() {
                    if ui.link(found.label.as_str()).clicked() {
                        picked = Some(found.clone());
                    }
                }
            });

        if let Some(found) = picked
            && !self.explorer.select_result(&found)
        {
            self.notice = Some(format!("{} is no longer in the graph", found.id));
        }
    }
}
