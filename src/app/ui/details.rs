use eframe::egui::{self, RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Skill Details");
        ui.add_space(6.0);

        let Some(node) = self.explorer.selected_leaf() else {
            ui.label("Expand a detailed field and select one of its skills.");
            return;
        };

        ui.label(RichText::new(node.label.as_str()).strong());
        ui.small(node.id.as_str());
        if let Some(parent_id) = &node.parent_id {
            let parent = self
                .explorer
                .graph()
                .node(parent_id)
                .map(|parent| parent.compound_label())
                .unwrap_or_else(|| parent_id.clone());
            ui.label(format!("Field: {parent}"));
        }
        ui.add_space(6.0);

        let Some(metadata) = &node.metadata else {
            return;
        };

        if let Some(description) = metadata
            .description
            .as_deref()
            .filter(|text| !text.trim().is_empty())
        {
            ui.label(description);
        }

        if let Some(wiki_link) = &metadata.wiki_link {
            ui.hyperlink_to("Wikipedia", wiki_link);
        }

        if !metadata.resources.is_empty() {
            ui.separator();
            ui.label(RichText::new("Resources").strong());
            egui::ScrollArea::vertical()
                .id_salt("resources_scroll")
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for resource in &metadata.resources {
                        ui.hyperlink_to(resource.display_text(), &resource.link);
                    }
                });
        }

        ui.add_space(10.0);
        if ui.button("Close").clicked() {
            self.explorer.clear_selection();
        }
    }
}
