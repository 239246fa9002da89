use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, vec2};

use crate::explorer::TapOutcome;
use crate::focus::Viewport;
use crate::graph::{Expansion, GraphNode};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, circle_visible, draw_background, label_size, node_diameter, pose_from_view,
    rgb_color, to_vec2, view_from_pose, world_to_screen,
};

const ARROW_SIZE: f32 = 6.0;

struct Palette {
    node: Color32,
    edge: Color32,
    edge_width: f32,
    selected: Color32,
    selected_border: Color32,
    highlighted: Color32,
    highlighted_border: Color32,
    highlighted_border_width: f32,
}

impl ViewModel {
    fn palette(&self) -> Palette {
        let style = self.explorer.style();
        let color = |selector: &str, property: &str, fallback: Color32| {
            style
                .color(selector, property)
                .map(rgb_color)
                .unwrap_or(fallback)
        };

        Palette {
            node: color("node", "background-color", Color32::from_rgb(111, 177, 252)),
            edge: color("edge", "line-color", Color32::from_gray(204)),
            edge_width: style.number("edge", "width").unwrap_or(1.0) as f32,
            selected: color("node:selected", "background-color", Color32::from_rgb(255, 165, 0)),
            selected_border: color("node:selected", "border-color", Color32::BLACK),
            highlighted: color(".highlighted", "background-color", Color32::YELLOW),
            highlighted_border: color(
                ".highlighted",
                "border-color",
                Color32::from_rgb(255, 193, 7),
            ),
            highlighted_border_width: style
                .number(".highlighted", "border-width")
                .unwrap_or(2.0) as f32,
        }
    }

    /// Runs the camera before anything is drawn so this frame already shows
    /// the pose for the graph as it is after last frame's mutations.
    fn step_camera(&mut self, ui: &Ui, viewport: Viewport) {
        let now = ui.input(|input| input.time);
        let current = pose_from_view(self.pan, self.zoom);
        self.explorer.run_pending_focus(viewport, current, now);

        if let Some(pose) = self.explorer.advance_camera(now) {
            (self.pan, self.zoom) = view_from_pose(pose);
            ui.ctx().request_repaint();
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.step_camera(
            ui,
            Viewport::new(f64::from(rect.width()), f64::from(rect.height())),
        );
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        draw_background(&painter, rect, self.pan, self.zoom);

        let palette = self.palette();
        let graph = self.explorer.graph();
        if graph.is_empty() {
            ui.label("The index produced no nodes.");
            return;
        }

        let (pan, zoom) = (self.pan, self.zoom);
        let node_scale = zoom.powf(0.6);
        let screen_nodes = graph
            .nodes()
            .iter()
            .map(|node| {
                let position = world_to_screen(rect, pan, zoom, to_vec2(node.position));
                let radius = (node_diameter(&node.id) * 0.5 * node_scale).clamp(2.5, 40.0);
                (position, radius)
            })
            .collect::<Vec<_>>();
        let screen_of = |id: &str| -> Option<(Pos2, f32)> {
            let node = graph.node(id)?;
            Some((
                world_to_screen(rect, pan, zoom, to_vec2(node.position)),
                (node_diameter(&node.id) * 0.5 * node_scale).clamp(2.5, 40.0),
            ))
        };

        let edge_stroke = Stroke::new(
            (palette.edge_width * zoom.sqrt()).clamp(0.5, 3.0),
            palette.edge,
        );
        for edge in graph.edges() {
            let (Some((start, _)), Some((end, target_radius))) =
                (screen_of(&edge.source_id), screen_of(&edge.target_id))
            else {
                continue;
            };
            if !rect.intersects(egui::Rect::from_two_pos(start, end).expand(2.0)) {
                continue;
            }

            painter.line_segment([start, end], edge_stroke);

            let direction = (end - start).normalized();
            if direction.length_sq() > 0.0 {
                let tip = end - direction * target_radius;
                let back = tip - direction * ARROW_SIZE;
                let side = vec2(-direction.y, direction.x) * (ARROW_SIZE * 0.5);
                painter.add(Shape::convex_polygon(
                    vec![tip, back + side, back - side],
                    palette.edge,
                    Stroke::NONE,
                ));
            }
        }

        let hovered = Self::hovered_index(ui, &screen_nodes);
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let selected_id = self.explorer.selected_leaf().map(|node| node.id.as_str());
        let mut loading_visible = false;

        for (index, node) in graph.nodes().iter().enumerate() {
            let (position, radius) = screen_nodes[index];
            if !circle_visible(rect, position, radius + 4.0) {
                continue;
            }

            let is_selected = selected_id == Some(node.id.as_str());
            let is_highlighted = self.explorer.is_highlighted(&node.id);
            let is_hovered = hovered == Some(index);

            let mut fill = if is_selected {
                palette.selected
            } else if is_highlighted {
                palette.highlighted
            } else {
                palette.node
            };
            if is_hovered {
                fill = blend_color(fill, Color32::WHITE, 0.25);
            }
            painter.circle_filled(position, radius, fill);

            if is_selected {
                painter.circle_stroke(position, radius, Stroke::new(3.0, palette.selected_border));
            } else if is_highlighted {
                painter.circle_stroke(
                    position,
                    radius,
                    Stroke::new(palette.highlighted_border_width, palette.highlighted_border),
                );
            }

            if node.expansion == Expansion::Loading {
                loading_visible = true;
                let phase = (ui.input(|input| input.time) * 3.0).sin() as f32 * 0.5 + 0.5;
                painter.circle_stroke(
                    position,
                    radius + 3.0 + phase * 3.0,
                    Stroke::new(1.5, Color32::from_white_alpha(120)),
                );
            }

            let font_size = label_size(&node.id) * node_scale;
            if is_hovered || is_highlighted || is_selected || font_size >= 7.0 {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    node.label.as_str(),
                    FontId::proportional(font_size.clamp(9.0, 18.0)),
                    Color32::from_gray(236),
                );
            }
        }

        if loading_visible {
            ui.ctx().request_repaint();
        }

        if let Some(node) = hovered.and_then(|index| graph.nodes().get(index)) {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                hover_text(node),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        let tapped = response
            .clicked_by(egui::PointerButton::Primary)
            .then(|| hovered.and_then(|index| graph.nodes().get(index)))
            .flatten()
            .map(|node| node.id.clone());

        if let Some(node_id) = tapped {
            self.apply_tap(ui, &node_id);
        }
    }

    fn apply_tap(&mut self, ui: &Ui, node_id: &str) {
        match self.explorer.tap(node_id) {
            TapOutcome::Expand(ticket) => {
                self.notice = None;
                self.expansions.spawn(
                    ui.ctx(),
                    self.explorer.source(),
                    self.explorer.language().to_owned(),
                    ticket,
                );
            }
            TapOutcome::ShowDetails | TapOutcome::Focused | TapOutcome::Ignored => {}
        }
    }
}

fn hover_text(node: &GraphNode) -> String {
    let state = match node.expansion {
        Expansion::Loading => "  |  loading",
        Expansion::Collapsed if node.is_expandable() => "  |  click to expand",
        _ => "",
    };
    format!("{}  |  {}{state}", node.compound_label(), node.level.label())
}
