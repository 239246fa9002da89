//! Camera focus scheduling.
//!
//! A focus request is only recorded when it is made. It runs at the start of
//! the next frame, after every graph mutation of the current one has been
//! applied, and replaces any earlier request or animation.

mod animation;

use tracing::debug;

use crate::graph::{GraphState, Point};

use animation::{CameraAnimation, fit_pose};

pub use animation::{CameraPose, MAX_ZOOM, MIN_ZOOM, Viewport};

/// Padding around a single tapped or expanded node.
pub const NODE_PADDING: f64 = 600.0;
/// Padding around a set of search results.
pub const SEARCH_PADDING: f64 = 100.0;
/// Padding for fit-to-screen.
pub const FIT_ALL_PADDING: f64 = 50.0;

#[derive(Clone, Debug, PartialEq)]
pub enum FocusTarget {
    Node(String),
    Nodes(Vec<String>),
    Everything,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FocusRequest {
    pub target: FocusTarget,
    pub padding: f64,
}

impl FocusRequest {
    pub fn new(target: FocusTarget, padding: f64) -> Self {
        Self { target, padding }
    }

    /// Positions of the targeted nodes still present in `graph`.
    fn resolve(&self, graph: &GraphState) -> Vec<Point> {
        match &self.target {
            FocusTarget::Node(id) => graph.node(id).map(|node| node.position).into_iter().collect(),
            FocusTarget::Nodes(ids) => ids
                .iter()
                .filter_map(|id| graph.node(id).map(|node| node.position))
                .collect(),
            FocusTarget::Everything => graph.nodes().iter().map(|node| node.position).collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FocusScheduler {
    pending: Option<FocusRequest>,
    animation: Option<CameraAnimation>,
}

impl FocusScheduler {
    /// Schedules `request` for the next frame. Any pending request and any
    /// running animation are dropped.
    pub fn request(&mut self, request: FocusRequest) {
        if self.animation.take().is_some() {
            debug!("stopped camera animation for a new focus request");
        }
        if let Some(previous) = self.pending.replace(request) {
            debug!(focus = ?previous.target, "superseded pending focus request");
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.animation = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Runs the pending request against the graph as it is now. Targets that
    /// have left the graph are skipped; when nothing is left the request is
    /// dropped without starting an animation.
    pub fn run_pending(
        &mut self,
        graph: &GraphState,
        viewport: Viewport,
        current: CameraPose,
        now: f64,
    ) -> Option<&CameraAnimation> {
        let request = self.pending.take()?;
        let points = request.resolve(graph);

        let Some(target) = fit_pose(&points, viewport, request.padding) else {
            debug!(focus = ?request.target, "dropped focus request with no present nodes");
            return None;
        };

        debug!(
            nodes = points.len(),
            zoom = target.zoom,
            "starting camera animation"
        );
        self.animation = Some(CameraAnimation::new(current, target, now));
        self.animation.as_ref()
    }

    /// Camera pose for this frame while an animation runs. The animation is
    /// retired once its final pose has been returned.
    pub fn advance(&mut self, now: f64) -> Option<CameraPose> {
        let animation = self.animation.as_ref()?;
        let pose = animation.pose_at(now);
        if animation.is_finished(now) {
            self.animation = None;
        }

        Some(pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_index_graph;
    use crate::taxonomy::CategoryRecord;

    const VIEWPORT: Viewport = Viewport::new(1200.0, 800.0);

    fn graph() -> GraphState {
        let records = ["01", "011", "0111", "02"]
            .into_iter()
            .map(|id| CategoryRecord::new(id, "Field"))
            .collect::<Vec<_>>();
        GraphState::from_index(1, build_index_graph(&records))
    }

    fn node(id: &str) -> FocusRequest {
        FocusRequest::new(FocusTarget::Node(id.to_owned()), NODE_PADDING)
    }

    #[test]
    fn request_is_deferred_until_run() {
        let graph = graph();
        let mut focus = FocusScheduler::default();

        focus.request(node("0111"));
        assert!(focus.has_pending());
        assert!(!focus.is_animating());

        focus.run_pending(&graph, VIEWPORT, CameraPose::default(), 0.0);
        assert!(!focus.has_pending());
        assert!(focus.is_animating());
    }

    #[test]
    fn last_request_wins() {
        let graph = graph();
        let mut focus = FocusScheduler::default();

        focus.request(node("01"));
        focus.request(node("02"));
        let animation = focus
            .run_pending(&graph, VIEWPORT, CameraPose::default(), 0.0)
            .unwrap();

        assert_eq!(animation.target().center, graph.position("02").unwrap());
    }

    #[test]
    fn new_request_stops_running_animation() {
        let graph = graph();
        let mut focus = FocusScheduler::default();

        focus.request(node("01"));
        focus.run_pending(&graph, VIEWPORT, CameraPose::default(), 0.0);
        focus.request(node("02"));

        assert!(!focus.is_animating());
        assert!(focus.advance(0.1).is_none());
    }

    #[test]
    fn selection_without_present_nodes_is_dropped() {
        let graph = graph();
        let mut focus = FocusScheduler::default();

        focus.request(FocusRequest::new(
            FocusTarget::Nodes(vec!["0999".to_owned(), "gone".to_owned()]),
            SEARCH_PADDING,
        ));
        let started = focus.run_pending(&graph, VIEWPORT, CameraPose::default(), 0.0);

        assert!(started.is_none());
        assert!(!focus.has_pending());
        assert!(!focus.is_animating());
    }

    #[test]
    fn removed_nodes_are_filtered_out_of_a_selection() {
        let graph = graph();
        let mut focus = FocusScheduler::default();

        focus.request(FocusRequest::new(
            FocusTarget::Nodes(vec!["gone".to_owned(), "011".to_owned()]),
            SEARCH_PADDING,
        ));
        let animation = focus
            .run_pending(&graph, VIEWPORT, CameraPose::default(), 0.0)
            .unwrap();

        assert_eq!(animation.target().center, graph.position("011").unwrap());
    }

    #[test]
    fn animation_completes_in_finite_time() {
        let graph = graph();
        let mut focus = FocusScheduler::default();

        focus.request(FocusRequest::new(FocusTarget::Everything, FIT_ALL_PADDING));
        focus.run_pending(&graph, VIEWPORT, CameraPose::default(), 5.0);

        let midway = focus.advance(5.1).unwrap();
        let last = focus.advance(6.0).unwrap();

        assert_ne!(midway, last);
        assert!(!focus.is_animating());
        assert!(focus.advance(6.1).is_none());
    }

    #[test]
    fn cancel_clears_everything() {
        let graph = graph();
        let mut focus = FocusScheduler::default();

        focus.request(node("01"));
        focus.run_pending(&graph, VIEWPORT, CameraPose::default(), 0.0);
        focus.request(node("02"));
        focus.cancel();

        assert!(!focus.has_pending());
        assert!(focus.run_pending(&graph, VIEWPORT, CameraPose::default(), 0.0).is_none());
    }
}
