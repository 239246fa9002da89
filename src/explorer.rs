use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{DataError, ExpandError, InvariantViolation};
use crate::focus::{
    CameraPose, FIT_ALL_PADDING, FocusRequest, FocusScheduler, FocusTarget, NODE_PADDING,
    SEARCH_PADDING, Viewport,
};
use crate::graph::{
    BeginExpansion, ExpansionTicket, GraphEdge, GraphElements, GraphNode, GraphState,
    build_index_graph,
};
use crate::search::{FoundNode, SearchState, SearchStatus, find_nodes};
use crate::taxonomy::{CategoryRecord, DataSource, LeafRecord, StyleSheet};

/// Documents that make up one language's starting graph.
#[derive(Debug)]
pub struct LanguageData {
    pub language: String,
    pub records: Vec<CategoryRecord>,
    pub style: StyleSheet,
}

/// Fetches the index and style sheet for `language`. The index is required;
/// a missing or broken style sheet falls back to the built-in one.
pub fn fetch_language(source: &dyn DataSource, language: &str) -> Result<LanguageData, DataError> {
    let records = source.fetch_index(language)?;
    let style = match source.fetch_style(language) {
        Ok(style) => style.or_default(),
        Err(error) => {
            warn!(language, %error, "using built-in style sheet");
            StyleSheet::default()
        }
    };

    Ok(LanguageData {
        language: language.to_owned(),
        records,
        style,
    })
}

#[derive(Debug, PartialEq)]
pub enum TapOutcome {
    /// A leaf was tapped; its details are now selected.
    ShowDetails,
    /// A collapsed detailed field was tapped; fetch its children and pass the
    /// result to [`Explorer::complete_expansion`].
    Expand(ExpansionTicket),
    Focused,
    Ignored,
}

/// Read snapshot of the graph for consumers.
#[derive(Debug, Serialize)]
pub struct GraphSnapshot<'a> {
    pub epoch: u64,
    pub language: &'a str,
    pub nodes: &'a [GraphNode],
    pub edges: &'a [GraphEdge],
    pub highlighted: Vec<&'a str>,
}

pub struct Explorer {
    source: Arc<dyn DataSource>,
    language: String,
    graph: GraphState,
    style: StyleSheet,
    search: SearchState,
    focus: FocusScheduler,
    violations: Vec<InvariantViolation>,
    selected: Option<String>,
}

impl Explorer {
    /// An explorer with an empty graph at epoch 0.
    pub fn new(source: Arc<dyn DataSource>, language: &str) -> Self {
        Self {
            source,
            language: language.to_owned(),
            graph: GraphState::default(),
            style: StyleSheet::default(),
            search: SearchState::default(),
            focus: FocusScheduler::default(),
            violations: Vec::new(),
            selected: None,
        }
    }

    pub fn load(source: Arc<dyn DataSource>, language: &str) -> Result<Self, DataError> {
        let mut explorer = Self::new(source, language);
        explorer.reset_for_language(language)?;
        Ok(explorer)
    }

    pub fn source(&self) -> Arc<dyn DataSource> {
        Arc::clone(&self.source)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn graph(&self) -> &GraphState {
        &self.graph
    }

    pub fn style(&self) -> &StyleSheet {
        &self.style
    }

    pub fn violations(&self) -> &[InvariantViolation] {
        &self.violations
    }

    pub fn graph_state(&self) -> GraphSnapshot<'_> {
        let mut highlighted = self.search.highlighted().collect::<Vec<_>>();
        highlighted.sort_unstable();

        GraphSnapshot {
            epoch: self.graph.epoch(),
            language: &self.language,
            nodes: self.graph.nodes(),
            edges: self.graph.edges(),
            highlighted,
        }
    }

    /// Replaces the graph with `language`'s index. On failure the current
    /// graph is kept.
    pub fn reset_for_language(&mut self, language: &str) -> Result<(), DataError> {
        let data = fetch_language(self.source.as_ref(), language)?;
        self.install_language(data);
        Ok(())
    }

    /// Starts a new epoch from already fetched language data. Expansions begun
    /// before this call are discarded when they complete.
    pub fn install_language(&mut self, data: LanguageData) {
        let epoch = self.graph.epoch() + 1;
        let mut build = build_index_graph(&data.records);
        self.violations = std::mem::take(&mut build.violations);
        self.graph = GraphState::from_index(epoch, build);
        self.style = data.style;
        self.language = data.language;
        self.search.clear();
        self.focus.cancel();
        self.selected = None;

        info!(
            language = %self.language,
            epoch,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            violations = self.violations.len(),
            "installed index graph"
        );
    }

    /// Expands `node_id` in place, blocking on the fetch. The camera is asked
    /// to focus the node whether or not the fetch succeeded.
    pub fn expand(&mut self, node_id: &str) -> Result<GraphElements, ExpandError> {
        let source = Arc::clone(&self.source);
        let result = self
            .graph
            .expand_with(source.as_ref(), &self.language, node_id);

        if matches!(result, Ok(_) | Err(ExpandError::Data { .. })) {
            self.focus_node(node_id);
        }
        result
    }

    pub fn begin_expansion(&mut self, node_id: &str) -> Result<BeginExpansion, ExpandError> {
        self.graph.begin_expansion(node_id)
    }

    /// Applies a fetch started with [`Self::begin_expansion`] or a tap.
    /// Results from an earlier epoch are rejected without touching the graph
    /// or the camera.
    pub fn complete_expansion(
        &mut self,
        ticket: ExpansionTicket,
        fetched: Result<Vec<LeafRecord>, DataError>,
    ) -> Result<GraphElements, ExpandError> {
        let node_id = ticket.node_id.clone();
        let result = self.graph.finish_expansion(ticket, fetched);

        if matches!(result, Ok(_) | Err(ExpandError::Data { .. })) {
            self.focus_node(&node_id);
        }
        result
    }

    /// Runs a search over the current graph. An empty term clears the
    /// previous search and its highlight. Any camera move in progress stops.
    pub fn search(&mut self, term: &str) -> Vec<FoundNode> {
        self.focus.cancel();
        if term.trim().is_empty() {
            self.search.clear();
            return Vec::new();
        }

        self.selected = None;
        let found = find_nodes(&self.graph, term);
        self.search.record(term.trim(), &found);
        info!(term = term.trim(), matches = found.len(), "search finished");

        if !found.is_empty() {
            let ids = found.iter().map(|node| node.id.clone()).collect();
            self.focus(FocusTarget::Nodes(ids), SEARCH_PADDING);
        }
        found
    }

    pub fn search_status(&self) -> &SearchStatus {
        self.search.status()
    }

    pub fn search_results(&self) -> &[FoundNode] {
        self.search.results()
    }

    pub fn is_highlighted(&self, node_id: &str) -> bool {
        self.search.is_highlighted(node_id)
    }

    pub fn focus(&mut self, target: FocusTarget, padding: f64) {
        self.focus.request(FocusRequest::new(target, padding));
    }

    fn focus_node(&mut self, node_id: &str) {
        self.focus(FocusTarget::Node(node_id.to_owned()), NODE_PADDING);
    }

    pub fn fit_all(&mut self) {
        self.search.clear_highlight();
        self.selected = None;
        self.focus(FocusTarget::Everything, FIT_ALL_PADDING);
    }

    pub fn has_pending_focus(&self) -> bool {
        self.focus.has_pending()
    }

    pub fn tap(&mut self, node_id: &str) -> TapOutcome {
        let Some(node) = self.graph.node(node_id) else {
            return TapOutcome::Ignored;
        };
        let (is_leaf, is_expandable) = (node.is_leaf(), node.is_expandable());

        self.focus.cancel();
        self.search.highlight_only(node_id);

        if is_leaf {
            self.selected = Some(node_id.to_owned());
            return TapOutcome::ShowDetails;
        }
        self.selected = None;

        if is_expandable {
            match self.graph.begin_expansion(node_id) {
                Ok(BeginExpansion::Fetch(ticket)) => return TapOutcome::Expand(ticket),
                Ok(BeginExpansion::InFlight) => return TapOutcome::Ignored,
                Ok(BeginExpansion::AlreadyExpanded) => {}
                Err(error) => {
                    warn!(node_id, %error, "tap could not start an expansion");
                    return TapOutcome::Ignored;
                }
            }
        }

        self.focus_node(node_id);
        TapOutcome::Focused
    }

    /// Highlights and focuses a search result if it is still in the graph.
    pub fn select_result(&mut self, found: &FoundNode) -> bool {
        if !self.graph.contains_node(&found.id) {
            return false;
        }

        self.search.highlight_only(&found.id);
        self.selected = None;
        self.focus_node(&found.id);
        true
    }

    pub fn selected_leaf(&self) -> Option<&GraphNode> {
        self.selected
            .as_deref()
            .and_then(|id| self.graph.node(id))
            .filter(|node| node.is_leaf())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Starts the deferred camera move, if any. Call once per frame after all
    /// graph mutations of the previous frame have been applied.
    pub fn run_pending_focus(&mut self, viewport: Viewport, current: CameraPose, now: f64) -> bool {
        self.focus
            .run_pending(&self.graph, viewport, current, now)
            .is_some()
    }

    pub fn advance_camera(&mut self, now: f64) -> Option<CameraPose> {
        self.focus.advance(now)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::graph::Expansion;
    use crate::taxonomy::testing::MemorySource;

    const VIEWPORT: Viewport = Viewport::new(1280.0, 800.0);

    const EN_INDEX: &str = r#"[
        {"id": "01", "label": "Education"},
        {"id": "010", "label": "Education"},
        {"id": "0101", "label": "Teacher training", "hasChildFile": true},
        {"id": "0102", "label": "Education science"},
        {"id": "99", "label": "Field unknown"},
        {"id": "999", "label": "Field unknown"},
        {"id": "9999", "label": "Field unknown"}
    ]"#;

    const ZH_INDEX: &str = r#"[
        {"id": "01", "label": "教育"},
        {"id": "010", "label": "教育"}
    ]"#;

    fn source() -> Arc<MemorySource> {
        let source = MemorySource::default();
        source.insert("data/en/index.json", EN_INDEX);
        source.insert("data/zh/index.json", ZH_INDEX);
        source.insert(
            "data/en/0101.json",
            r#"[{"name": "Classroom management", "wikiLink": "https://example.org/cm"}]"#,
        );
        Arc::new(source)
    }

    fn explorer(source: &Arc<MemorySource>) -> Explorer {
        Explorer::load(source.clone(), "en").unwrap()
    }

    fn id_sets(explorer: &Explorer) -> (BTreeSet<String>, BTreeSet<String>) {
        let graph = explorer.graph();
        (
            graph.nodes().iter().map(|node| node.id.clone()).collect(),
            graph.edges().iter().map(|edge| edge.id.clone()).collect(),
        )
    }

    #[test]
    fn load_builds_index_graph_with_default_style() {
        let explorer = explorer(&source());

        assert_eq!(explorer.graph().epoch(), 1);
        assert_eq!(explorer.graph().node_count(), 8);
        assert_eq!(explorer.graph().edge_count(), 7);
        assert_eq!(explorer.style(), &StyleSheet::default());
        assert!(explorer.violations().is_empty());
        assert!(explorer.graph().node("0101").unwrap().has_children);
    }

    #[test]
    fn missing_index_is_fatal_for_the_language() {
        let source = source();
        let mut explorer = explorer(&source);

        let error = explorer.reset_for_language("fr").unwrap_err();

        assert_eq!(error.status(), Some(404));
        assert_eq!(explorer.language(), "en");
        assert_eq!(explorer.graph().epoch(), 1);
    }

    #[test]
    fn unclassified_field_is_a_regular_expandable_branch() {
        let source = source();
        source.insert("data/en/9999.json", r#"[{"name": "Misc"}]"#);
        let mut explorer = explorer(&source);

        let added = explorer.expand("9999").unwrap();

        assert_eq!(added.nodes[0].id, "9999-misc-0");
        assert!(explorer.graph().contains_edge("9999->9999-misc-0"));
    }

    #[test]
    fn failed_expansion_keeps_graph_and_still_focuses() {
        let source = source();
        let mut explorer = explorer(&source);
        let before = id_sets(&explorer);

        let error = explorer.expand("0102").unwrap_err();

        assert!(matches!(error, ExpandError::Data { .. }));
        assert_eq!(id_sets(&explorer), before);
        assert_eq!(
            explorer.graph().node("0102").unwrap().expansion,
            Expansion::Collapsed
        );
        assert!(explorer.has_pending_focus());
    }

    #[test]
    fn expansion_resolving_after_language_switch_is_discarded() {
        let source = source();
        let mut explorer = explorer(&source);

        let TapOutcome::Expand(ticket) = explorer.tap("0101") else {
            panic!("tapping a collapsed detailed field must start an expansion");
        };
        let fetched = source.fetch_children("en", &ticket.node_id);
        explorer.reset_for_language("zh").unwrap();
        let before = id_sets(&explorer);

        let error = explorer.complete_expansion(ticket, fetched).unwrap_err();

        assert!(matches!(
            error,
            ExpandError::Stale {
                ticket_epoch: 1,
                current_epoch: 2,
                ..
            }
        ));
        assert_eq!(id_sets(&explorer), before);
        assert!(!explorer.has_pending_focus());
    }

    #[test]
    fn tap_expands_then_focuses_once_resolved() {
        let source = source();
        let mut explorer = explorer(&source);

        let TapOutcome::Expand(ticket) = explorer.tap("0101") else {
            panic!("expected an expansion ticket");
        };
        assert!(explorer.is_highlighted("0101"));
        assert!(!explorer.has_pending_focus());
        assert_eq!(explorer.tap("0101"), TapOutcome::Ignored);

        let fetched = source.fetch_children("en", &ticket.node_id);
        explorer.complete_expansion(ticket, fetched).unwrap();

        assert!(explorer.has_pending_focus());
        assert!(explorer.run_pending_focus(VIEWPORT, CameraPose::default(), 0.0));
        assert_eq!(explorer.tap("0101"), TapOutcome::Focused);
    }

    #[test]
    fn tapping_a_leaf_selects_its_details() {
        let source = source();
        let mut explorer = explorer(&source);
        explorer.expand("0101").unwrap();

        assert_eq!(
            explorer.tap("0101-classroom_management-0"),
            TapOutcome::ShowDetails
        );
        let leaf = explorer.selected_leaf().unwrap();
        let metadata = leaf.metadata.as_ref().unwrap();
        assert_eq!(metadata.wiki_link.as_deref(), Some("https://example.org/cm"));
        assert_eq!(explorer.tap("missing"), TapOutcome::Ignored);
    }

    #[test]
    fn leaving_a_leaf_closes_its_details() {
        let source = source();
        let mut explorer = explorer(&source);
        explorer.expand("0101").unwrap();
        let leaf = "0101-classroom_management-0";

        explorer.tap(leaf);
        assert_eq!(explorer.tap("010"), TapOutcome::Focused);
        assert!(explorer.selected_leaf().is_none());

        explorer.tap(leaf);
        explorer.fit_all();
        assert!(explorer.selected_leaf().is_none());

        explorer.tap(leaf);
        let found = explorer.search("education");
        assert!(!found.is_empty());
        assert!(explorer.selected_leaf().is_none());

        explorer.tap(leaf);
        assert!(explorer.select_result(&found[0]));
        assert!(explorer.selected_leaf().is_none());
    }

    #[test]
    fn tapping_a_leaf_stops_the_camera() {
        let source = source();
        let mut explorer = explorer(&source);
        explorer.expand("0101").unwrap();
        assert!(explorer.has_pending_focus());

        explorer.tap("0101-classroom_management-0");
        assert!(!explorer.has_pending_focus());

        explorer.fit_all();
        assert!(explorer.run_pending_focus(VIEWPORT, CameraPose::default(), 0.0));
        explorer.search("astronomy");
        assert!(explorer.advance_camera(0.1).is_none());
    }

    #[test]
    fn search_highlights_and_clearing_restores_state() {
        let source = source();
        let mut explorer = explorer(&source);
        let before = id_sets(&explorer);

        let found = explorer.search("TEACHER");
        assert_eq!(found.len(), 1);
        assert!(explorer.is_highlighted("0101"));
        assert!(explorer.has_pending_focus());

        assert!(explorer.search("").is_empty());
        assert_eq!(explorer.search_status(), &SearchStatus::NotRun);
        assert!(!explorer.is_highlighted("0101"));
        assert_eq!(id_sets(&explorer), before);
    }

    #[test]
    fn search_without_matches_is_reported() {
        let mut explorer = explorer(&source());

        assert!(explorer.search("astronomy").is_empty());
        assert!(matches!(
            explorer.search_status(),
            SearchStatus::NoMatches { .. }
        ));
        assert!(!explorer.has_pending_focus());
    }

    #[test]
    fn result_from_a_previous_language_is_not_focused() {
        let source = source();
        let mut explorer = explorer(&source);
        let found = explorer.search("teacher");
        explorer.reset_for_language("zh").unwrap();

        assert!(!explorer.select_result(&found[0]));
        assert!(!explorer.has_pending_focus());
        assert_eq!(explorer.search_status(), &SearchStatus::NotRun);
    }

    #[test]
    fn fit_all_clears_highlight() {
        let mut explorer = explorer(&source());
        explorer.search("education");

        explorer.fit_all();

        assert!(explorer.graph_state().highlighted.is_empty());
        assert!(explorer.run_pending_focus(VIEWPORT, CameraPose::default(), 0.0));
        assert!(explorer.advance_camera(1.0).is_some());
        assert!(explorer.advance_camera(1.1).is_none());
    }
}
