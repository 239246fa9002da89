use std::collections::HashSet;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Serialize;

use crate::graph::{GraphNode, GraphState};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FoundNode {
    pub id: String,
    /// `"<id> - <label>"`, as listed to the user.
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SearchStatus {
    #[default]
    NotRun,
    NoMatches {
        term: String,
    },
    Matches {
        term: String,
        count: usize,
    },
}

fn matches_term(node: &GraphNode, term_lower: &str) -> bool {
    if node.label.to_lowercase().contains(term_lower) {
        return true;
    }

    node.is_leaf() && node.compound_label().to_lowercase().contains(term_lower)
}

/// Case-insensitive substring scan over the current nodes. Matches are
/// ordered by fuzzy score so the closest labels come first, ties by id.
pub fn find_nodes(graph: &GraphState, term: &str) -> Vec<FoundNode> {
    let term_lower = term.trim().to_lowercase();
    if term_lower.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut ranked = graph
        .nodes()
        .iter()
        .filter(|node| matches_term(node, &term_lower))
        .map(|node| {
            let score = matcher
                .fuzzy_match(&node.label.to_lowercase(), &term_lower)
                .unwrap_or(0);
            (score, node)
        })
        .collect::<Vec<_>>();

    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));
    ranked
        .into_iter()
        .map(|(_score, node)| FoundNode {
            id: node.id.clone(),
            label: node.compound_label(),
        })
        .collect()
}

/// Highlight set and outcome of the last search. Never touches the graph.
#[derive(Debug, Default)]
pub struct SearchState {
    status: SearchStatus,
    results: Vec<FoundNode>,
    highlighted: HashSet<String>,
}

impl SearchState {
    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn results(&self) -> &[FoundNode] {
        &self.results
    }

    pub fn is_highlighted(&self, id: &str) -> bool {
        self.highlighted.contains(id)
    }

    pub fn highlighted(&self) -> impl Iterator<Item = &str> {
        self.highlighted.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.status = SearchStatus::NotRun;
        self.results.clear();
        self.highlighted.clear();
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted.clear();
    }

    /// Highlights exactly `id`, keeping the result list.
    pub fn highlight_only(&mut self, id: &str) {
        self.highlighted.clear();
        self.highlighted.insert(id.to_owned());
    }

    /// Records a completed search: the highlight becomes exactly `found`.
    pub fn record(&mut self, term: &str, found: &[FoundNode]) {
        self.highlighted = found.iter().map(|node| node.id.clone()).collect();
        self.results = found.to_vec();
        self.status = if found.is_empty() {
            SearchStatus::NoMatches {
                term: term.to_owned(),
            }
        } else {
            SearchStatus::Matches {
                term: term.to_owned(),
                count: found.len(),
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_index_graph;
    use crate::taxonomy::CategoryRecord;
    use crate::taxonomy::testing::MemorySource;

    fn graph() -> GraphState {
        let records = vec![
            CategoryRecord::new("06", "Information and Communication Technologies"),
            CategoryRecord::new("061", "Information and Communication Technologies"),
            CategoryRecord::new("0612", "Database and network design"),
            CategoryRecord::new("0613", "Software and applications development"),
            CategoryRecord::new("07", "Engineering"),
        ];
        GraphState::from_index(1, build_index_graph(&records))
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let graph = graph();

        let found = find_nodes(&graph, "SOFTWARE");
        assert_eq!(
            found,
            vec![FoundNode {
                id: "0613".to_owned(),
                label: "0613 - Software and applications development".to_owned(),
            }]
        );

        let ids = find_nodes(&graph, "information")
            .into_iter()
            .map(|found| found.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["06", "061"]);
    }

    #[test]
    fn blank_term_finds_nothing() {
        let graph = graph();
        assert!(find_nodes(&graph, "").is_empty());
        assert!(find_nodes(&graph, "   ").is_empty());
    }

    #[test]
    fn leaf_nodes_also_match_their_compound_label() {
        let mut graph = graph();
        let source = MemorySource::default();
        source.insert("data/en/0613.json", r#"[{"name": "Rust"}]"#);
        graph.expand_with(&source, "en", "0613").unwrap();

        let by_id = find_nodes(&graph, "0613-rust")
            .into_iter()
            .map(|found| found.id)
            .collect::<Vec<_>>();
        assert_eq!(by_id, vec!["0613-rust-0"]);

        // Category ids are not searchable, only their labels.
        assert!(find_nodes(&graph, "0612").is_empty());
    }

    #[test]
    fn record_replaces_the_highlight_set() {
        let graph = graph();
        let mut state = SearchState::default();
        assert_eq!(state.status(), &SearchStatus::NotRun);

        state.record("engineering", &find_nodes(&graph, "engineering"));
        assert!(state.is_highlighted("07"));

        state.record("software", &find_nodes(&graph, "software"));
        assert!(state.is_highlighted("0613"));
        assert!(!state.is_highlighted("07"));

        state.record("astronomy", &find_nodes(&graph, "astronomy"));
        assert_eq!(state.highlighted().count(), 0);
        assert_eq!(
            state.status(),
            &SearchStatus::NoMatches {
                term: "astronomy".to_owned()
            }
        );

        state.clear();
        assert_eq!(state.status(), &SearchStatus::NotRun);
    }
}
