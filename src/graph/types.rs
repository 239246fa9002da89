use serde::Serialize;

use crate::taxonomy::{Level, ResourceLink};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Angle of the ray from `origin` towards `self`.
    pub fn angle_from(self, origin: Self) -> f64 {
        (self.y - origin.y).atan2(self.x - origin.x)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expansion {
    #[default]
    Collapsed,
    Loading,
    Expanded,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LeafMetadata {
    pub description: Option<String>,
    pub wiki_link: Option<String>,
    pub resources: Vec<ResourceLink>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub level: Level,
    pub position: Point,
    pub parent_id: Option<String>,
    /// The index record announced a child document for this field.
    pub has_children: bool,
    pub expansion: Expansion,
    pub metadata: Option<LeafMetadata>,
}

impl GraphNode {
    pub fn is_leaf(&self) -> bool {
        self.level == Level::Leaf
    }

    pub fn is_expandable(&self) -> bool {
        self.level == Level::Detailed
    }

    pub fn expanded(&self) -> bool {
        self.expansion == Expansion::Expanded
    }

    /// Label used in search results, `"<id> - <label>"`.
    pub fn compound_label(&self) -> String {
        format!("{} - {}", self.id, self.label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
}

impl GraphEdge {
    pub fn between(source_id: &str, target_id: &str) -> Self {
        Self {
            id: edge_id(source_id, target_id),
            source_id: source_id.to_owned(),
            target_id: target_id.to_owned(),
        }
    }
}

/// Node ids never contain `>`, so the arrow keeps edge ids unambiguous.
pub fn edge_id(source_id: &str, target_id: &str) -> String {
    format!("{source_id}->{target_id}")
}

/// A batch of nodes and edges: the output of a pipeline run or the part of a
/// batch that a merge actually added.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GraphElements {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphElements {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
