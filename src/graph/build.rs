use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::InvariantViolation;
use crate::taxonomy::{
    CategoryRecord, LeafRecord, Level, ROOT_ID, ROOT_LABEL, UNCLASSIFIED_BROAD_ID, leaf_node_id,
};

use super::layout::{
    BROAD_RING_RADIUS, DETAILED_FALLBACK_SPREAD, DETAILED_FAN_RADIUS, DETAILED_FAN_SPREAD,
    LEAF_FAN_RADIUS, LEAF_FAN_SPREAD, NARROW_FAN_RADIUS, NARROW_FAN_SPREAD, fan_position,
    ring_position,
};
use super::types::{Expansion, GraphEdge, GraphElements, GraphNode, LeafMetadata, Point};

/// Output of one index pipeline run.
#[derive(Debug, Default)]
pub struct IndexBuild {
    pub elements: GraphElements,
    /// Every placed id, root included.
    pub positions: HashMap<String, Point>,
    pub violations: Vec<InvariantViolation>,
}

impl IndexBuild {
    fn report(&mut self, violation: InvariantViolation) {
        warn!(%violation, "index graph invariant violated");
        self.violations.push(violation);
    }

    fn place(&mut self, record: &CategoryRecord, level: Level, parent_id: &str, position: Point) {
        self.elements.nodes.push(GraphNode {
            id: record.id.clone(),
            label: record.label.clone(),
            level,
            position,
            parent_id: Some(parent_id.to_owned()),
            has_children: record.has_children(),
            expansion: Expansion::Collapsed,
            metadata: None,
        });
        self.elements
            .edges
            .push(GraphEdge::between(parent_id, &record.id));
        self.positions.insert(record.id.clone(), position);
    }
}

fn broad_field_order(a: &str, b: &str) -> Ordering {
    (a == UNCLASSIFIED_BROAD_ID)
        .cmp(&(b == UNCLASSIFIED_BROAD_ID))
        .then_with(|| a.cmp(b))
}

/// Turns the flat index records into the positioned root + three level tree.
pub fn build_index_graph(records: &[CategoryRecord]) -> IndexBuild {
    let mut build = IndexBuild::default();

    build.elements.nodes.push(GraphNode {
        id: ROOT_ID.to_owned(),
        label: ROOT_LABEL.to_owned(),
        level: Level::Root,
        position: Point::ORIGIN,
        parent_id: None,
        has_children: true,
        expansion: Expansion::Expanded,
        metadata: None,
    });
    build.positions.insert(ROOT_ID.to_owned(), Point::ORIGIN);

    let mut seen = HashSet::new();
    let mut broad_fields = Vec::new();
    let mut narrow_groups: BTreeMap<&str, Vec<&CategoryRecord>> = BTreeMap::new();
    let mut detailed_groups: BTreeMap<&str, Vec<&CategoryRecord>> = BTreeMap::new();

    for record in records {
        let Some(level) = Level::of_category_id(&record.id) else {
            build.report(InvariantViolation::MalformedId {
                id: record.id.clone(),
            });
            continue;
        };

        if !seen.insert(record.id.as_str()) {
            build.report(InvariantViolation::DuplicateId {
                id: record.id.clone(),
            });
            continue;
        }

        match level {
            Level::Broad => broad_fields.push(record),
            Level::Narrow => narrow_groups.entry(&record.id[..2]).or_default().push(record),
            Level::Detailed => detailed_groups
                .entry(&record.id[..3])
                .or_default()
                .push(record),
            Level::Root | Level::Leaf => {}
        }
    }

    broad_fields.sort_by(|a, b| broad_field_order(&a.id, &b.id));
    let broad_count = broad_fields.len();
    for (index, record) in broad_fields.into_iter().enumerate() {
        let position = ring_position(index, broad_count, BROAD_RING_RADIUS);
        build.place(record, Level::Broad, ROOT_ID, position);
    }

    for (parent_id, mut group) in narrow_groups {
        let Some(&parent_position) = build.positions.get(parent_id) else {
            build.report(InvariantViolation::MissingParent {
                parent_id: parent_id.to_owned(),
                children: group.len(),
            });
            continue;
        };

        group.sort_by(|a, b| a.id.cmp(&b.id));
        let total = group.len();
        for (index, record) in group.into_iter().enumerate() {
            let position = fan_position(
                parent_position,
                Point::ORIGIN,
                index,
                total,
                NARROW_FAN_RADIUS,
                NARROW_FAN_SPREAD,
            );
            build.place(record, Level::Narrow, parent_id, position);
        }
    }

    for (parent_id, mut group) in detailed_groups {
        let Some(&parent_position) = build.positions.get(parent_id) else {
            build.report(InvariantViolation::MissingParent {
                parent_id: parent_id.to_owned(),
                children: group.len(),
            });
            continue;
        };

        let grandparent_id = &parent_id[..2];
        let (direction, spread) = match build.positions.get(grandparent_id) {
            Some(&grandparent_position) => (grandparent_position, DETAILED_FAN_SPREAD),
            None => {
                build.report(InvariantViolation::MissingGrandparent {
                    parent_id: parent_id.to_owned(),
                    grandparent_id: grandparent_id.to_owned(),
                });
                (Point::ORIGIN, DETAILED_FALLBACK_SPREAD)
            }
        };

        group.sort_by(|a, b| a.id.cmp(&b.id));
        let total = group.len();
        for (index, record) in group.into_iter().enumerate() {
            let position = fan_position(
                parent_position,
                direction,
                index,
                total,
                DETAILED_FAN_RADIUS,
                spread,
            );
            build.place(record, Level::Detailed, parent_id, position);
        }
    }

    debug!(
        nodes = build.elements.nodes.len(),
        edges = build.elements.edges.len(),
        violations = build.violations.len(),
        "built index graph"
    );
    build
}

/// Fans `leaves` out around an already placed detailed field. The fan points
/// away from `direction_source`, conventionally the field's own parent.
pub fn build_child_graph(
    leaves: &[LeafRecord],
    parent_id: &str,
    parent_position: Point,
    direction_source: Point,
) -> GraphElements {
    let total = leaves.len();
    let mut elements = GraphElements::default();

    for (index, leaf) in leaves.iter().enumerate() {
        let id = leaf_node_id(parent_id, &leaf.name, index);
        let position = fan_position(
            parent_position,
            direction_source,
            index,
            total,
            LEAF_FAN_RADIUS,
            LEAF_FAN_SPREAD,
        );

        elements.edges.push(GraphEdge::between(parent_id, &id));
        elements.nodes.push(GraphNode {
            id,
            label: leaf.name.clone(),
            level: Level::Leaf,
            position,
            parent_id: Some(parent_id.to_owned()),
            has_children: false,
            expansion: Expansion::Collapsed,
            metadata: Some(LeafMetadata {
                description: leaf.description.clone(),
                wiki_link: leaf.wiki_link.clone(),
                resources: leaf.resources.clone().unwrap_or_default(),
            }),
        });
    }

    elements
}
