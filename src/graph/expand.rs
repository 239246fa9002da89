use tracing::{debug, info, warn};

use crate::error::{DataError, ExpandError};
use crate::taxonomy::{DataSource, LeafRecord};

use super::build::build_child_graph;
use super::state::GraphState;
use super::types::{Expansion, GraphElements, Point};

/// Everything needed to finish an expansion once its fetch resolves, stamped
/// with the epoch it was started in.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpansionTicket {
    pub node_id: String,
    pub epoch: u64,
    center: Point,
    direction: Point,
}

#[derive(Debug, PartialEq)]
pub enum BeginExpansion {
    /// The node is now loading; fetch its children and hand the result to
    /// [`GraphState::finish_expansion`].
    Fetch(ExpansionTicket),
    /// A fetch for this node is already in flight; its result will be merged.
    InFlight,
    AlreadyExpanded,
}

impl GraphState {
    pub fn begin_expansion(&mut self, node_id: &str) -> Result<BeginExpansion, ExpandError> {
        let node = self
            .node(node_id)
            .ok_or_else(|| ExpandError::UnknownNode(node_id.to_owned()))?;

        if !node.is_expandable() {
            return Err(ExpandError::NotExpandable(node_id.to_owned()));
        }

        match node.expansion {
            Expansion::Expanded => return Ok(BeginExpansion::AlreadyExpanded),
            Expansion::Loading => {
                debug!(node_id, "expansion already in flight");
                return Ok(BeginExpansion::InFlight);
            }
            Expansion::Collapsed => {}
        }

        let center = node.position;
        let direction = node
            .parent_id
            .as_deref()
            .and_then(|parent_id| self.position(parent_id))
            .unwrap_or(Point::ORIGIN);

        self.set_expansion(node_id, Expansion::Loading);
        debug!(node_id, epoch = self.epoch(), "expansion started");

        Ok(BeginExpansion::Fetch(ExpansionTicket {
            node_id: node_id.to_owned(),
            epoch: self.epoch(),
            center,
            direction,
        }))
    }

    /// Applies the fetch result of an expansion. Nothing is committed on
    /// failure and the node becomes expandable again.
    pub fn finish_expansion(
        &mut self,
        ticket: ExpansionTicket,
        fetched: Result<Vec<LeafRecord>, DataError>,
    ) -> Result<GraphElements, ExpandError> {
        if ticket.epoch != self.epoch() {
            debug!(
                node_id = %ticket.node_id,
                ticket_epoch = ticket.epoch,
                epoch = self.epoch(),
                "discarding expansion from a previous epoch"
            );
            return Err(ExpandError::Stale {
                node_id: ticket.node_id,
                ticket_epoch: ticket.epoch,
                current_epoch: self.epoch(),
            });
        }

        let expansion = self
            .node(&ticket.node_id)
            .map(|node| node.expansion)
            .ok_or_else(|| ExpandError::UnknownNode(ticket.node_id.clone()))?;
        if expansion == Expansion::Expanded {
            return Ok(GraphElements::default());
        }

        let leaves = match fetched {
            Ok(leaves) => leaves,
            Err(source) => {
                warn!(node_id = %ticket.node_id, error = %source, "expansion failed");
                self.set_expansion(&ticket.node_id, Expansion::Collapsed);
                return Err(ExpandError::Data {
                    node_id: ticket.node_id,
                    source,
                });
            }
        };

        let batch = build_child_graph(&leaves, &ticket.node_id, ticket.center, ticket.direction);
        let added = self.merge(batch);
        self.set_expansion(&ticket.node_id, Expansion::Expanded);
        info!(
            node_id = %ticket.node_id,
            nodes = added.nodes.len(),
            edges = added.edges.len(),
            "expanded node"
        );

        Ok(added)
    }

    /// Expands `node_id` in one step, fetching from `source`. Expanding an
    /// expanded node is a no-op returning an empty delta.
    pub fn expand_with<S>(
        &mut self,
        source: &S,
        lang: &str,
        node_id: &str,
    ) -> Result<GraphElements, ExpandError>
    where
        S: DataSource + ?Sized,
    {
        match self.begin_expansion(node_id)? {
            BeginExpansion::Fetch(ticket) => {
                let fetched = source.fetch_children(lang, &ticket.node_id);
                self.finish_expansion(ticket, fetched)
            }
            BeginExpansion::InFlight | BeginExpansion::AlreadyExpanded => {
                Ok(GraphElements::default())
            }
        }
    }
}
