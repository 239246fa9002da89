use thiserror::Error;

/// Failure to obtain or decode one of the static data documents.
#[derive(Debug, Error)]
pub enum DataError {
    /// The document could not be fetched (missing file, non-success HTTP
    /// status, transport failure).
    #[error("data unavailable at {address}: {reason}")]
    Unavailable {
        address: String,
        status: Option<u16>,
        reason: String,
    },

    /// The document was fetched but is not valid JSON of the expected shape.
    #[error("malformed data at {address}: {source}")]
    Malformed {
        address: String,
        #[source]
        source: serde_json::Error,
    },

    /// The requested document address is not one the data layout allows.
    #[error("invalid document address: {0}")]
    InvalidAddress(String),
}

impl DataError {
    pub fn unavailable(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            address: address.into(),
            status: None,
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unavailable { status, .. } => *status,
            _ => None,
        }
    }
}

/// Failure of a single node expansion. The graph is left in its prior state.
#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("node {0} is not in the graph")]
    UnknownNode(String),

    #[error("node {0} is not an expandable detailed field")]
    NotExpandable(String),

    #[error("failed to load children of {node_id}: {source}")]
    Data {
        node_id: String,
        #[source]
        source: DataError,
    },

    /// The graph was reset while the fetch was in flight.
    #[error("expansion of {node_id} belongs to epoch {ticket_epoch}, graph is at epoch {current_epoch}")]
    Stale {
        node_id: String,
        ticket_epoch: u64,
        current_epoch: u64,
    },
}

/// A structural problem found while building the index graph. These are
/// reported and absorbed: the affected record or group is omitted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Id is not all digits or its length is not 2, 3 or 4.
    #[error("category id {id:?} is not a 2, 3 or 4 digit id; skipped")]
    MalformedId { id: String },

    #[error("category id {id} appears more than once; keeping the first")]
    DuplicateId { id: String },

    /// A group of children whose parent was never placed.
    #[error("position for parent {parent_id} not found; skipping its {children} children")]
    MissingParent { parent_id: String, children: usize },

    /// A level-3 group placed with the root as fallback direction.
    #[error(
        "position for grandparent {grandparent_id} not found; fanning children of {parent_id} from the root"
    )]
    MissingGrandparent {
        parent_id: String,
        grandparent_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violations_render_their_ids() {
        let duplicate = InvariantViolation::DuplicateId {
            id: "0101".to_owned(),
        };
        assert_eq!(
            duplicate.to_string(),
            "category id 0101 appears more than once; keeping the first"
        );

        let missing = InvariantViolation::MissingParent {
            parent_id: "011".to_owned(),
            children: 3,
        };
        assert_eq!(
            missing.to_string(),
            "position for parent 011 not found; skipping its 3 children"
        );
    }
}
