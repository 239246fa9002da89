mod build;
mod expand;
mod layout;
mod state;
mod types;

pub use build::build_index_graph;
pub use expand::{BeginExpansion, ExpansionTicket};
pub use state::GraphState;
pub use types::{Expansion, GraphEdge, GraphElements, GraphNode, Point};
