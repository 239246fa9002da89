mod id;
mod record;
mod source;
mod style;

pub use id::{
    Level, ROOT_ID, ROOT_LABEL, UNCLASSIFIED_BROAD_ID, leaf_node_id, parent_category_id,
};
pub use record::{CategoryRecord, LeafRecord, ResourceLink};
pub use source::{DataSource, open_source};
pub use style::{Rgb, StyleSheet};

#[cfg(test)]
pub(crate) use source::testing;
