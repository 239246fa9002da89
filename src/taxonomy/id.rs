use serde::Serialize;

pub const ROOT_ID: &str = "r";
pub const ROOT_LABEL: &str = "ISCED Root";

/// The "not elsewhere classified" broad field, always placed last on the ring.
pub const UNCLASSIFIED_BROAD_ID: &str = "99";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Root,
    Broad,
    Narrow,
    Detailed,
    Leaf,
}

impl Level {
    /// Level encoded by a category id, or `None` when the id breaks the
    /// digits-only, length 2..=4 convention.
    pub fn of_category_id(id: &str) -> Option<Self> {
        if !id.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }

        match id.len() {
            2 => Some(Self::Broad),
            3 => Some(Self::Narrow),
            4 => Some(Self::Detailed),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Broad => "broad field",
            Self::Narrow => "narrow field",
            Self::Detailed => "detailed field",
            Self::Leaf => "skill",
        }
    }
}

/// Parent of a category id: the prefix one digit shorter, or the root for a
/// broad field.
pub fn parent_category_id(id: &str) -> Option<&str> {
    match Level::of_category_id(id)? {
        Level::Broad => Some(ROOT_ID),
        Level::Narrow | Level::Detailed => Some(&id[..id.len() - 1]),
        Level::Root | Level::Leaf => None,
    }
}

pub fn is_detailed_id(id: &str) -> bool {
    Level::of_category_id(id) == Some(Level::Detailed)
}

/// Lowercases `name` and replaces everything outside `[A-Za-z0-9_.-]` with `_`.
pub fn sanitize_segment(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-') {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

pub fn leaf_node_id(parent_id: &str, name: &str, index: usize) -> String {
    format!("{parent_id}-{}-{index}", sanitize_segment(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_length_encodes_level() {
        assert_eq!(Level::of_category_id("01"), Some(Level::Broad));
        assert_eq!(Level::of_category_id("011"), Some(Level::Narrow));
        assert_eq!(Level::of_category_id("0111"), Some(Level::Detailed));
        assert_eq!(Level::of_category_id("1"), None);
        assert_eq!(Level::of_category_id("01111"), None);
        assert_eq!(Level::of_category_id("0a1"), None);
        assert_eq!(Level::of_category_id(""), None);
    }

    #[test]
    fn parents_are_prefixes() {
        assert_eq!(parent_category_id("05"), Some(ROOT_ID));
        assert_eq!(parent_category_id("052"), Some("05"));
        assert_eq!(parent_category_id("0521"), Some("052"));
        assert_eq!(parent_category_id("x52"), None);
    }

    #[test]
    fn sanitize_keeps_safe_characters_only() {
        assert_eq!(sanitize_segment("C++ / Rust"), "c_____rust");
        assert_eq!(sanitize_segment("Data-Science_v2.0"), "data-science_v2.0");
        assert_eq!(sanitize_segment("Café"), "caf_");
        assert_eq!(leaf_node_id("0613", "Machine Learning", 3), "0613-machine_learning-3");
    }
}
