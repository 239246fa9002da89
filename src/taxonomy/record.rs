use serde::{Deserialize, Serialize};

/// One entry of the index document: a broad, narrow or detailed field.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CategoryRecord {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "hasChildFile")]
    pub has_child_file: Option<bool>,
    /// Older index documents name the child file instead of flagging it.
    #[serde(default, rename = "childFile")]
    pub child_file: Option<String>,
}

impl CategoryRecord {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            has_child_file: None,
            child_file: None,
        }
    }

    pub fn with_child_file(mut self) -> Self {
        self.has_child_file = Some(true);
        self
    }

    pub fn has_children(&self) -> bool {
        self.has_child_file.unwrap_or(false)
            || self
                .child_file
                .as_deref()
                .is_some_and(|file| !file.trim().is_empty())
    }
}

/// One skill loaded lazily under a detailed field.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LeafRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "wikiLink", alias = "wiki")]
    pub wiki_link: Option<String>,
    #[serde(default)]
    pub resources: Option<Vec<ResourceLink>>,
}

impl LeafRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            wiki_link: None,
            resources: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawResource")]
pub struct ResourceLink {
    pub link: String,
    pub description: Option<String>,
}

impl ResourceLink {
    pub fn display_text(&self) -> &str {
        self.description
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(&self.link)
    }
}

// Resources appear both as bare URLs and as {link, description} objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawResource {
    Link(String),
    Described {
        link: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<RawResource> for ResourceLink {
    fn from(raw: RawResource) -> Self {
        match raw {
            RawResource::Link(link) => Self {
                link,
                description: None,
            },
            RawResource::Described { link, description } => Self { link, description },
        }
    }
}
