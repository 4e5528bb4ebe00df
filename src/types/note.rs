use serde::{Deserialize, Serialize};

/// A single hit returned by the store's search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    #[serde(default)]
    pub filename: String,
}

/// Directory listing as returned by `GET /vault/` — either a bare array or `{files: [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FolderListing {
    Entries(Vec<ListingEntry>),
    Wrapped {
        #[serde(default)]
        files: Vec<ListingEntry>,
    },
}

impl FolderListing {
    pub fn into_names(self) -> Vec<String> {
        let entries = match self {
            FolderListing::Entries(entries) => entries,
            FolderListing::Wrapped { files } => files,
        };
        entries.into_iter().filter_map(ListingEntry::into_name).collect()
    }
}

/// One listing entry; plain path strings or objects naming the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListingEntry {
    Name(String),
    Object {
        name: Option<String>,
        filename: Option<String>,
    },
    Other(serde_json::Value),
}

impl ListingEntry {
    fn into_name(self) -> Option<String> {
        match self {
            ListingEntry::Name(name) => Some(name),
            ListingEntry::Object { name, filename } => name.or(filename),
            ListingEntry::Other(_) => None,
        }
        .filter(|n| !n.is_empty())
    }
}
