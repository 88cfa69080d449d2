//! Wire shapes of the Gist API, limited to the fields sync needs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct GistSummary {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Gist {
    pub id: String,
    #[serde(default)]
    pub files: HashMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GistFile {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub raw_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GistWrite<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    pub files: HashMap<&'a str, GistFileWrite>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GistFileWrite {
    pub content: String,
}
