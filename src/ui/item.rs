//! Result items handed to the host UI as JSON

use serde::Serialize;
use std::collections::BTreeMap;

/// Suffix for titles of commands that still need input
pub const NEEDS_INPUT_SUFFIX: &str = "…";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Icon {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModItem {
    pub valid: bool,
    pub arg: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextItem {
    pub copy: String,
    pub largetype: String,
}

/// One row of the host UI list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub title: String,
    pub subtitle: String,
    /// Text handed to the host when the item is actioned
    pub arg: String,
    /// Query the host should switch to when the item is autocompleted
    pub autocomplete: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quicklookurl: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub mods: BTreeMap<String, ModItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextItem>,
    /// Workflow variables, set for commands with a text view
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

impl ResultItem {
    pub fn new(title: impl Into<String>, autocomplete: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            uid: Some(title.clone()),
            title,
            subtitle: String::new(),
            arg: String::new(),
            autocomplete: autocomplete.into(),
            valid: false,
            icon: None,
            quicklookurl: None,
            mods: BTreeMap::new(),
            text: None,
            variables: BTreeMap::new(),
        }
    }

    pub fn with_icon(mut self, icon: Option<&str>) -> Self {
        self.icon = icon.map(|path| Icon {
            path: path.to_string(),
        });
        self
    }
}

/// Top-level document the host UI reads
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemList {
    pub items: Vec<ResultItem>,
}
