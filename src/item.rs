use serde::{Deserialize, Serialize};

/// Name value the legacy exports use for "no name recorded".
pub const SENTINEL_NAME: &str = "-1";

/// One input row: the grouping label plus its categorical attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl Item {
    pub fn new(name: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            name: name.into(),
            category: category.map(str::to_string),
        }
    }

    /// Item without a category value.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
        }
    }

    /// Sentinel rows and empty names carry no prefix and never reach the builder.
    pub fn is_placeholder(&self) -> bool {
        self.name.is_empty() || self.name == SENTINEL_NAME
    }
}

/// Drop placeholder rows and sort ascending by name, the order the builder expects.
///
/// The sort is stable, so rows sharing a name keep their input order.
pub fn prepare_items(items: impl IntoIterator<Item = Item>) -> Vec<Item> {
    let mut kept: Vec<Item> = items
        .into_iter()
        .filter(|item| !item.is_placeholder())
        .collect();
    kept.sort_by(|a, b| a.name.cmp(&b.name));
    kept
}
