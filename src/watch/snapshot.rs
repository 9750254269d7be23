// src/watch/snapshot.rs

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::document::ElementRef;

/// How much of an element's styling is captured when a watch attaches.
///
/// - `Full`: the whole computed style map (defaults overlaid with inline
///   styles), stored under both the dashed and camel-cased property names.
/// - `Interaction`: only `visibility` and `pointer-events`, the two
///   properties a highlight overlay typically clobbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotScope {
    Full,
    Interaction,
}

impl Default for SnapshotScope {
    fn default() -> Self {
        SnapshotScope::Full
    }
}

impl FromStr for SnapshotScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(SnapshotScope::Full),
            "interaction" => Ok(SnapshotScope::Interaction),
            other => Err(format!(
                "invalid snapshot_scope: {other} (expected \"full\" or \"interaction\")"
            )),
        }
    }
}

/// Styles preserved from an element at the moment a watch attached.
///
/// A snapshot is captured once per watch key and handed back on unwatch so
/// the caller (or [`StyleSnapshot::restore`]) can undo any decoration the
/// watcher applied in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleSnapshot {
    /// Every computed property, keyed by both `background-color` and
    /// `backgroundColor` spellings.
    Full(BTreeMap<String, String>),
    /// Just the interaction-relevant pair.
    Interaction {
        visibility: String,
        pointer_events: String,
    },
}

impl StyleSnapshot {
    /// Capture a snapshot of `element` at the requested scope.
    pub fn capture(element: &ElementRef, scope: SnapshotScope) -> Self {
        match scope {
            SnapshotScope::Full => {
                let mut styles = BTreeMap::new();
                for (property, value) in element.computed_style() {
                    styles.insert(camelize(&property), value.clone());
                    styles.insert(property, value);
                }
                StyleSnapshot::Full(styles)
            }
            SnapshotScope::Interaction => StyleSnapshot::Interaction {
                visibility: element.style("visibility"),
                pointer_events: element.style("pointer-events"),
            },
        }
    }

    /// Write the preserved values back onto `element` as inline styles.
    pub fn restore(&self, element: &ElementRef) {
        match self {
            StyleSnapshot::Full(styles) => {
                for (property, value) in styles {
                    // The camel-cased duplicates are for callers that index
                    // the map directly; only dashed names go back on the
                    // element.
                    if !property.contains(char::is_uppercase) {
                        element.set_style(property, value);
                    }
                }
            }
            StyleSnapshot::Interaction {
                visibility,
                pointer_events,
            } => {
                element.set_style("visibility", visibility);
                element.set_style("pointer-events", pointer_events);
            }
        }
    }

    /// Look up a preserved property by either spelling.
    pub fn get(&self, property: &str) -> Option<&str> {
        match self {
            StyleSnapshot::Full(styles) => styles.get(property).map(String::as_str),
            StyleSnapshot::Interaction {
                visibility,
                pointer_events,
            } => match property {
                "visibility" => Some(visibility),
                "pointer-events" | "pointerEvents" => Some(pointer_events),
                _ => None,
            },
        }
    }

    /// Number of distinct property spellings held in the snapshot.
    pub fn len(&self) -> usize {
        match self {
            StyleSnapshot::Full(styles) => styles.len(),
            StyleSnapshot::Interaction { .. } => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Convert a dashed CSS property name to its camel-cased spelling
/// (`pointer-events` -> `pointerEvents`).
pub fn camelize(property: &str) -> String {
    let mut out = String::with_capacity(property.len());
    let mut upper_next = false;
    for c in property.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
