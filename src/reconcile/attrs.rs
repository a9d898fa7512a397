//! Root attribute diffing.
//!
//! Pure function from (live attributes, fetched attributes) to the writes
//! needed to make the live element match.

use rustc_hash::FxHashSet;

use crate::dom::Attrs;

/// Attribute writes for one root element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrDiff {
    /// New or changed attributes, in the fetched element's attribute order
    pub set: Vec<(String, String)>,
    /// Attributes present on the live element but not on the fetched one
    pub remove: Vec<String>,
}

impl AttrDiff {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }

    /// Number of attribute writes.
    pub fn len(&self) -> usize {
        self.set.len() + self.remove.len()
    }
}

/// Compute the writes that turn `live` into `fetched`.
///
/// Attributes whose value is already equal are left out of `set`, so diffing
/// an element against itself yields an empty diff.
pub fn diff_attrs(live: &Attrs, fetched: &Attrs) -> AttrDiff {
    let set = fetched
        .iter()
        .filter(|(name, value)| live.get(name) != Some(*value))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    let keep: FxHashSet<&str> = fetched.names().collect();
    let remove = live
        .names()
        .filter(|name| !keep.contains(name))
        .map(str::to_string)
        .collect();

    AttrDiff { set, remove }
}
