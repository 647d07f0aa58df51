//! Page model
//!
//! The feed handler never touches a real document. It talks to a small
//! capability trait so the update logic can be tested headlessly against an
//! in-memory model: look up an item's list price node, the single detail
//! price node, and the current path.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Capability interface the price handler patches through
///
/// A missing target is a silent no-op, never an error: updates for items
/// not on the current page are simply dropped.
pub trait PageView: Send + Sync {
    /// Current page path (e.g. `/items` or `/items/vinyl-042`)
    fn path(&self) -> String;

    /// Replace the price text of the list element keyed by `item_id`
    ///
    /// Returns `false` when the item has no node on this page.
    fn patch_list_price(&self, item_id: &str, text: &str) -> bool;

    /// Replace the text of the detail price node
    ///
    /// Returns `false` when this page has no detail node. Callers gate this
    /// on the path matching the item, not this method.
    fn patch_detail_price(&self, text: &str) -> bool;
}

#[derive(Default)]
struct PageState {
    path: String,
    /// List-view price nodes keyed by item id
    list_nodes: HashMap<String, String>,
    /// The single detail-view price node, present only on item pages
    detail_node: Option<String>,
    /// Static currency spans formatted once at page load
    static_spans: Vec<String>,
}

/// In-memory document model
///
/// Stands in for the server-rendered markup: price nodes keyed by item id,
/// an optional detail node, and static currency spans.
pub struct InMemoryPage {
    state: RwLock<PageState>,
}

impl InMemoryPage {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(PageState {
                path: path.into(),
                ..Default::default()
            }),
        }
    }

    /// Add a list-view item with its initial price text
    pub fn insert_item(&self, item_id: impl Into<String>, price_text: impl Into<String>) {
        self.state
            .write()
            .list_nodes
            .insert(item_id.into(), price_text.into());
    }

    /// Set the detail price node (detail pages only)
    pub fn set_detail_node(&self, price_text: impl Into<String>) {
        self.state.write().detail_node = Some(price_text.into());
    }

    /// Add a static currency span
    pub fn add_static_span(&self, text: impl Into<String>) {
        self.state.write().static_spans.push(text.into());
    }

    /// Navigate to another path (list -> detail and back)
    pub fn navigate(&self, path: impl Into<String>) {
        self.state.write().path = path.into();
    }

    /// Read an item's current list price text
    pub fn list_price(&self, item_id: &str) -> Option<String> {
        self.state.read().list_nodes.get(item_id).cloned()
    }

    /// Read the detail price text
    pub fn detail_price(&self) -> Option<String> {
        self.state.read().detail_node.clone()
    }

    /// Read the static spans
    pub fn static_spans(&self) -> Vec<String> {
        self.state.read().static_spans.clone()
    }

    /// Number of list items on the page
    pub fn item_count(&self) -> usize {
        self.state.read().list_nodes.len()
    }

    /// Page-load pass: re-render every static currency span to the shared
    /// two-decimal format
    pub fn format_static_prices(&self) {
        let mut state = self.state.write();
        for span in state.static_spans.iter_mut() {
            *span = crate::domain::money::reformat_text(span);
        }
        if let Some(node) = state.detail_node.as_mut() {
            *node = crate::domain::money::reformat_text(node);
        }
    }
}

impl PageView for InMemoryPage {
    fn path(&self) -> String {
        self.state.read().path.clone()
    }

    fn patch_list_price(&self, item_id: &str, text: &str) -> bool {
        let mut state = self.state.write();
        match state.list_nodes.get_mut(item_id) {
            Some(node) => {
                *node = text.to_string();
                true
            }
            None => false,
        }
    }

    fn patch_detail_price(&self, text: &str) -> bool {
        let mut state = self.state.write();
        match state.detail_node.as_mut() {
            Some(node) => {
                *node = text.to_string();
                true
            }
            None => false,
        }
    }
}
