//! Host-page access behind a capability trait.
//!
//! Extraction and classification never talk to a real page; they are generic
//! over [`DomQuery`], which models the handful of read operations the engine
//! needs (selector queries, ancestor matching, text/attribute reads, resolved
//! styling). [`HtmlView`] implements the trait over a parsed HTML snapshot
//! for tests and the developer CLI; a browser host would supply its own
//! implementation.

mod html;

pub use html::HtmlView;

/// Read-only DOM capabilities required by the sensing engine.
///
/// Invalid selectors must be swallowed by implementations (no match), never
/// surfaced: profile tables mix selectors for many markup generations and a
/// stale one must not poison the whole chain.
pub trait DomQuery {
    /// Opaque element handle. Cheap to copy, stable for the life of the view.
    type Node: Copy + Eq + std::fmt::Debug;

    /// First element matching `selector`, in document order, searching the
    /// descendants of `scope` (or the whole document when `scope` is `None`).
    fn query(&self, scope: Option<Self::Node>, selector: &str) -> Option<Self::Node>;

    /// All elements matching `selector` under `scope`, in document order.
    fn query_all(&self, scope: Option<Self::Node>, selector: &str) -> Vec<Self::Node>;

    /// Nearest ancestor (including `node` itself) matching `selector`.
    fn closest(&self, node: Self::Node, selector: &str) -> Option<Self::Node>;

    /// Whether `node` itself matches `selector`.
    fn matches(&self, node: Self::Node, selector: &str) -> bool;

    /// Concatenated descendant text, like `textContent`.
    fn text(&self, node: Self::Node) -> String;

    /// Attribute value, if present.
    fn attr(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Resolved styling relevant to price filtering.
    fn computed_style(&self, node: Self::Node) -> ComputedStyle;

    /// Text content of the document body.
    fn body_text(&self) -> String;
}

/// The two style signals price filtering cares about: struck-through text and
/// the resolved foreground color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    pub line_through: bool,
    pub color: Option<String>,
}
