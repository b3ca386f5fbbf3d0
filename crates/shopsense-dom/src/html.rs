use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::{ComputedStyle, DomQuery};

/// [`DomQuery`] over a parsed HTML snapshot.
///
/// Resolved styling is approximated from inline `style` attributes along the
/// ancestor chain; that is all a static snapshot can carry, and it matches
/// what the storefronts in scope actually emit for sale/strike prices.
pub struct HtmlView {
    html: Html,
}

impl HtmlView {
    #[must_use]
    pub fn parse(document: &str) -> Self {
        HtmlView {
            html: Html::parse_document(document),
        }
    }

    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// Runs `selector` over the whole document, keeping matches that are
    /// strict descendants of `scope` when one is given.
    fn select_ids(&self, scope: Option<NodeId>, selector: &str) -> Vec<NodeId> {
        let Ok(parsed) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.html
            .select(&parsed)
            .filter(|element| match scope {
                None => true,
                Some(scope_id) => {
                    element.id() != scope_id
                        && element.ancestors().any(|ancestor| ancestor.id() == scope_id)
                }
            })
            .map(|element| element.id())
            .collect()
    }
}

impl DomQuery for HtmlView {
    type Node = NodeId;

    fn query(&self, scope: Option<NodeId>, selector: &str) -> Option<NodeId> {
        self.select_ids(scope, selector).into_iter().next()
    }

    fn query_all(&self, scope: Option<NodeId>, selector: &str) -> Vec<NodeId> {
        self.select_ids(scope, selector)
    }

    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let matching: Vec<NodeId> = self.select_ids(None, selector);
        let node_ref = self.html.tree.get(node)?;
        if matching.contains(&node) {
            return Some(node);
        }
        node_ref
            .ancestors()
            .map(|ancestor| ancestor.id())
            .find(|id| matching.contains(id))
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        self.select_ids(None, selector).contains(&node)
    }

    fn text(&self, node: NodeId) -> String {
        self.element(node)
            .map(|element| element.text().collect::<String>())
            .unwrap_or_default()
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?
            .value()
            .attr(name)
            .map(ToString::to_string)
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        let mut style = ComputedStyle::default();
        let Some(node_ref) = self.html.tree.get(node) else {
            return style;
        };

        // Nearest declaration wins for color; line-through anywhere up the
        // chain strikes the descendant text visually.
        let chain = std::iter::once(node_ref).chain(node_ref.ancestors());
        for ancestor in chain {
            let Some(element) = ElementRef::wrap(ancestor) else {
                continue;
            };
            let Some(inline) = element.value().attr("style") else {
                continue;
            };
            for declaration in inline.split(';') {
                let Some((property, value)) = declaration.split_once(':') else {
                    continue;
                };
                let property = property.trim().to_lowercase();
                let value = value.trim();
                match property.as_str() {
                    "text-decoration" | "text-decoration-line" => {
                        if value.to_lowercase().contains("line-through") {
                            style.line_through = true;
                        }
                    }
                    "color" => {
                        if style.color.is_none() {
                            style.color = Some(value.to_lowercase());
                        }
                    }
                    _ => {}
                }
            }
        }
        style
    }

    fn body_text(&self) -> String {
        self.query(None, "body")
            .map(|body| self.text(body))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
        <html><body>
          <div id="card" class="product-card">
            <h2><a href="/dp/B0EXAMPLE1"><span>Inside title</span></a></h2>
            <span class="price" style="color: #999999; text-decoration: line-through">$24.99</span>
            <span class="price">$19.99</span>
          </div>
          <h1 id="outside">Outside title</h1>
        </body></html>
    "#;

    #[test]
    fn query_scopes_to_descendants() {
        let view = HtmlView::parse(DOC);
        let card = view.query(None, "#card").unwrap();
        assert!(view.query(Some(card), "h1").is_none());
        let span = view.query(Some(card), "h2 a span").unwrap();
        assert_eq!(view.text(span), "Inside title");
    }

    #[test]
    fn query_all_preserves_document_order() {
        let view = HtmlView::parse(DOC);
        let prices = view.query_all(None, ".price");
        assert_eq!(prices.len(), 2);
        assert_eq!(view.text(prices[0]), "$24.99");
        assert_eq!(view.text(prices[1]), "$19.99");
    }

    #[test]
    fn closest_walks_to_matching_ancestor() {
        let view = HtmlView::parse(DOC);
        let span = view.query(None, "h2 a span").unwrap();
        let card = view.closest(span, r#"[class*="card"]"#).unwrap();
        assert_eq!(view.attr(card, "id").as_deref(), Some("card"));
        // closest includes the node itself
        assert_eq!(view.closest(span, "span"), Some(span));
    }

    #[test]
    fn inline_style_resolution() {
        let view = HtmlView::parse(DOC);
        let prices = view.query_all(None, ".price");
        let struck = view.computed_style(prices[0]);
        assert!(struck.line_through);
        assert_eq!(struck.color.as_deref(), Some("#999999"));
        assert!(!view.computed_style(prices[1]).line_through);
    }

    #[test]
    fn invalid_selector_is_swallowed() {
        let view = HtmlView::parse(DOC);
        assert!(view.query(None, "span:contains('x')").is_none());
        assert!(view.query_all(None, "[[broken").is_empty());
    }

    #[test]
    fn body_text_concatenates() {
        let view = HtmlView::parse(DOC);
        assert!(view.body_text().contains("Outside title"));
        assert!(view.body_text().contains("$19.99"));
    }
}
