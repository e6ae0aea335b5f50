//! The page around the map: transient nodes, footer, and notices.

use serde::Serialize;

/// A node inserted at the end of the page body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageNode {
    pub id: String,
    pub class_name: String,
    pub html: String,
}

pub trait Page {
    fn insert(&mut self, node: PageNode);
    /// Removes the node with `id`. Returns `false` when it was not present.
    fn remove(&mut self, id: &str) -> bool;
    fn set_footer(&mut self, html: String);
    /// A blocking, user-visible message.
    fn notify(&mut self, message: &str);
}

/// In-memory page model, rendered into the final document by
/// [`crate::output::render_document`].
#[derive(Debug, Default, Clone, Serialize)]
pub struct HtmlPage {
    nodes: Vec<PageNode>,
    footer: Option<String>,
    notices: Vec<String>,
}

impl HtmlPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[PageNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&PageNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn footer(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

impl Page for HtmlPage {
    fn insert(&mut self, node: PageNode) {
        self.nodes.push(node);
    }

    fn remove(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        self.nodes.len() != before
    }

    fn set_footer(&mut self, html: String) {
        self.footer = Some(html);
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_is_idempotent() {
        let mut page = HtmlPage::new();
        page.insert(PageNode {
            id: "loading".into(),
            class_name: "loading".into(),
            html: "<p>...</p>".into(),
        });

        assert!(page.remove("loading"));
        assert!(!page.remove("loading"));
        assert!(page.nodes().is_empty());
    }
}
