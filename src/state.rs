//! Loading / empty / error / ready lifecycle of one pipeline run.

use serde::Serialize;
use tracing::{debug, warn};

use crate::page::{Page, PageNode};
use crate::popup::escape_html;

pub const LOADING_NODE_ID: &str = "loading";
pub const ERROR_NODE_ID: &str = "load-error";

pub const EMPTY_NOTICE: &str = "No bird sightings found. The data may not have been scraped yet.";
const ERROR_HINT: &str = "Please make sure the scraper has run at least once.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum PipelineState {
    #[default]
    Idle,
    Loading,
    Empty,
    Error(String),
    Ready,
}

impl PipelineState {
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Loading => "loading",
            PipelineState::Empty => "empty",
            PipelineState::Error(_) => "error",
            PipelineState::Ready => "ready",
        }
    }
}

/// Applies state transitions and their page side effects.
///
/// `Loading` can be entered from any state; the three terminal states only
/// from `Loading`. Every terminal transition removes the loading node.
#[derive(Debug, Default)]
pub struct LoadingStateController {
    state: PipelineState,
}

impl LoadingStateController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn enter_loading(&mut self, page: &mut impl Page) {
        // A previous run's error panel does not survive a new run.
        page.remove(ERROR_NODE_ID);
        page.remove(LOADING_NODE_ID);
        page.insert(PageNode {
            id: LOADING_NODE_ID.to_string(),
            class_name: "loading".to_string(),
            html: "<div class=\"loading-spinner\"></div>\n<p>Loading rare bird sightings...</p>"
                .to_string(),
        });
        self.state = PipelineState::Loading;
        debug!("Entered loading state");
    }

    pub fn finish_empty(&mut self, page: &mut impl Page) {
        if self.leave_loading(page, PipelineState::Empty) {
            page.notify(EMPTY_NOTICE);
        }
    }

    pub fn finish_ready(&mut self, page: &mut impl Page) {
        self.leave_loading(page, PipelineState::Ready);
    }

    pub fn fail(&mut self, page: &mut impl Page, message: &str) {
        if self.leave_loading(page, PipelineState::Error(message.to_string())) {
            page.insert(PageNode {
                id: ERROR_NODE_ID.to_string(),
                class_name: "loading".to_string(),
                html: format!(
                    "<p style=\"color: #e74c3c;\">\n<strong>Error loading bird data</strong><br>\n{}<br><br>\n{}\n</p>",
                    escape_html(message),
                    ERROR_HINT
                ),
            });
        }
    }

    fn leave_loading(&mut self, page: &mut impl Page, next: PipelineState) -> bool {
        if self.state != PipelineState::Loading {
            warn!(
                from = self.state.label(),
                to = next.label(),
                "Ignoring transition outside loading"
            );
            return false;
        }
        page.remove(LOADING_NODE_ID);
        debug!(to = next.label(), "Left loading state");
        self.state = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::HtmlPage;

    #[test]
    fn test_loading_inserts_indicator() {
        let mut page = HtmlPage::new();
        let mut controller = LoadingStateController::new();
        assert_eq!(controller.state(), &PipelineState::Idle);

        controller.enter_loading(&mut page);

        assert_eq!(controller.state(), &PipelineState::Loading);
        let node = page.node(LOADING_NODE_ID).unwrap();
        assert!(node.html.contains("Loading rare bird sightings..."));
    }

    #[test]
    fn test_ready_removes_indicator() {
        let mut page = HtmlPage::new();
        let mut controller = LoadingStateController::new();
        controller.enter_loading(&mut page);
        controller.finish_ready(&mut page);

        assert_eq!(controller.state(), &PipelineState::Ready);
        assert!(page.nodes().is_empty());
        assert!(page.notices().is_empty());
    }

    #[test]
    fn test_empty_notifies_without_error_panel() {
        let mut page = HtmlPage::new();
        let mut controller = LoadingStateController::new();
        controller.enter_loading(&mut page);
        controller.finish_empty(&mut page);

        assert_eq!(controller.state(), &PipelineState::Empty);
        assert!(page.node(LOADING_NODE_ID).is_none());
        assert!(page.node(ERROR_NODE_ID).is_none());
        assert_eq!(page.notices(), &[EMPTY_NOTICE.to_string()]);
    }

    #[test]
    fn test_error_panel_shows_escaped_message_and_hint() {
        let mut page = HtmlPage::new();
        let mut controller = LoadingStateController::new();
        controller.enter_loading(&mut page);
        controller.fail(&mut page, "HTTP error! status: 404 <oops>");

        assert_eq!(
            controller.state(),
            &PipelineState::Error("HTTP error! status: 404 <oops>".into())
        );
        assert!(page.node(LOADING_NODE_ID).is_none());
        let panel = page.node(ERROR_NODE_ID).unwrap();
        assert!(panel.html.contains("HTTP error! status: 404 &lt;oops&gt;"));
        assert!(panel.html.contains(ERROR_HINT));
    }

    #[test]
    fn test_terminal_transition_requires_loading() {
        let mut page = HtmlPage::new();
        let mut controller = LoadingStateController::new();
        controller.finish_ready(&mut page);
        assert_eq!(controller.state(), &PipelineState::Idle);

        controller.enter_loading(&mut page);
        controller.finish_ready(&mut page);
        controller.fail(&mut page, "late");
        assert_eq!(controller.state(), &PipelineState::Ready);
        assert!(page.node(ERROR_NODE_ID).is_none());
    }

    #[test]
    fn test_reentering_loading_clears_previous_error() {
        let mut page = HtmlPage::new();
        let mut controller = LoadingStateController::new();
        controller.enter_loading(&mut page);
        controller.fail(&mut page, "boom");
        controller.enter_loading(&mut page);

        assert!(page.node(ERROR_NODE_ID).is_none());
        assert_eq!(page.nodes().len(), 1);
    }
}
