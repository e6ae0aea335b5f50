//! Popup open/close behavior per marker.
//!
//! Each marker's popup is a two-state machine driven by pointer events. The
//! click and hover behaviors are interchangeable [`MarkerHandler`] strategies
//! acting on a [`PopupController`].

use serde::Serialize;

use crate::config::PopupStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEvent {
    Click,
    PointerEnter,
    PointerLeave,
}

pub trait PopupController {
    fn is_open(&self) -> bool;
    fn open(&mut self);
    fn close(&mut self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PopupState {
    #[default]
    Closed,
    Open,
}

impl PopupController for PopupState {
    fn is_open(&self) -> bool {
        *self == PopupState::Open
    }

    fn open(&mut self) {
        *self = PopupState::Open;
    }

    fn close(&mut self) {
        *self = PopupState::Closed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    Click,
    Hover,
}

impl InteractionMode {
    pub fn for_style(style: PopupStyle) -> Self {
        match style {
            PopupStyle::Detailed => InteractionMode::Click,
            PopupStyle::Hover => InteractionMode::Hover,
        }
    }

    /// A fresh handler; handlers carry per-marker state and are not shared.
    pub fn handler(self) -> Box<dyn MarkerHandler> {
        match self {
            InteractionMode::Click => Box::new(ClickToggle),
            InteractionMode::Hover => Box::new(HoverPreview::default()),
        }
    }
}

/// Reacts to marker events by opening or closing the bound popup.
pub trait MarkerHandler {
    fn mode(&self) -> InteractionMode;
    fn handle(&mut self, event: MarkerEvent, popup: &mut dyn PopupController);
}

/// Click opens a closed popup and closes an open one. Pointer movement is ignored.
#[derive(Debug, Default)]
pub struct ClickToggle;

impl MarkerHandler for ClickToggle {
    fn mode(&self) -> InteractionMode {
        InteractionMode::Click
    }

    fn handle(&mut self, event: MarkerEvent, popup: &mut dyn PopupController) {
        if event == MarkerEvent::Click {
            if popup.is_open() {
                popup.close();
            } else {
                popup.open();
            }
        }
    }
}

/// Pointer enter opens, pointer leave closes. A click pins the popup open so
/// that leaving no longer closes it; further clicks keep it open.
#[derive(Debug, Default)]
pub struct HoverPreview {
    pinned: bool,
}

impl HoverPreview {
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }
}

impl MarkerHandler for HoverPreview {
    fn mode(&self) -> InteractionMode {
        InteractionMode::Hover
    }

    fn handle(&mut self, event: MarkerEvent, popup: &mut dyn PopupController) {
        match event {
            MarkerEvent::PointerEnter => popup.open(),
            MarkerEvent::PointerLeave => {
                if !self.pinned {
                    popup.close();
                }
            }
            MarkerEvent::Click => {
                self.pinned = true;
                popup.open();
            }
        }
    }
}
