//! Bottom sheet presentation state.
//!
//! Visibility is driven only by `show`/`hide`/`toggle`. Banner and progress
//! updates rewrite the bound content and never change visibility.

use crate::events::ActionSource;
use crate::guidance::{format_distance, format_duration, BannerInstruction, RouteProgress};
use crate::route::DistanceUnit;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum SheetState {
    #[default]
    Hidden,
    Collapsed,
    Expanded,
}

impl SheetState {
    pub const fn is_visible(self) -> bool {
        matches!(self, SheetState::Collapsed | SheetState::Expanded)
    }
}

/// Package-provided panel buttons.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum QuickAction {
    Overview,
    Recenter,
    Mute,
    Unmute,
    ToggleMute,
    Stop,
}

impl QuickAction {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "overview" => Some(QuickAction::Overview),
            "recenter" => Some(QuickAction::Recenter),
            "mute" => Some(QuickAction::Mute),
            "unmute" => Some(QuickAction::Unmute),
            "toggleMute" => Some(QuickAction::ToggleMute),
            "stop" => Some(QuickAction::Stop),
            _ => None,
        }
    }

    pub const fn id(self) -> &'static str {
        match self {
            QuickAction::Overview => "overview",
            QuickAction::Recenter => "recenter",
            QuickAction::Mute => "mute",
            QuickAction::Unmute => "unmute",
            QuickAction::ToggleMute => "toggleMute",
            QuickAction::Stop => "stop",
        }
    }
}

/// Result of pressing a panel button.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ActionPress {
    pub action_id: String,
    pub action: Option<QuickAction>,
    pub source: ActionSource,
}

/// Text and numbers currently bound into the panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetContent {
    pub primary_text: Option<String>,
    pub secondary_text: Option<String>,
    pub step_distance: Option<String>,
    pub distance_remaining: Option<String>,
    pub duration_remaining: Option<String>,
    pub fraction_traveled: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct BottomSheetController {
    state: SheetState,
    enabled: bool,
    initially_expanded: bool,
    unit: DistanceUnit,
    content: SheetContent,
}

impl Default for BottomSheetController {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl BottomSheetController {
    pub fn new(enabled: bool, initially_expanded: bool) -> Self {
        Self {
            state: SheetState::Hidden,
            enabled,
            initially_expanded,
            unit: DistanceUnit::Metric,
            content: SheetContent::default(),
        }
    }

    pub fn state(&self) -> SheetState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }

    pub fn content(&self) -> &SheetContent {
        &self.content
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.state = SheetState::Hidden;
        }
    }

    pub fn set_initially_expanded(&mut self, expanded: bool) {
        self.initially_expanded = expanded;
    }

    pub fn set_unit(&mut self, unit: DistanceUnit) {
        self.unit = unit;
    }

    /// Move to `target`. A disabled sheet stays hidden.
    pub fn show(&mut self, target: SheetState) -> SheetState {
        if self.enabled {
            self.state = target;
        }
        self.state
    }

    /// Show at the configured initial detent.
    pub fn present(&mut self) -> SheetState {
        let target = if self.initially_expanded {
            SheetState::Expanded
        } else {
            SheetState::Collapsed
        };
        self.show(target)
    }

    pub fn hide(&mut self) {
        self.state = SheetState::Hidden;
    }

    /// Collapsed <-> Expanded. Returns false (no change) when hidden.
    pub fn toggle(&mut self) -> bool {
        self.state = match self.state {
            SheetState::Collapsed => SheetState::Expanded,
            SheetState::Expanded => SheetState::Collapsed,
            SheetState::Hidden => return false,
        };
        true
    }

    pub fn apply_banner(&mut self, banner: &BannerInstruction) {
        self.content.primary_text = Some(banner.primary_text.clone());
        self.content.secondary_text = banner.secondary_text.clone();
        self.content.step_distance = Some(format_distance(banner.step_distance_remaining, self.unit));
    }

    pub fn apply_progress(&mut self, progress: &RouteProgress) {
        self.content.distance_remaining = Some(format_distance(progress.distance_remaining, self.unit));
        self.content.duration_remaining = Some(format_duration(progress.duration_remaining));
        self.content.fraction_traveled = Some(progress.fraction_traveled);
    }

    pub fn clear_content(&mut self) {
        self.content = SheetContent::default();
    }

    /// Resolve a pressed button id into a builtin action or a custom pass-through.
    pub fn press(&self, action_id: &str) -> ActionPress {
        let action = QuickAction::from_id(action_id);
        ActionPress {
            action_id: action_id.to_string(),
            action,
            source: if action.is_some() {
                ActionSource::Builtin
            } else {
                ActionSource::Custom
            },
        }
    }
}
