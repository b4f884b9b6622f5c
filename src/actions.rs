use std::fmt;

use crate::panel::{WidgetType, WindowContentType};

/// Commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellAction {
    Quit,
    ToggleHelp,
    OpenWindow(WindowContentType),
    OpenWidget(WidgetType),
    CloseActive,
    CycleFocus,
    // Geometry of the active panel
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    GrowWidth,
    ShrinkWidth,
    GrowHeight,
    ShrinkHeight,
    // Display settings
    OpacityUp,
    OpacityDown,
    ToggleBackground,
    FlipWidget,
    ZoomIn,
    ZoomOut,
    // Overlay
    ToggleOverlayMode,
    ToggleOverlayVisible,
    ToggleMouseCapture,
    // Chronometer
    ChronometerStartPause,
    ChronometerReset,
}

impl fmt::Display for ShellAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShellAction::Quit => "Quit",
            ShellAction::ToggleHelp => "Toggle help",
            ShellAction::OpenWindow(WindowContentType::Notes) => "New notes window",
            ShellAction::OpenWindow(WindowContentType::Draw) => "New drawing window",
            ShellAction::OpenWindow(WindowContentType::Browser) => "New browser window",
            ShellAction::OpenWindow(WindowContentType::FileViewer) => "New file viewer",
            ShellAction::OpenWindow(WindowContentType::Test) => "New scratch window (not saved)",
            ShellAction::OpenWidget(WidgetType::Clock) => "New clock widget",
            ShellAction::OpenWidget(WidgetType::Timer) => "New session timer widget",
            ShellAction::OpenWidget(WidgetType::Chronometer) => "New chronometer widget",
            ShellAction::CloseActive => "Close active panel",
            ShellAction::CycleFocus => "Raise next window",
            ShellAction::MoveLeft => "Move left",
            ShellAction::MoveRight => "Move right",
            ShellAction::MoveUp => "Move up",
            ShellAction::MoveDown => "Move down",
            ShellAction::GrowWidth => "Widen",
            ShellAction::ShrinkWidth => "Narrow",
            ShellAction::GrowHeight => "Taller",
            ShellAction::ShrinkHeight => "Shorter",
            ShellAction::OpacityUp => "More opaque",
            ShellAction::OpacityDown => "More transparent",
            ShellAction::ToggleBackground => "Toggle transparent background",
            ShellAction::FlipWidget => "Flip widget",
            ShellAction::ZoomIn => "Zoom in",
            ShellAction::ZoomOut => "Zoom out",
            ShellAction::ToggleOverlayMode => "Toggle windowed / fullscreen",
            ShellAction::ToggleOverlayVisible => "Show / hide overlay",
            ShellAction::ToggleMouseCapture => "Toggle mouse capture",
            ShellAction::ChronometerStartPause => "Start / pause chronometer",
            ShellAction::ChronometerReset => "Reset chronometer",
        };
        write!(f, "{}", s)
    }
}
