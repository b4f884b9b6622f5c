use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub mod chronometer;
pub mod clock;
pub mod content_view;
pub mod editor;
pub mod help_overlay;
pub mod panel_frame;
pub mod status_bar;
pub mod timer;

pub use chronometer::{Chronometer, ChronometerWidget};
pub use clock::ClockWidget;
pub use content_view::ContentView;
pub use help_overlay::HelpOverlay;
pub use panel_frame::PanelFrame;
pub use status_bar::StatusBar;
pub use timer::SessionTimerWidget;

pub use crate::component_context::ComponentContext;

pub trait Component {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    struct Fill(char);

    impl Component for Fill {
        fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _ctx: &ComponentContext) {
            let line: String = std::iter::repeat_n(self.0, area.width as usize).collect();
            for row in 0..area.height {
                frame.set_line(area, row, &line, Default::default());
            }
        }
    }

    #[test]
    fn components_draw_through_the_clipping_frame() {
        let screen = Rect::new(0, 0, 4, 2);
        let mut buffer = Buffer::empty(screen);
        let mut frame = UiFrame::from_parts(screen, &mut buffer);
        Fill('x').render(&mut frame, Rect::new(2, 1, 10, 10), &ComponentContext::default());
        assert_eq!(buffer.cell((3, 1)).unwrap().symbol(), "x");
        assert_eq!(buffer.cell((1, 1)).unwrap().symbol(), " ");
    }
}
