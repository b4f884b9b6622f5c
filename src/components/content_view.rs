//! Text preview of a window's content payload.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use super::{Component, ComponentContext};
use crate::panel::WindowContentType;
use crate::persistence::{FileType, WindowContent};
use crate::ui::UiFrame;

pub struct ContentView<'a> {
    content_type: WindowContentType,
    content: Option<&'a WindowContent>,
    unreadable: bool,
}

impl<'a> ContentView<'a> {
    pub fn new(content_type: WindowContentType, content: Option<&'a WindowContent>) -> Self {
        Self {
            content_type,
            content,
            unreadable: false,
        }
    }

    /// Mark the stored payload as present but not understood.
    pub fn unreadable(mut self, unreadable: bool) -> Self {
        self.unreadable = unreadable;
        self
    }

    pub fn lines(&self) -> Vec<String> {
        let Some(content) = self.content else {
            return match self.content_type {
                WindowContentType::Test => vec!["Scratch window, not saved.".into()],
                other if self.unreadable => vec![
                    format!("Stored {} content could not be read.", other.as_str()),
                    "It is kept on disk unchanged.".into(),
                ],
                other => vec![format!("No {} content loaded.", other.as_str())],
            };
        };
        match content {
            WindowContent::Notes(notes) => {
                let lines = notes.to_lines();
                if lines.iter().all(String::is_empty) {
                    vec!["Start typing...".into()]
                } else {
                    lines
                }
            }
            WindowContent::Draw(draw) => {
                let mut lines = vec![format!(
                    "{} element(s)  Enter adds, Backspace removes",
                    draw.elements.len()
                )];
                lines.extend(draw.elements.iter().map(|el| {
                    let kind = el.get("type").and_then(|v| v.as_str()).unwrap_or("?");
                    let x = el.get("x").and_then(|v| v.as_f64()).unwrap_or(0.0);
                    let y = el.get("y").and_then(|v| v.as_f64()).unwrap_or(0.0);
                    format!("  {kind} at ({x}, {y})")
                }));
                lines
            }
            WindowContent::Browser(browser) => vec![
                format!("URL  {}", browser.url),
                format!("Zoom {}%", browser.zoom),
            ],
            WindowContent::FileViewer(viewer) => {
                let kind = match viewer.file_type {
                    FileType::Pdf => "pdf",
                    FileType::Markdown => "markdown",
                    FileType::Unknown => "unknown",
                };
                let path = if viewer.file_path.is_empty() {
                    "(type a path)"
                } else {
                    viewer.file_path.as_str()
                };
                vec![
                    format!("File {path}"),
                    format!("Type {kind}"),
                    format!("Zoom {}%", viewer.zoom),
                ]
            }
        }
    }
}

impl Component for ContentView<'_> {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        let style = if ctx.dimmed() {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };
        // Keep the tail of long notes in view.
        let lines = self.lines();
        let skip = lines.len().saturating_sub(area.height as usize);
        for (row, line) in lines.iter().skip(skip).enumerate() {
            frame.set_line(area, row as u16, line, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{BrowserContent, NotesContent};

    #[test]
    fn notes_show_their_paragraphs() {
        let content = WindowContent::Notes(NotesContent::from_lines(["one", "two"]));
        let view = ContentView::new(WindowContentType::Notes, Some(&content));
        assert_eq!(view.lines(), vec!["one", "two"]);
    }

    #[test]
    fn browser_shows_url_and_zoom() {
        let content = WindowContent::Browser(BrowserContent::default());
        let view = ContentView::new(WindowContentType::Browser, Some(&content));
        assert_eq!(view.lines()[0], "URL  https://example.com");
        assert_eq!(view.lines()[1], "Zoom 50%");
    }

    #[test]
    fn scratch_windows_say_they_are_not_saved() {
        let view = ContentView::new(WindowContentType::Test, None);
        assert!(view.lines()[0].contains("not saved"));
    }

    #[test]
    fn unreadable_payloads_are_called_out() {
        let view = ContentView::new(WindowContentType::Draw, None).unreadable(true);
        assert_eq!(view.lines()[0], "Stored draw content could not be read.");
    }
}
