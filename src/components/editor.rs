//! Keyboard editing of window content payloads.
//!
//! Each content type exposes one editable text field: the notes body, the
//! browser URL or the file viewer path. Drawing windows take Enter as "add a
//! shape" and Backspace as "remove the last one".

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::json;

use crate::persistence::{FileType, NotesContent, WindowContent, clamp_zoom};

/// Apply a key press to `content`. Returns whether anything changed.
pub fn apply_key(content: &mut WindowContent, key: &KeyEvent) -> bool {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return false;
    }
    match content {
        WindowContent::Notes(notes) => edit_notes(notes, key.code),
        WindowContent::Draw(draw) => match key.code {
            KeyCode::Enter => {
                let n = draw.elements.len();
                draw.elements.push(json!({
                    "id": format!("el-{n}"),
                    "type": "rectangle",
                    "x": (n % 8) * 24,
                    "y": (n / 8) * 24,
                    "width": 20,
                    "height": 20,
                }));
                true
            }
            KeyCode::Backspace => draw.elements.pop().is_some(),
            _ => false,
        },
        WindowContent::Browser(browser) => edit_line(&mut browser.url, key.code),
        WindowContent::FileViewer(viewer) => {
            let changed = edit_line(&mut viewer.file_path, key.code);
            if changed {
                viewer.file_type = FileType::detect(&viewer.file_path);
            }
            changed
        }
    }
}

/// Step the zoom of a browser or file viewer payload by `delta` percent.
pub fn zoom_by(content: &mut WindowContent, delta: i32) -> bool {
    let zoom = match content {
        WindowContent::Browser(browser) => &mut browser.zoom,
        WindowContent::FileViewer(viewer) => &mut viewer.zoom,
        WindowContent::Notes(_) | WindowContent::Draw(_) => return false,
    };
    let next = clamp_zoom(zoom.saturating_add_signed(delta));
    let changed = next != *zoom;
    *zoom = next;
    changed
}

fn edit_notes(notes: &mut NotesContent, code: KeyCode) -> bool {
    let mut lines = notes.to_lines();
    let changed = match code {
        KeyCode::Char(c) => {
            match lines.last_mut() {
                Some(line) => line.push(c),
                None => lines.push(c.to_string()),
            }
            true
        }
        KeyCode::Enter => {
            if lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(String::new());
            true
        }
        KeyCode::Backspace => match lines.last_mut() {
            Some(line) if !line.is_empty() => line.pop().is_some(),
            Some(_) => lines.pop().is_some(),
            None => false,
        },
        _ => false,
    };
    if changed {
        *notes = NotesContent::from_lines(lines.iter().map(String::as_str));
    }
    changed
}

fn edit_line(line: &mut String, code: KeyCode) -> bool {
    match code {
        KeyCode::Char(c) => {
            line.push(c);
            true
        }
        KeyCode::Backspace => line.pop().is_some(),
        _ => false,
    }
}
