//! Maps key presses to viewer commands.

use crate::services::score_for_key;
use slint::SharedString;
use slint::platform::Key;

/// Seconds skipped by one video seek step.
const SEEK_STEP_SECS: f64 = 5.0;
/// Volume change, in percent points, of one volume step.
const VOLUME_STEP: i32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Previous,
    Next,
    Score(String),
    Delete,
    SeekUntagged,
    OpenFolder,
    TogglePause,
    Seek(f64),
    Volume(i32),
    Quit,
}

fn is_key(text: &str, key: Key) -> bool {
    text == SharedString::from(key).as_str()
}

/// Command bound to the text of a key event, if any.
pub fn command_for_key(text: &str) -> Option<Command> {
    if is_key(text, Key::LeftArrow) {
        return Some(Command::Previous);
    }
    if is_key(text, Key::RightArrow) {
        return Some(Command::Next);
    }
    if is_key(text, Key::Delete) {
        return Some(Command::Delete);
    }
    if is_key(text, Key::Escape) {
        return Some(Command::Quit);
    }

    let mut chars = text.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    if let Some(score) = score_for_key(c) {
        return Some(Command::Score(score));
    }
    match c {
        'a' => Some(Command::Previous),
        'd' => Some(Command::Next),
        'u' => Some(Command::SeekUntagged),
        'o' => Some(Command::OpenFolder),
        ' ' => Some(Command::TogglePause),
        'j' => Some(Command::Seek(-SEEK_STEP_SECS)),
        'l' => Some(Command::Seek(SEEK_STEP_SECS)),
        '+' | '=' => Some(Command::Volume(VOLUME_STEP)),
        '-' => Some(Command::Volume(-VOLUME_STEP)),
        _ => None,
    }
}
