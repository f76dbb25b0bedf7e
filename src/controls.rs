// Keyboard bindings for the window.

use ascii_mirror::{Settings, SourceMode};
use minifb::Key;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    FlipH,
    FlipV,
    Glitch,
    StrongRowGlitch,
    Scatter,
    MouseAvoid,
    PatternAnimate,
    BrightOnly,
    NextShape,
    NextPattern,
    ToggleSource,
    Export,
    Reset,
}

pub fn action_for_key(key: Key) -> Option<Action> {
    Some(match key {
        Key::H => Action::FlipH,
        Key::V => Action::FlipV,
        Key::G => Action::Glitch,
        Key::R => Action::StrongRowGlitch,
        Key::S => Action::Scatter,
        Key::M => Action::MouseAvoid,
        Key::A => Action::PatternAnimate,
        Key::B => Action::BrightOnly,
        Key::N => Action::NextShape,
        Key::P => Action::NextPattern,
        Key::Tab => Action::ToggleSource,
        Key::E => Action::Export,
        Key::C => Action::Reset,
        _ => return None,
    })
}

impl Action {
    /// Apply the action to `settings`. Returns false for actions the caller
    /// handles itself (export).
    pub fn apply(self, settings: &mut Settings) -> bool {
        match self {
            Action::FlipH => settings.flip_h = !settings.flip_h,
            Action::FlipV => settings.flip_v = !settings.flip_v,
            Action::Glitch => settings.glitch = !settings.glitch,
            Action::StrongRowGlitch => settings.glitch_row = !settings.glitch_row,
            Action::Scatter => settings.scatter = !settings.scatter,
            Action::MouseAvoid => settings.mouse_avoid = !settings.mouse_avoid,
            Action::PatternAnimate => settings.pattern_animate = !settings.pattern_animate,
            Action::BrightOnly => settings.bright_only = !settings.bright_only,
            Action::NextShape => settings.shape = settings.shape.next(),
            Action::NextPattern => settings.pattern = settings.pattern.next(),
            Action::ToggleSource => {
                settings.source = match settings.source {
                    SourceMode::Camera => SourceMode::Image,
                    SourceMode::Image => SourceMode::Camera,
                }
            }
            Action::Reset => *settings = Settings::default(),
            Action::Export => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascii_mirror::Shape;

    #[test]
    fn unbound_keys_do_nothing() {
        assert_eq!(action_for_key(Key::Z), None);
        assert_eq!(action_for_key(Key::Escape), None);
    }

    #[test]
    fn toggles_flip_back() {
        let mut s = Settings::default();
        for key in [Key::H, Key::V, Key::G, Key::R, Key::S, Key::M, Key::A, Key::B] {
            let action = action_for_key(key).unwrap();
            assert!(action.apply(&mut s));
            assert_ne!(s, Settings::default(), "{key:?} changed nothing");
            action.apply(&mut s);
            assert_eq!(s, Settings::default());
        }
    }

    #[test]
    fn cycling_and_source_toggle() {
        let mut s = Settings::default();
        Action::NextShape.apply(&mut s);
        assert_eq!(s.shape, Shape::Rectangle.next());
        Action::ToggleSource.apply(&mut s);
        assert_eq!(s.source, SourceMode::Image);
        Action::ToggleSource.apply(&mut s);
        assert_eq!(s.source, SourceMode::Camera);
    }

    #[test]
    fn reset_restores_defaults_and_export_is_external() {
        let mut s = Settings { density: 10.0, glitch: true, ..Settings::default() };
        assert!(!Action::Export.apply(&mut s));
        assert!(s.glitch);
        Action::Reset.apply(&mut s);
        assert_eq!(s, Settings::default());
    }
}
