//! Enumerated option values and their fixed wire-string mappings.
//!
//! The driver expects enumerated configuration values as lower-cased or
//! dash-cased strings. These are pure lookup tables expressed as serde
//! rename attributes; the codec and the higher-level API consume them but
//! add no per-enum behavior.

use serde::{Deserialize, Serialize};

/// Mouse button for click actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Left mouse button (default)
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Keyboard modifier keys. Carried on the wire in PascalCase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyboardModifier {
    /// Alt key
    Alt,
    /// Control key
    Control,
    /// Meta key (Command on macOS, Windows key on Windows)
    Meta,
    /// Shift key
    Shift,
    /// Control on Windows/Linux, Meta on macOS
    ControlOrMeta,
}

/// SameSite cookie attribute. Capitalized on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SameSite {
    /// Cookie is sent with same-site and cross-site requests
    #[serde(rename = "None")]
    None,
    /// Cookie is sent with same-site requests and cross-site top-level navigations
    #[default]
    #[serde(rename = "Lax")]
    Lax,
    /// Cookie is only sent with same-site requests
    #[serde(rename = "Strict")]
    Strict,
}

/// Emulated `prefers-color-scheme` media value. Dash-cased on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    /// prefers-color-scheme: light
    Light,
    /// prefers-color-scheme: dark
    Dark,
    /// No preference expressed
    NoPreference,
}

/// Emulated `prefers-reduced-motion` media value. Dash-cased on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReducedMotion {
    /// prefers-reduced-motion: reduce
    Reduce,
    /// No preference expressed
    NoPreference,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lowercase_mapping() {
        assert_eq!(serde_json::to_value(MouseButton::Left).unwrap(), json!("left"));
        assert_eq!(
            serde_json::from_value::<MouseButton>(json!("middle")).unwrap(),
            MouseButton::Middle
        );
    }

    #[test]
    fn pascal_case_modifiers() {
        assert_eq!(
            serde_json::to_value(KeyboardModifier::ControlOrMeta).unwrap(),
            json!("ControlOrMeta")
        );
    }

    #[test]
    fn dash_case_mapping() {
        assert_eq!(
            serde_json::to_value(ColorScheme::NoPreference).unwrap(),
            json!("no-preference")
        );
        assert_eq!(
            serde_json::to_value(ReducedMotion::Reduce).unwrap(),
            json!("reduce")
        );
    }

    #[test]
    fn same_site_is_capitalized() {
        assert_eq!(serde_json::to_value(SameSite::Strict).unwrap(), json!("Strict"));
        assert_eq!(
            serde_json::from_value::<SameSite>(json!("Lax")).unwrap(),
            SameSite::Lax
        );
    }
}
