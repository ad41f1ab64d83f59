#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum FocusScope {
    Transcript,
    Artifact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum Shortcut {
    Save,
    Undo,
    Redo,
}

/// A window-level keydown as reported by the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// `ctrl`/`cmd` + S, Z, Y and `ctrl`/`cmd` + shift + Z.
    pub fn shortcut(&self) -> Option<Shortcut> {
        if !(self.ctrl || self.meta) || self.alt {
            return None;
        }
        match self.key.to_ascii_lowercase().as_str() {
            "s" => Some(Shortcut::Save),
            "z" if self.shift => Some(Shortcut::Redo),
            "z" => Some(Shortcut::Undo),
            "y" => Some(Shortcut::Redo),
            _ => None,
        }
    }
}

/// Where a shortcut should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Dispatch {
    /// Acts on the transcript's own history or save path.
    Transcript { shortcut: Shortcut },
    /// Save goes through the engine; undo/redo is handed to the rich editor.
    Artifact { shortcut: Shortcut },
    /// Save with no focus context goes to every document.
    SaveAll,
    /// Undo/redo with no focus context. There is no safe default target.
    NoTarget { shortcut: Shortcut },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct KeyOutcome {
    pub dispatch: Option<Dispatch>,
    pub prevent_default: bool,
}

/// Tracks which editing surface the user is working in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusRouter {
    focused: Option<FocusScope>,
    last_active: Option<FocusScope>,
}

impl FocusRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, scope: FocusScope) {
        self.focused = Some(scope);
        self.last_active = Some(scope);
    }

    /// Leaving a region keeps it as the last active surface.
    pub fn leave(&mut self, scope: FocusScope) {
        if self.focused == Some(scope) {
            self.focused = None;
        }
    }

    pub fn last_active(&self) -> Option<FocusScope> {
        self.last_active
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// `closest` is the region containing the focused element at keypress
    /// time, when the UI can tell. It wins over anything stored.
    pub fn resolve(&self, closest: Option<FocusScope>) -> Option<FocusScope> {
        closest.or(self.focused).or(self.last_active)
    }

    pub fn route(&self, shortcut: Shortcut, closest: Option<FocusScope>) -> Dispatch {
        match (self.resolve(closest), shortcut) {
            (Some(FocusScope::Transcript), shortcut) => Dispatch::Transcript { shortcut },
            (Some(FocusScope::Artifact), shortcut) => Dispatch::Artifact { shortcut },
            (None, Shortcut::Save) => Dispatch::SaveAll,
            (None, shortcut) => Dispatch::NoTarget { shortcut },
        }
    }

    /// Every recognized shortcut suppresses the browser default, including
    /// ones that end up doing nothing.
    pub fn handle_key(&self, event: &KeyEvent, closest: Option<FocusScope>) -> KeyOutcome {
        match event.shortcut() {
            Some(shortcut) => KeyOutcome {
                dispatch: Some(self.route(shortcut, closest)),
                prevent_default: true,
            },
            None => KeyOutcome {
                dispatch: None,
                prevent_default: false,
            },
        }
    }
}
