//! Per-input-source device state and the session-scoped store that owns it

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use wd_actions_core_types::{InputSourceId, Point};

use crate::errors::{ActionError, ActionResult};
use crate::keys::Modifier;

/// Kind of pointing device behind a pointer input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointerType {
    #[default]
    Mouse,
    Pen,
    Touch,
}

impl PointerType {
    pub fn parse(raw: &str) -> ActionResult<Self> {
        match raw {
            "mouse" => Ok(PointerType::Mouse),
            "pen" => Ok(PointerType::Pen),
            "touch" => Ok(PointerType::Touch),
            other => Err(ActionError::invalid(format!(
                "Unknown pointerType: {other:?}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PointerType::Mouse => "mouse",
            PointerType::Pen => "pen",
            PointerType::Touch => "touch",
        }
    }
}

impl fmt::Display for PointerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant of [`InputState`], together with the pointer subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    None,
    Key,
    Pointer(PointerType),
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::None => f.write_str("none"),
            SourceKind::Key => f.write_str("key"),
            SourceKind::Pointer(subtype) => write!(f, "pointer ({subtype})"),
        }
    }
}

/// Modifier flags, either of one key source or ORed across all of them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn set(&mut self, modifier: Modifier, value: bool) {
        match modifier {
            Modifier::Alt => self.alt = value,
            Modifier::Shift => self.shift = value,
            Modifier::Ctrl => self.ctrl = value,
            Modifier::Meta => self.meta = value,
        }
    }

    pub fn union(self, other: Modifiers) -> Modifiers {
        Modifiers {
            alt: self.alt || other.alt,
            shift: self.shift || other.shift,
            ctrl: self.ctrl || other.ctrl,
            meta: self.meta || other.meta,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyState {
    /// Normalized key values, before any shift remapping
    pub pressed: BTreeSet<String>,
    pub modifiers: Modifiers,
}

impl KeyState {
    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.contains(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerState {
    pub subtype: PointerType,
    pub pressed: BTreeSet<u32>,
    pub position: Point,
}

impl PointerState {
    pub fn new(subtype: PointerType) -> Self {
        Self {
            subtype,
            pressed: BTreeSet::new(),
            position: Point::ORIGIN,
        }
    }

    pub fn is_pressed(&self, button: u32) -> bool {
        self.pressed.contains(&button)
    }

    /// `MouseEvent.buttons`: one bit per pressed button number
    pub fn buttons_mask(&self) -> u32 {
        self.pressed
            .iter()
            .filter(|button| **button < 32)
            .fold(0, |mask, button| mask | (1 << button))
    }
}

/// Device state for one input source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputState {
    Null,
    Key(KeyState),
    Pointer(PointerState),
}

impl InputState {
    pub fn for_kind(kind: SourceKind) -> Self {
        match kind {
            SourceKind::None => InputState::Null,
            SourceKind::Key => InputState::Key(KeyState::default()),
            SourceKind::Pointer(subtype) => InputState::Pointer(PointerState::new(subtype)),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            InputState::Null => SourceKind::None,
            InputState::Key(_) => SourceKind::Key,
            InputState::Pointer(state) => SourceKind::Pointer(state.subtype),
        }
    }

    /// Same kind and, for pointers, same subtype
    pub fn is(&self, other: &InputState) -> bool {
        self.kind() == other.kind()
    }

    pub fn as_key(&self) -> Option<&KeyState> {
        match self {
            InputState::Key(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&PointerState> {
        match self {
            InputState::Pointer(state) => Some(state),
            _ => None,
        }
    }
}

/// What a press or release refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressToken {
    Key(String),
    Button(u32),
}

/// Registry of input sources for one session. Entries live until
/// [`InputStateStore::clear`].
#[derive(Debug, Default)]
pub struct InputStateStore {
    states: HashMap<InputSourceId, InputState>,
}

impl InputStateStore {
    pub fn get(&self, id: &InputSourceId) -> Option<&InputState> {
        self.states.get(id)
    }

    pub fn get_mut(&mut self, id: &InputSourceId) -> Option<&mut InputState> {
        self.states.get_mut(id)
    }

    pub fn contains(&self, id: &InputSourceId) -> bool {
        self.states.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Check a candidate against the existing entry without inserting it.
    pub fn check(&self, id: &InputSourceId, candidate: &InputState) -> ActionResult<()> {
        match self.states.get(id) {
            Some(existing) if !existing.is(candidate) => Err(ActionError::invalid(format!(
                "Expected {id} to be mapped to {}, got {}",
                candidate.kind(),
                existing.kind()
            ))),
            _ => Ok(()),
        }
    }

    /// Insert `candidate` if `id` is unknown, otherwise return the existing
    /// state provided it has the same kind.
    pub fn ensure(&mut self, id: &InputSourceId, candidate: InputState) -> ActionResult<&mut InputState> {
        self.check(id, &candidate)?;
        Ok(self.states.entry(id.clone()).or_insert(candidate))
    }

    /// Add a key or button to the pressed set. Returns whether it was newly added.
    pub fn press(&mut self, id: &InputSourceId, token: &PressToken) -> ActionResult<bool> {
        match (self.states.get_mut(id), token) {
            (Some(InputState::Key(state)), PressToken::Key(key)) => {
                Ok(state.pressed.insert(key.clone()))
            }
            (Some(InputState::Pointer(state)), PressToken::Button(button)) => {
                Ok(state.pressed.insert(*button))
            }
            (Some(state), _) => Err(mismatch(id, state, token)),
            (None, _) => Err(unknown(id)),
        }
    }

    /// Remove a key or button from the pressed set. Returns whether it was present.
    pub fn release(&mut self, id: &InputSourceId, token: &PressToken) -> ActionResult<bool> {
        match (self.states.get_mut(id), token) {
            (Some(InputState::Key(state)), PressToken::Key(key)) => Ok(state.pressed.remove(key)),
            (Some(InputState::Pointer(state)), PressToken::Button(button)) => {
                Ok(state.pressed.remove(button))
            }
            (Some(state), _) => Err(mismatch(id, state, token)),
            (None, _) => Err(unknown(id)),
        }
    }

    /// Modifier flags ORed across every key input source
    pub fn global_modifiers(&self) -> Modifiers {
        self.states
            .values()
            .filter_map(InputState::as_key)
            .fold(Modifiers::default(), |acc, state| acc.union(state.modifiers))
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

fn mismatch(id: &InputSourceId, state: &InputState, token: &PressToken) -> ActionError {
    ActionError::invalid(format!(
        "Input source {id} is {}, cannot press {token:?}",
        state.kind()
    ))
}

fn unknown(id: &InputSourceId) -> ActionError {
    ActionError::invalid(format!("Unknown input source {id}"))
}
