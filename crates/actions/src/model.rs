//! Typed action chain: actions, per-source sequences and tick-grouped chains

use std::fmt;

use wd_actions_core_types::{ElementRef, InputSourceId};

use crate::state::{PointerType, SourceKind};

/// Action subtype names as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtype {
    Pause,
    KeyDown,
    KeyUp,
    PointerDown,
    PointerUp,
    PointerMove,
    PointerCancel,
}

impl Subtype {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pause" => Some(Subtype::Pause),
            "keyDown" => Some(Subtype::KeyDown),
            "keyUp" => Some(Subtype::KeyUp),
            "pointerDown" => Some(Subtype::PointerDown),
            "pointerUp" => Some(Subtype::PointerUp),
            "pointerMove" => Some(Subtype::PointerMove),
            "pointerCancel" => Some(Subtype::PointerCancel),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Subtype::Pause => "pause",
            Subtype::KeyDown => "keyDown",
            Subtype::KeyUp => "keyUp",
            Subtype::PointerDown => "pointerDown",
            Subtype::PointerUp => "pointerUp",
            Subtype::PointerMove => "pointerMove",
            Subtype::PointerCancel => "pointerCancel",
        }
    }

    /// Subtypes a source of the given type may carry
    pub fn allowed_for(self, source: SourceType) -> bool {
        match source {
            SourceType::None => self == Subtype::Pause,
            SourceType::Key => matches!(self, Subtype::Pause | Subtype::KeyDown | Subtype::KeyUp),
            SourceType::Pointer => !matches!(self, Subtype::KeyDown | Subtype::KeyUp),
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared `type` of an action sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    None,
    Key,
    Pointer,
}

impl SourceType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "none" => Some(SourceType::None),
            "key" => Some(SourceType::Key),
            "pointer" => Some(SourceType::Pointer),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::None => "none",
            SourceType::Key => "key",
            SourceType::Pointer => "pointer",
        }
    }
}

/// Reference frame for pointerMove offsets
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PointerOrigin {
    #[default]
    Viewport,
    Pointer,
    Element(ElementRef),
}

/// Subtype plus the fields that apply to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Pause {
        duration: Option<u64>,
    },
    KeyDown {
        value: String,
    },
    KeyUp {
        value: String,
    },
    PointerDown {
        button: u32,
    },
    PointerUp {
        button: u32,
    },
    PointerMove {
        duration: Option<u64>,
        origin: PointerOrigin,
        x: i64,
        y: i64,
    },
    PointerCancel,
}

/// One step of one input source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: InputSourceId,
    pub source: SourceType,
    /// Set for pointer sources only
    pub pointer_type: Option<PointerType>,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(id: InputSourceId, source: SourceType, kind: ActionKind) -> Self {
        Self {
            id,
            source,
            pointer_type: None,
            kind,
        }
    }

    pub fn with_pointer_type(mut self, pointer_type: PointerType) -> Self {
        self.pointer_type = Some(pointer_type);
        self
    }

    pub fn subtype(&self) -> Subtype {
        match self.kind {
            ActionKind::Pause { .. } => Subtype::Pause,
            ActionKind::KeyDown { .. } => Subtype::KeyDown,
            ActionKind::KeyUp { .. } => Subtype::KeyUp,
            ActionKind::PointerDown { .. } => Subtype::PointerDown,
            ActionKind::PointerUp { .. } => Subtype::PointerUp,
            ActionKind::PointerMove { .. } => Subtype::PointerMove,
            ActionKind::PointerCancel => Subtype::PointerCancel,
        }
    }

    /// Explicit duration of a pause or pointerMove, if any
    pub fn duration(&self) -> Option<u64> {
        match self.kind {
            ActionKind::Pause { duration } => duration,
            ActionKind::PointerMove { duration, .. } if self.source == SourceType::Pointer => {
                duration
            }
            _ => None,
        }
    }

    /// Action that undoes a press: keyDown becomes keyUp, pointerDown becomes pointerUp
    pub fn inverse(&self) -> Option<Action> {
        let kind = match &self.kind {
            ActionKind::KeyDown { value } => ActionKind::KeyUp {
                value: value.clone(),
            },
            ActionKind::PointerDown { button } => ActionKind::PointerUp { button: *button },
            _ => return None,
        };
        Some(Action {
            kind,
            ..self.clone()
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {}]", self.source.as_str(), self.subtype(), self.id)
    }
}

/// Validated actions of one input source, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub id: InputSourceId,
    pub kind: SourceKind,
    pub actions: Vec<Action>,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Actions grouped by tick. Tick `i` holds the `i`-th action of every
/// sequence long enough to have one, in sequence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
    pub ticks: Vec<Vec<Action>>,
}

impl Chain {
    pub fn from_sequences(sequences: impl IntoIterator<Item = Sequence>) -> Self {
        let mut ticks: Vec<Vec<Action>> = Vec::new();
        for sequence in sequences {
            for (index, action) in sequence.actions.into_iter().enumerate() {
                if ticks.len() < index + 1 {
                    ticks.push(Vec::new());
                }
                ticks[index].push(action);
            }
        }
        Self { ticks }
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<Action>> {
        self.ticks.iter()
    }
}
