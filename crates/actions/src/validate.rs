//! Conversion of the loosely-typed wire format into a typed [`Chain`]
//!
//! Validation never touches the store: input sources seen for the first
//! time are staged in a [`ValidatedChain`] and only committed once every
//! sequence of the chain passed.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;
use wd_actions_core_types::{ElementRef, InputSourceId, ELEMENT_KEY};

use crate::errors::{ActionError, ActionResult};
use crate::model::{Action, ActionKind, Chain, PointerOrigin, Sequence, SourceType, Subtype};
use crate::state::{InputState, InputStateStore, PointerType, SourceKind};

/// A chain that passed validation, plus the input sources it introduces
#[derive(Debug, Clone)]
pub struct ValidatedChain {
    pub chain: Chain,
    pub new_sources: Vec<(InputSourceId, SourceKind)>,
}

impl ValidatedChain {
    /// Register the staged input sources and hand back the chain.
    pub fn commit(self, store: &mut InputStateStore) -> ActionResult<Chain> {
        for (id, kind) in self.new_sources {
            store.ensure(&id, InputState::for_kind(kind))?;
        }
        Ok(self.chain)
    }
}

/// Validate a chain payload: either the array of action sequences or a
/// request body object carrying it under `actions`.
pub fn parse_chain(payload: &Value, store: &InputStateStore) -> ActionResult<ValidatedChain> {
    let sequences = match payload {
        Value::Array(items) => items,
        Value::Object(body) => match body.get("actions") {
            Some(Value::Array(items)) => items,
            other => {
                return Err(ActionError::invalid(format!(
                    "Expected 'actions' to be an array, got {}",
                    describe(other)
                )))
            }
        },
        other => {
            return Err(ActionError::invalid(format!(
                "Expected 'actions' to be an array, got {}",
                describe(Some(other))
            )))
        }
    };

    let mut staged: HashMap<InputSourceId, SourceKind> = HashMap::new();
    let mut new_sources = Vec::new();
    let mut parsed = Vec::with_capacity(sequences.len());
    for raw in sequences {
        let sequence = parse_sequence(raw, store, &mut staged).map_err(|err| {
            warn!(error = %err, "rejected action sequence");
            err
        })?;
        if !store.contains(&sequence.id) && !new_sources.iter().any(|(id, _)| id == &sequence.id) {
            new_sources.push((sequence.id.clone(), sequence.kind));
        }
        parsed.push(sequence);
    }

    Ok(ValidatedChain {
        chain: Chain::from_sequences(parsed),
        new_sources,
    })
}

/// Validate one action sequence against the store and the sources staged
/// earlier in the same chain.
pub fn parse_sequence(
    raw: &Value,
    store: &InputStateStore,
    staged: &mut HashMap<InputSourceId, SourceKind>,
) -> ActionResult<Sequence> {
    let object = raw.as_object().ok_or_else(|| {
        ActionError::invalid(format!(
            "Expected action sequence to be an object, got {}",
            describe(Some(raw))
        ))
    })?;

    let source = match object.get("type") {
        Some(Value::String(raw_type)) => SourceType::parse(raw_type)
            .ok_or_else(|| ActionError::invalid(format!("Unknown action type: {raw_type:?}")))?,
        other => {
            return Err(ActionError::invalid(format!(
                "Expected 'type' to be a string, got {}",
                describe(other)
            )))
        }
    };

    let kind = match source {
        SourceType::None => SourceKind::None,
        SourceType::Key => SourceKind::Key,
        SourceType::Pointer => SourceKind::Pointer(resolve_pointer_type(object)?),
    };

    let id = match object.get("id") {
        Some(Value::String(id)) => InputSourceId::new(id.clone()),
        other => {
            return Err(ActionError::invalid(format!(
                "Expected 'id' to be a string, got {}",
                describe(other)
            )))
        }
    };

    let items = match object.get("actions") {
        Some(Value::Array(items)) => items,
        other => {
            return Err(ActionError::invalid(format!(
                "Expected 'actionSequence.actions' to be an array, got {}",
                describe(other)
            )))
        }
    };

    let candidate = InputState::for_kind(kind);
    store.check(&id, &candidate)?;
    match staged.get(&id).copied() {
        Some(existing) if existing != kind => {
            return Err(ActionError::invalid(format!(
                "Expected {id} to be mapped to {kind}, got {existing}"
            )))
        }
        Some(_) => {}
        None => {
            staged.insert(id.clone(), kind);
        }
    }

    let pointer_type = match kind {
        SourceKind::Pointer(subtype) => Some(subtype),
        _ => None,
    };
    let mut actions = Vec::with_capacity(items.len());
    for item in items {
        let kind = parse_action_kind(source, item)?;
        actions.push(Action {
            id: id.clone(),
            source,
            pointer_type,
            kind,
        });
    }

    Ok(Sequence { id, kind, actions })
}

fn resolve_pointer_type(object: &Map<String, Value>) -> ActionResult<PointerType> {
    let own = optional(object, "pointerType")
        .map(|value| pointer_type_value(value, "pointerType"))
        .transpose()?;

    let from_parameters = match optional(object, "parameters") {
        None => None,
        Some(Value::Object(parameters)) => optional(parameters, "pointerType")
            .map(|value| pointer_type_value(value, "parameters.pointerType"))
            .transpose()?,
        Some(other) => {
            return Err(ActionError::invalid(format!(
                "Expected 'parameters' to be an object, got {}",
                describe(Some(other))
            )))
        }
    };

    match (own, from_parameters) {
        (Some(a), Some(b)) if a != b => Err(ActionError::invalid(format!(
            "Conflicting pointer types {a} and {b}"
        ))),
        (Some(subtype), _) | (None, Some(subtype)) => Ok(subtype),
        (None, None) => Ok(PointerType::Mouse),
    }
}

fn pointer_type_value(value: &Value, field: &str) -> ActionResult<PointerType> {
    match value {
        Value::String(raw) => PointerType::parse(raw),
        other => Err(ActionError::invalid(format!(
            "Expected '{field}' to be a string, got {}",
            describe(Some(other))
        ))),
    }
}

fn parse_action_kind(source: SourceType, item: &Value) -> ActionResult<ActionKind> {
    let object = item.as_object().ok_or_else(|| {
        ActionError::invalid(format!(
            "Expected action item to be an object, got {}",
            describe(Some(item))
        ))
    })?;

    let subtype = match object.get("type") {
        Some(Value::String(raw)) => Subtype::parse(raw)
            .filter(|subtype| subtype.allowed_for(source))
            .ok_or_else(|| {
                ActionError::invalid(format!(
                    "Unknown subtype for {} action: {raw:?}",
                    source.as_str()
                ))
            })?,
        other => {
            return Err(ActionError::invalid(format!(
                "Expected action item 'type' to be a string, got {}",
                describe(other)
            )))
        }
    };

    let kind = match subtype {
        Subtype::Pause => ActionKind::Pause {
            duration: optional_u64(object, "duration")?,
        },
        Subtype::KeyDown => ActionKind::KeyDown {
            value: key_value(object)?,
        },
        Subtype::KeyUp => ActionKind::KeyUp {
            value: key_value(object)?,
        },
        Subtype::PointerDown => ActionKind::PointerDown {
            button: button(object)?,
        },
        Subtype::PointerUp => ActionKind::PointerUp {
            button: button(object)?,
        },
        Subtype::PointerMove => ActionKind::PointerMove {
            duration: optional_u64(object, "duration")?,
            origin: origin(optional(object, "origin"))?,
            x: optional_i64(object, "x")?.unwrap_or(0),
            y: optional_i64(object, "y")?.unwrap_or(0),
        },
        Subtype::PointerCancel => {
            return Err(ActionError::unsupported("pointerCancel is not supported"))
        }
    };
    Ok(kind)
}

fn key_value(object: &Map<String, Value>) -> ActionResult<String> {
    match object.get("value") {
        Some(Value::String(value)) if value.graphemes(true).count() == 1 => Ok(value.clone()),
        other => Err(ActionError::invalid(format!(
            "Expected 'value' to be a string that represents single code point \
             or grapheme cluster, got {}",
            describe(other)
        ))),
    }
}

fn button(object: &Map<String, Value>) -> ActionResult<u32> {
    let raw = object.get("button");
    raw.and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| {
            ActionError::invalid(format!(
                "Expected 'button' ({}) to be >= 0",
                describe(raw)
            ))
        })
}

fn origin(raw: Option<&Value>) -> ActionResult<PointerOrigin> {
    match raw {
        None => Ok(PointerOrigin::Viewport),
        Some(Value::String(name)) => match name.as_str() {
            "viewport" => Ok(PointerOrigin::Viewport),
            "pointer" => Ok(PointerOrigin::Pointer),
            other => Err(ActionError::invalid(format!(
                "Unknown pointer-move origin: {other:?}"
            ))),
        },
        Some(Value::Object(reference)) => match reference.get(ELEMENT_KEY) {
            Some(Value::String(element)) => Ok(PointerOrigin::Element(ElementRef::new(element.clone()))),
            _ => Err(invalid_origin(raw)),
        },
        Some(_) => Err(invalid_origin(raw)),
    }
}

fn invalid_origin(raw: Option<&Value>) -> ActionError {
    ActionError::invalid(format!(
        "Expected 'origin' to be undefined, \"viewport\", \"pointer\", or an element, got {}",
        describe(raw)
    ))
}

/// Field lookup where JSON `null` counts as absent
fn optional<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    object.get(field).filter(|value| !value.is_null())
}

fn optional_u64(object: &Map<String, Value>, field: &str) -> ActionResult<Option<u64>> {
    match optional(object, field) {
        None => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            ActionError::invalid(format!(
                "Expected '{field}' ({}) to be >= 0",
                describe(Some(value))
            ))
        }),
    }
}

fn optional_i64(object: &Map<String, Value>, field: &str) -> ActionResult<Option<i64>> {
    match optional(object, field) {
        None => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            ActionError::invalid(format!(
                "Expected '{field}' ({}) to be an Integer",
                describe(Some(value))
            ))
        }),
    }
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(value) => {
            let rendered = value.to_string();
            if rendered.chars().count() > 64 {
                format!("{}...", rendered.chars().take(64).collect::<String>())
            } else {
                rendered
            }
        }
    }
}
