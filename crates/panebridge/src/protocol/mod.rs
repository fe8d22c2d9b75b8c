//! Wire-level message shapes.
//!
//! Outbound frames are `{"command": K, "content": C}`; inbound frames are
//! `{"type": K, "content": {...}}`. Both are one JSON object per line. The
//! inbound content struct is shared by every kind — unused fields just take
//! their defaults, matching what the front end actually sends.

pub mod wire;

use serde::{Deserialize, Serialize};

use crate::ids::SurfaceId;

/// A cell coordinate, also used for the grid highlight where `(-1, -1)`
/// means "no highlight".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const UNSET: Point = Point { x: -1, y: -1 };
}

/// `new` frame content announcing a grid surface. Everything past the
/// dimensions is opaque display configuration for the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridOpen {
    pub name: String,
    pub page: String,
    pub uid: SurfaceId,
    pub width: u32,
    pub height: u32,
    pub boxwidth: u32,
    pub boxheight: u32,
    pub fontpercent: u32,
    pub starthidden: bool,
    pub resizable: bool,
}

/// `update` frame content carrying a grid surface's full state. The three
/// cell arrays are parallel strings, one char per cell, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridUpdate {
    pub uid: SurfaceId,
    pub width: u32,
    pub height: u32,
    pub chars: String,
    pub colours: String,
    pub backgrounds: String,
    pub highlight: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ackmessage: Option<String>,
}

/// `new` frame content announcing a text surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextOpen {
    pub name: String,
    pub page: String,
    pub uid: SurfaceId,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

/// `update` frame content appending to a text surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextUpdate {
    pub uid: SurfaceId,
    pub msg: String,
}

/// `register` frame content for one menu entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,
    pub accelerator: String,
}

/// `effect` frame content. Which fields an effect uses is up to the front
/// end's animation code; the core never inspects them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Effect {
    pub function: String,
    pub uid: SurfaceId,
    pub x: i32,
    pub y: i32,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub duration: f64,
    pub colour: String,
}

/// Shared content struct for every inbound kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InboundContent {
    pub uid: Option<u64>,
    pub x: i32,
    pub y: i32,
    pub button: u8,
    pub down: bool,
    pub key: String,
    pub cmd: String,
    pub ackmessage: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: InboundContent,
}

/// One classified inbound event. Produced only by the stream reader; each
/// variant is consumed by exactly one hub (or the ack registry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown { surface: SurfaceId, key: String },
    KeyUp { surface: SurfaceId, key: String },
    PointerDown { surface: SurfaceId, x: i32, y: i32, button: u8 },
    PointerMove { surface: SurfaceId, x: i32, y: i32 },
    Command(String),
    Quit,
    Ack(String),
    /// The front end's deliberate-failure signal, used to test abnormal
    /// shutdown. The one inbound message allowed to take the process down.
    ForcedFailure,
}

impl InputEvent {
    /// Classifies a parsed envelope. `None` for kinds the core ignores,
    /// including pointer-up frames (same shape as `mouse`, intentionally
    /// dropped) and anything unrecognized.
    pub fn classify(envelope: InboundEnvelope) -> Option<InputEvent> {
        let InboundEnvelope { kind, content } = envelope;
        let surface = content.uid.map(SurfaceId).unwrap_or(SurfaceId::UNSCOPED);
        match kind.as_str() {
            "key" => Some(if content.down {
                InputEvent::KeyDown {
                    surface,
                    key: content.key,
                }
            } else {
                InputEvent::KeyUp {
                    surface,
                    key: content.key,
                }
            }),
            "mouse" => content.down.then(|| InputEvent::PointerDown {
                surface,
                x: content.x,
                y: content.y,
                button: content.button,
            }),
            "mouseover" => Some(InputEvent::PointerMove {
                surface,
                x: content.x,
                y: content.y,
            }),
            "cmd" => Some(InputEvent::Command(content.cmd)),
            "quit" => Some(InputEvent::Quit),
            "ack" => Some(InputEvent::Ack(content.ackmessage)),
            "panic" => Some(InputEvent::ForcedFailure),
            _ => None,
        }
    }
}
