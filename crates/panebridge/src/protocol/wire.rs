//! Line codec: one self-describing JSON object per line, UTF-8.

use serde::Serialize;

use super::InboundEnvelope;

#[derive(Serialize)]
struct OutboundEnvelope<'a, T: Serialize> {
    command: &'a str,
    content: &'a T,
}

/// Encodes one outbound frame, newline included.
///
/// Panics on serialization failure: every content type in this crate is
/// serializable by construction, so a failure here means corrupted internal
/// state, not a runtime condition.
pub fn encode_frame<T: Serialize>(command: &str, content: &T) -> Vec<u8> {
    let mut line = serde_json::to_vec(&OutboundEnvelope { command, content })
        .unwrap_or_else(|err| panic!("outbound {command:?} frame failed to serialize: {err}"));
    line.push(b'\n');
    line
}

/// Parses one inbound line. `None` for blank or unparsable lines; the reader
/// discards those and keeps going.
pub fn parse_line(line: &str) -> Option<InboundEnvelope> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SurfaceId;
    use crate::protocol::{InputEvent, MenuItem};

    #[test]
    fn encode_produces_one_terminated_line() {
        let frame = encode_frame(
            "register",
            &MenuItem {
                label: "Open".into(),
                accelerator: "CmdOrCtrl+O".into(),
            },
        );
        let text = std::str::from_utf8(&frame).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.matches('\n').count(), 1);
        assert_eq!(
            text.trim_end(),
            r#"{"command":"register","content":{"label":"Open","accelerator":"CmdOrCtrl+O"}}"#
        );
    }

    #[test]
    fn unit_content_encodes_as_null() {
        let frame = encode_frame("buildmenu", &());
        assert_eq!(
            std::str::from_utf8(&frame).unwrap().trim_end(),
            r#"{"command":"buildmenu","content":null}"#
        );
    }

    #[test]
    fn blank_and_garbage_lines_parse_to_none() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   \t").is_none());
        assert!(parse_line("not json").is_none());
        assert!(parse_line(r#"{"no_type_field": 1}"#).is_none());
    }

    #[test]
    fn key_frames_classify_by_down_flag() {
        let down = parse_line(r#"{"type":"key","content":{"down":true,"key":"A","uid":3}}"#)
            .and_then(InputEvent::classify);
        assert_eq!(
            down,
            Some(InputEvent::KeyDown {
                surface: SurfaceId(3),
                key: "A".into()
            })
        );
        let up = parse_line(r#"{"type":"key","content":{"down":false,"key":"A"}}"#)
            .and_then(InputEvent::classify);
        assert_eq!(
            up,
            Some(InputEvent::KeyUp {
                surface: SurfaceId::UNSCOPED,
                key: "A".into()
            })
        );
    }

    #[test]
    fn mouse_up_is_dropped_mouse_down_is_kept() {
        let up = parse_line(r#"{"type":"mouse","content":{"down":false,"x":1,"y":2,"uid":7}}"#)
            .and_then(InputEvent::classify);
        assert_eq!(up, None);
        let down =
            parse_line(r#"{"type":"mouse","content":{"down":true,"x":1,"y":2,"button":2,"uid":7}}"#)
                .and_then(InputEvent::classify);
        assert_eq!(
            down,
            Some(InputEvent::PointerDown {
                surface: SurfaceId(7),
                x: 1,
                y: 2,
                button: 2
            })
        );
    }

    #[test]
    fn contentless_quit_parses() {
        let quit = parse_line(r#"{"type":"quit"}"#).and_then(InputEvent::classify);
        assert_eq!(quit, Some(InputEvent::Quit));
    }

    #[test]
    fn unknown_kinds_classify_to_none() {
        let event = parse_line(r#"{"type":"resize","content":{"x":80,"y":24}}"#)
            .and_then(InputEvent::classify);
        assert_eq!(event, None);
    }

    #[test]
    fn forced_failure_classifies() {
        let event = parse_line(r#"{"type":"panic"}"#).and_then(InputEvent::classify);
        assert_eq!(event, Some(InputEvent::ForcedFailure));
    }
}
