//! Display frame encoding.
//!
//! One frame per bitmap: `<<START>>` + decimal display index + `|` + raw
//! payload bytes + `<<END>>.....`. There is no length field; the receiving
//! firmware scans for the end marker. A payload that happens to contain the
//! end-marker byte sequence will truncate the frame on the receiver — a
//! known limitation of the deployed firmware format, kept for
//! compatibility.

/// Marks the beginning of a frame.
pub const START_MARKER: &[u8] = b"<<START>>";

/// Marks the end of a frame.
pub const END_MARKER: &[u8] = b"<<END>>.....";

/// Build a complete protocol frame for one display.
pub fn encode_frame(display_index: u8, payload: &[u8]) -> Vec<u8> {
    let index = display_index.to_string();
    let mut frame =
        Vec::with_capacity(START_MARKER.len() + index.len() + 1 + payload.len() + END_MARKER.len());
    frame.extend_from_slice(START_MARKER);
    frame.extend_from_slice(index.as_bytes());
    frame.push(b'|');
    frame.extend_from_slice(payload);
    frame.extend_from_slice(END_MARKER);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_structure_is_byte_exact() {
        let frame = encode_frame(3, &[0xAB, 0xCD]);

        let mut expected = b"<<START>>3|".to_vec();
        expected.extend_from_slice(&[0xAB, 0xCD]);
        expected.extend_from_slice(b"<<END>>.....");
        assert_eq!(frame, expected);
    }

    #[test]
    fn test_multi_digit_index() {
        let frame = encode_frame(12, &[0x01]);
        assert!(frame.starts_with(b"<<START>>12|"));
        assert!(frame.ends_with(END_MARKER));
    }

    #[test]
    fn test_empty_payload() {
        let frame = encode_frame(0, &[]);
        assert_eq!(frame, b"<<START>>0|<<END>>.....");
    }

    #[test]
    fn test_binary_payload_is_not_escaped() {
        // Raw bytes pass through untouched, marker-like or not.
        let payload = b"<<END>>.....";
        let frame = encode_frame(1, payload);
        assert_eq!(frame.len(), START_MARKER.len() + 2 + payload.len() + END_MARKER.len());
    }
}
