//! ANSI escape sequence scanning.
//!
//! The width walk and the test helpers need to know how long an escape
//! sequence is so they can skip it. Only the sequence classes this renderer
//! emits or passes through are recognized: CSI (styling) and OSC (hyperlinks,
//! terminated by BEL or ST).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiSequenceKind {
    Csi,
    Osc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsiSequence {
    pub length: usize,
    pub kind: AnsiSequenceKind,
}

/// Returns the escape sequence starting at byte offset `pos`, if one starts
/// there. `pos` must be a char boundary.
pub fn ansi_sequence_at(input: &str, pos: usize) -> Option<AnsiSequence> {
    let bytes = input.as_bytes();
    if pos >= bytes.len() || bytes[pos] != 0x1b || pos + 1 >= bytes.len() {
        return None;
    }

    match bytes[pos + 1] {
        b'[' => csi_at(bytes, pos),
        b']' => osc_at(bytes, pos),
        _ => None,
    }
}

fn csi_at(bytes: &[u8], pos: usize) -> Option<AnsiSequence> {
    let mut idx = pos + 2;
    while idx < bytes.len() {
        // Final byte of a CSI sequence is in 0x40..=0x7e.
        if (0x40..=0x7e).contains(&bytes[idx]) {
            return Some(AnsiSequence {
                length: idx + 1 - pos,
                kind: AnsiSequenceKind::Csi,
            });
        }
        idx += 1;
    }
    None
}

fn osc_at(bytes: &[u8], pos: usize) -> Option<AnsiSequence> {
    let mut idx = pos + 2;
    while idx < bytes.len() {
        if bytes[idx] == 0x07 {
            return Some(AnsiSequence {
                length: idx + 1 - pos,
                kind: AnsiSequenceKind::Osc,
            });
        }
        if bytes[idx] == 0x1b && idx + 1 < bytes.len() && bytes[idx + 1] == b'\\' {
            return Some(AnsiSequence {
                length: idx + 2 - pos,
                kind: AnsiSequenceKind::Osc,
            });
        }
        idx += 1;
    }
    None
}

/// Removes all recognized escape sequences, leaving visible text.
pub fn strip_ansi(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(sequence) = ansi_sequence_at(input, idx) {
            idx += sequence.length;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        clean.push(ch);
        idx += ch.len_utf8();
    }
    clean
}
