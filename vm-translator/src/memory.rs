//! Hack RAM layout for the VM segments.

use crate::parser::Segment;

/// `temp i` lives at RAM[5 + i].
pub const TEMP_BASE: u16 = 5;

/// `pointer 0`/`pointer 1` live at RAM[3]/RAM[4] (THIS and THAT).
pub const POINTER_BASE: u16 = 3;

/// Push offsets 1..=3 are cheaper as inline `A=A+1` chains than as address
/// arithmetic through D.
pub const PUSH_INLINE_LIMIT: u16 = 4;

/// Pop offsets 1..=7 stay inline; beyond that the target address goes
/// through R13.
pub const POP_INLINE_LIMIT: u16 = 8;

/// The register symbol holding the base of an indirect segment.
pub fn base_symbol(segment: Segment) -> Option<&'static str> {
    match segment {
        Segment::Local => Some("LCL"),
        Segment::Argument => Some("ARG"),
        Segment::This => Some("THIS"),
        Segment::That => Some("THAT"),
        _ => None,
    }
}

/// The fixed RAM address of a `temp`/`pointer` slot.
pub fn direct_address(segment: Segment, index: u16) -> Option<u16> {
    match segment {
        Segment::Temp => Some(TEMP_BASE + index),
        Segment::Pointer => Some(POINTER_BASE + index),
        _ => None,
    }
}
