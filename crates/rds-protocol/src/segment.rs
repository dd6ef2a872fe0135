//! Segment reassembly for multi-group text fields
//!
//! Program Service names, radiotext, program type names and EON names all
//! arrive a few characters at a time, each group carrying a segment address.
//! [`SegmentedText`] keeps the fixed-width buffer and tracks which segments
//! have been written in a validity mask. A field is complete once the
//! validity mask equals its completion pattern.

use std::fmt;

/// Carriage return, ends a radiotext message early
pub const CARRIAGE_RETURN: u8 = 0x0D;

/// Visible marker stored in place of a carriage return
pub const END_MARKER: u8 = b'^';

/// Fixed-width text reassembled from `N / width` segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedText<const N: usize> {
    chars: [u8; N],
    width: usize,
    valid: u16,
    complete: u16,
}

fn full_mask(segments: usize) -> u16 {
    if segments >= 16 {
        0xFFFF
    } else {
        (1u16 << segments) - 1
    }
}

/// Characters accepted into a text buffer
fn is_displayable(ch: u8) -> bool {
    ch == b' ' || ch.is_ascii_graphic()
}

impl<const N: usize> SegmentedText<N> {
    /// Create an empty (space-filled) buffer with `width` characters per segment
    pub fn new(width: usize) -> Self {
        let width = width.clamp(1, N.max(1));
        Self {
            chars: [b' '; N],
            width,
            valid: 0,
            complete: full_mask(N / width),
        }
    }

    /// Blank the buffer and forget all segments, including any truncation
    pub fn reset(&mut self) {
        self.chars = [b' '; N];
        self.valid = 0;
        self.complete = full_mask(self.segments());
    }

    /// Characters per segment
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of addressable segments
    pub fn segments(&self) -> usize {
        (N / self.width).min(16)
    }

    /// Write one segment
    ///
    /// Characters outside printable ASCII leave their slot unchanged.
    /// Returns false if the segment is out of range or lies past a
    /// truncation point, in which case nothing is written.
    pub fn write(&mut self, segment: usize, chars: &[u8]) -> bool {
        if segment >= self.segments() {
            return false;
        }
        let bit = 1u16 << segment;
        if self.complete & bit == 0 {
            return false;
        }

        let offset = segment * self.width;
        for (slot, &ch) in self.chars[offset..offset + self.width]
            .iter_mut()
            .zip(chars)
        {
            if is_displayable(ch) {
                *slot = ch;
            }
        }
        self.valid |= bit;
        true
    }

    /// Shrink the completion pattern so the text ends with `segment`
    ///
    /// The pattern only ever narrows; bits already set beyond the new end
    /// are dropped from the validity mask.
    pub fn truncate_at(&mut self, segment: usize) {
        let segment = segment.min(15);
        self.complete &= 0xFFFF >> (15 - segment);
        self.valid &= self.complete;
    }

    /// Mask of segments written since the last reset
    pub fn valid_mask(&self) -> u16 {
        self.valid
    }

    /// Mask that `valid_mask` must equal for the text to be complete
    pub fn completion_mask(&self) -> u16 {
        self.complete
    }

    /// All expected segments have arrived
    pub fn is_complete(&self) -> bool {
        self.valid == self.complete
    }

    /// Number of characters covered by the completion pattern
    pub fn effective_len(&self) -> usize {
        let segments = 16 - self.complete.leading_zeros() as usize;
        (segments * self.width).min(N)
    }

    /// Raw buffer
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.chars
    }

    /// Text up to the effective length (the whole buffer unless truncated)
    pub fn text(&self) -> String {
        self.chars[..self.effective_len()]
            .iter()
            .map(|&b| char::from(b))
            .collect()
    }

    /// The whole fixed-width buffer
    pub fn full_text(&self) -> String {
        self.chars.iter().map(|&b| char::from(b)).collect()
    }
}

impl<const N: usize> fmt::Display for SegmentedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[cfg(feature = "serde")]
impl<const N: usize> serde::Serialize for SegmentedText<N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("SegmentedText", 3)?;
        state.serialize_field("text", &self.text())?;
        state.serialize_field("valid", &self.valid)?;
        state.serialize_field("complete", &self.complete)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_blank() {
        let text = SegmentedText::<8>::new(2);
        assert_eq!(text.text(), "        ");
        assert_eq!(text.segments(), 4);
        assert_eq!(text.valid_mask(), 0);
        assert_eq!(text.completion_mask(), 0x0F);
        assert!(!text.is_complete());
    }

    #[test]
    fn test_out_of_order_segments() {
        let mut text = SegmentedText::<8>::new(2);
        assert!(text.write(3, b"  "));
        assert!(text.write(1, b"C "));
        assert_eq!(text.text(), "  C     ");
        assert_eq!(text.valid_mask(), 0b1010);

        text.write(0, b"BB");
        text.write(2, b"R1");
        assert_eq!(text.text(), "BBC R1  ");
        assert!(text.is_complete());
    }

    #[test]
    fn test_unprintable_characters_keep_slot() {
        let mut text = SegmentedText::<8>::new(4);
        text.write(0, b"ABCD");
        text.write(0, &[b'X', 0x07, b'Y', 0xFF]);
        assert_eq!(&text.text()[..4], "XBYD");
    }

    #[test]
    fn test_segment_out_of_range() {
        let mut text = SegmentedText::<8>::new(4);
        assert!(!text.write(2, b"ABCD"));
        assert_eq!(text.valid_mask(), 0);
    }

    #[test]
    fn test_truncate_narrows_and_blocks_later_segments() {
        let mut text = SegmentedText::<64>::new(4);
        text.write(5, b"LATE");
        text.write(0, b"HELL");
        text.truncate_at(1);

        assert_eq!(text.completion_mask(), 0x0003);
        assert_eq!(text.valid_mask(), 0x0001);
        assert!(!text.write(5, b"MORE"));
        assert_eq!(text.valid_mask(), 0x0001);

        text.write(1, b"O   ");
        assert!(text.is_complete());
        assert_eq!(text.text(), "HELLO   ");
    }

    #[test]
    fn test_reset_restores_full_pattern() {
        let mut text = SegmentedText::<64>::new(4);
        text.write(0, b"ABCD");
        text.truncate_at(0);
        text.reset();
        assert_eq!(text.completion_mask(), 0xFFFF);
        assert_eq!(text.valid_mask(), 0);
        assert_eq!(text.full_text(), " ".repeat(64));
    }
}
