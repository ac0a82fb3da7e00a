// SPDX-License-Identifier: GPL-3.0-or-later

use std::char::REPLACEMENT_CHARACTER;

/// Text input reported by the window, in the order it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ImeEvent {
    CharacterInput(char),
    CompositionPreviewChanged(String),
    CompositionCommitted(String),
}

/// Joins the UTF-16 code units of consecutive `WM_CHAR` messages.
///
/// Characters outside the BMP arrive as two messages, one per surrogate.
#[derive(Debug, Default)]
pub(crate) struct Utf16Decoder {
    high_surrogate: Option<u16>,
}

impl Utf16Decoder {
    pub(crate) fn new() -> Utf16Decoder {
        Utf16Decoder::default()
    }

    pub(crate) fn push(&mut self, unit: u16) -> impl Iterator<Item = char> + use<> {
        let (orphan, decoded) = match (self.high_surrogate.take(), unit) {
            (Some(high), 0xDC00..=0xDFFF) => (None, Some(combine(high, unit))),
            (pending, 0xD800..=0xDBFF) => {
                self.high_surrogate = Some(unit);
                (pending.map(|_| REPLACEMENT_CHARACTER), None)
            }
            (pending, _) => (
                pending.map(|_| REPLACEMENT_CHARACTER),
                Some(char::from_u32(unit as u32).unwrap_or(REPLACEMENT_CHARACTER)),
            ),
        };
        orphan.into_iter().chain(decoded)
    }
}

fn combine(high: u16, low: u16) -> char {
    let code = 0x10000 + (((high as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00);
    char::from_u32(code).unwrap_or(REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use std::char::REPLACEMENT_CHARACTER;

    use super::Utf16Decoder;

    fn decode(units: &[u16]) -> String {
        let mut decoder = Utf16Decoder::new();
        units.iter().flat_map(|&unit| decoder.push(unit)).collect()
    }

    #[test]
    fn bmp_characters_pass_through() {
        assert_eq!("Hiあ", decode(&[0x48, 0x69, 0x3042]));
        assert_eq!("\u{8}", decode(&[0x08]));
    }

    #[test]
    fn surrogate_pair_is_joined() {
        let mut decoder = Utf16Decoder::new();
        assert_eq!(None, decoder.push(0xD840).next());
        assert_eq!(vec!['𠀋'], decoder.push(0xDC0B).collect::<Vec<_>>());
        assert_eq!(vec!['x'], decoder.push(0x78).collect::<Vec<_>>());
    }

    #[test]
    fn lone_low_surrogate_is_replaced() {
        assert_eq!(format!("a{REPLACEMENT_CHARACTER}b"), decode(&[0x61, 0xDC00, 0x62]));
    }

    #[test]
    fn orphaned_high_surrogate_is_replaced() {
        assert_eq!(format!("{REPLACEMENT_CHARACTER}a"), decode(&[0xD800, 0x61]));
        assert_eq!(
            format!("{REPLACEMENT_CHARACTER}😀"),
            decode(&[0xD800, 0xD83D, 0xDE00])
        );
    }
}
