// SPDX-License-Identifier: GPL-3.0-or-later

//! Contents of the status bar parts.

/// Right edges of the status bar parts. The last part extends to the border.
pub(crate) const PART_EDGES: [i32; 4] = [150, 300, 450, -1];

pub(crate) const UNKNOWN_MODE: &str = "?";

pub(crate) fn open_indicator(open: bool) -> &'static str {
    if open { "あ" } else { "A" }
}

/// Formats a conversion or sentence mode bit set.
///
/// Zero is printed without a prefix.
pub(crate) fn format_mode(value: u32) -> String {
    if value == 0 {
        "0".to_owned()
    } else {
        format!("{value:#x}")
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ImeStatus {
    pub(crate) open: bool,
    pub(crate) conversion: Option<u32>,
    pub(crate) sentence: Option<u32>,
}

impl ImeStatus {
    /// Open indicator, conversion mode and sentence mode, in part order.
    pub(crate) fn parts(&self) -> [String; 3] {
        let mode = |value: Option<u32>| value.map_or_else(|| UNKNOWN_MODE.to_owned(), format_mode);
        [
            open_indicator(self.open).to_owned(),
            mode(self.conversion),
            mode(self.sentence),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{ImeStatus, format_mode, open_indicator};

    #[test]
    fn open_status_indicator() {
        assert_eq!("あ", open_indicator(true));
        assert_eq!("A", open_indicator(false));
    }

    #[test]
    fn mode_formatting() {
        assert_eq!("0", format_mode(0));
        assert_eq!("0x9", format_mode(0x9));
        assert_eq!("0x1b", format_mode(0x1b));
        assert_eq!("0x80000000", format_mode(0x8000_0000));
    }

    #[test]
    fn initial_parts() {
        assert_eq!(["A", "?", "?"], ImeStatus::default().parts());
    }

    #[test]
    fn open_before_mode_is_known() {
        let status = ImeStatus {
            open: true,
            ..ImeStatus::default()
        };
        assert_eq!(["あ", "?", "?"], status.parts());
    }

    #[test]
    fn parts_after_notifications() {
        let status = ImeStatus {
            open: true,
            conversion: Some(0x19),
            sentence: Some(0),
        };
        assert_eq!(["あ", "0x19", "0"], status.parts());
    }
}
