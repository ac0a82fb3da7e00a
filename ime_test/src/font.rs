// SPDX-License-Identifier: GPL-3.0-or-later

use windows::Win32::Graphics::Gdi::{
    CLEARTYPE_QUALITY, CreateFontIndirectW, DEFAULT_CHARSET, DeleteObject, FW_NORMAL, HFONT,
    LOGFONTW,
};

/// A GDI font owned by the main window.
pub(crate) struct Font(HFONT);

impl Font {
    pub(crate) fn new(face: &str, size: i32) -> Option<Font> {
        let mut lf = LOGFONTW {
            lfHeight: -size,
            lfWeight: FW_NORMAL.0 as i32,
            lfCharSet: DEFAULT_CHARSET,
            lfQuality: CLEARTYPE_QUALITY,
            ..Default::default()
        };
        // Leave room for the terminating nul.
        let max_len = lf.lfFaceName.len() - 1;
        for (dst, src) in lf.lfFaceName.iter_mut().zip(face.encode_utf16().take(max_len)) {
            *dst = src;
        }
        let font = unsafe { CreateFontIndirectW(&lf) };
        if font.is_invalid() {
            log::warn!("unable to create font {face:?} at size {size}");
            None
        } else {
            Some(Font(font))
        }
    }

    pub(crate) fn handle(&self) -> HFONT {
        self.0
    }
}

impl Drop for Font {
    fn drop(&mut self) {
        unsafe {
            let _ = DeleteObject(self.0.into());
        }
    }
}
