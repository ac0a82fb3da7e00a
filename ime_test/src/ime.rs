// SPDX-License-Identifier: GPL-3.0-or-later

//! IMM32 input context access.

use log::warn;
use windows::Win32::Foundation::{HWND, LPARAM, POINT, RECT};
use windows::Win32::UI::Input::Ime::*;

use crate::composition::BufferError;
use crate::input::ImeEvent;

/// Which string a `WM_IME_COMPOSITION` message announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompositionChange {
    Result,
    Preview,
}

impl CompositionChange {
    /// A result string takes precedence when both flags are set.
    pub(crate) fn from_lparam(lparam: LPARAM) -> Option<CompositionChange> {
        let flags = lparam.0 as u32;
        if flags & GCS_RESULTSTR.0 != 0 {
            Some(CompositionChange::Result)
        } else if flags & GCS_COMPSTR.0 != 0 {
            Some(CompositionChange::Preview)
        } else {
            None
        }
    }

    fn string_kind(self) -> IME_COMPOSITION_STRING {
        match self {
            CompositionChange::Result => GCS_RESULTSTR,
            CompositionChange::Preview => GCS_COMPSTR,
        }
    }

    pub(crate) fn into_event(self, text: String) -> ImeEvent {
        match self {
            CompositionChange::Result => ImeEvent::CompositionCommitted(text),
            CompositionChange::Preview => ImeEvent::CompositionPreviewChanged(text),
        }
    }
}

/// The input context currently associated with a window.
pub(crate) struct ImeContext {
    hwnd: HWND,
    himc: HIMC,
}

impl ImeContext {
    pub(crate) fn get(hwnd: HWND) -> Option<ImeContext> {
        let himc = unsafe { ImmGetContext(hwnd) };
        if himc.is_invalid() {
            None
        } else {
            Some(ImeContext { hwnd, himc })
        }
    }

    pub(crate) fn composition_string(
        &self,
        change: CompositionChange,
    ) -> Result<String, BufferError> {
        let kind = change.string_kind();
        let len = unsafe { ImmGetCompositionStringW(self.himc, kind, None, 0) };
        if len < 0 {
            warn!("unable to query {change:?} string: {len}");
        }
        if len <= 0 {
            return Ok(String::new());
        }
        let requested = len as usize;
        let mut buf: Vec<u16> = Vec::new();
        buf.try_reserve_exact(requested / size_of::<u16>())
            .map_err(|source| BufferError::Allocation { requested, source })?;
        buf.resize(requested / size_of::<u16>(), 0);
        let copied = unsafe {
            ImmGetCompositionStringW(self.himc, kind, Some(buf.as_mut_ptr().cast()), len as u32)
        };
        buf.truncate(copied.max(0) as usize / size_of::<u16>());
        Ok(String::from_utf16_lossy(&buf))
    }

    pub(crate) fn open_status(&self) -> bool {
        unsafe { ImmGetOpenStatus(self.himc) }.as_bool()
    }

    /// Conversion and sentence mode bits.
    pub(crate) fn conversion_status(&self) -> Option<(u32, u32)> {
        let mut conversion = IME_CONVERSION_MODE::default();
        let mut sentence = IME_SENTENCE_MODE::default();
        let ok = unsafe {
            ImmGetConversionStatus(
                self.himc,
                Some(&mut conversion as *mut _),
                Some(&mut sentence as *mut _),
            )
        };
        ok.as_bool().then_some((conversion.0, sentence.0))
    }

    pub(crate) fn set_candidate_pos(&self, x: i32, y: i32) -> bool {
        let form = CANDIDATEFORM {
            dwIndex: 0,
            dwStyle: CFS_CANDIDATEPOS,
            ptCurrentPos: POINT { x, y },
            rcArea: RECT::default(),
        };
        unsafe { ImmSetCandidateWindow(self.himc, &form) }.as_bool()
    }
}

impl Drop for ImeContext {
    fn drop(&mut self) {
        unsafe {
            let _ = ImmReleaseContext(self.hwnd, self.himc);
        }
    }
}

/// An input context created for, and owned by, a single window.
///
/// Dropping it restores whatever context the window had before.
pub(crate) struct OwnedImeContext {
    hwnd: HWND,
    himc: HIMC,
    previous: HIMC,
}

impl OwnedImeContext {
    pub(crate) fn associate(hwnd: HWND) -> Option<OwnedImeContext> {
        let himc = unsafe { ImmCreateContext() };
        if himc.is_invalid() {
            return None;
        }
        let previous = unsafe { ImmAssociateContext(hwnd, himc) };
        if !unsafe { ImmSetOpenStatus(himc, true) }.as_bool() {
            warn!("unable to open the input context");
        }
        Some(OwnedImeContext {
            hwnd,
            himc,
            previous,
        })
    }
}

impl Drop for OwnedImeContext {
    fn drop(&mut self) {
        unsafe {
            ImmAssociateContext(self.hwnd, self.previous);
            let _ = ImmDestroyContext(self.himc);
        }
    }
}
