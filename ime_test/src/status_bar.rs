// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Context, Result};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, WPARAM};
use windows::Win32::UI::Controls::{
    ICC_BAR_CLASSES, INITCOMMONCONTROLSEX, InitCommonControlsEx, SB_SETPARTS, SB_SETTEXTW,
    STATUSCLASSNAMEW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, SendMessageW, WINDOW_EX_STYLE, WM_SIZE, WS_CHILD, WS_VISIBLE,
};
use windows_core::HSTRING;

use crate::status::{ImeStatus, PART_EDGES};

/// Common-controls status bar docked at the bottom of the main window.
pub(crate) struct StatusBar {
    hwnd: HWND,
}

impl StatusBar {
    pub(crate) fn create(parent: HWND, hinstance: HINSTANCE) -> Result<StatusBar> {
        let icc = INITCOMMONCONTROLSEX {
            dwSize: size_of::<INITCOMMONCONTROLSEX>() as u32,
            dwICC: ICC_BAR_CLASSES,
        };
        if !unsafe { InitCommonControlsEx(&icc) }.as_bool() {
            log::warn!("unable to initialize the status bar class");
        }
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                STATUSCLASSNAMEW,
                None,
                WS_VISIBLE | WS_CHILD,
                0,
                0,
                0,
                0,
                Some(parent),
                None,
                Some(hinstance),
                None,
            )
        }
        .context("unable to create the status bar")?;

        let edges = PART_EDGES;
        unsafe {
            SendMessageW(
                hwnd,
                SB_SETPARTS,
                Some(WPARAM(edges.len())),
                Some(LPARAM(edges.as_ptr() as isize)),
            );
        }
        Ok(StatusBar { hwnd })
    }

    pub(crate) fn show(&self, status: &ImeStatus) {
        for (part, text) in status.parts().iter().enumerate() {
            self.set_text(part, text);
        }
    }

    fn set_text(&self, part: usize, text: &str) {
        let text = HSTRING::from(text);
        unsafe {
            SendMessageW(
                self.hwnd,
                SB_SETTEXTW,
                Some(WPARAM(part)),
                Some(LPARAM(text.as_ptr() as isize)),
            );
        }
    }

    /// The control anchors itself to the bottom of its parent on `WM_SIZE`.
    pub(crate) fn on_parent_resized(&self) {
        unsafe {
            SendMessageW(self.hwnd, WM_SIZE, None, None);
        }
    }
}
