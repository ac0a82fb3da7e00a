// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    ffi::c_void,
    rc::{Rc, Weak},
};

use anyhow::{Result, bail};
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::*;
use windows::Win32::UI::WindowsAndMessaging::*;
use windows_core::*;

thread_local! {
    static HWND_MAP: RefCell<HashMap<*mut c_void, Weak<dyn WndProc>>> = RefCell::new(HashMap::new());
}

const WINDOW_CLASS: PCWSTR = w!("IMETestClass");

pub(crate) trait WndProc {
    fn wnd_proc(&self, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT;
}

#[derive(Debug)]
pub(crate) struct Window {
    hwnd: Cell<HWND>,
}

impl Window {
    pub(crate) fn new() -> Window {
        Window {
            hwnd: Cell::new(HWND::default()),
        }
    }

    pub(crate) fn register_class(hinstance: HINSTANCE) -> Result<()> {
        let wc = WNDCLASSEXW {
            cbSize: size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wnd_proc),
            hInstance: hinstance,
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW)? },
            hbrBackground: unsafe { GetSysColorBrush(COLOR_WINDOW) },
            lpszClassName: WINDOW_CLASS,
            ..Default::default()
        };
        if unsafe { RegisterClassExW(&wc) } == 0 {
            bail!("unable to register window class: {:?}", unsafe {
                GetLastError()
            });
        }
        Ok(())
    }

    /// Routes the messages of `hwnd` to `target` until the window is destroyed.
    pub(crate) fn register_hwnd(hwnd: HWND, target: &Rc<dyn WndProc>) {
        HWND_MAP.with_borrow_mut(|hwnd_map| {
            hwnd_map.insert(hwnd.0, Rc::downgrade(target));
        })
    }

    pub(crate) fn create(
        &self,
        hinstance: HINSTANCE,
        title: &str,
        width: i32,
        height: i32,
    ) -> Result<HWND> {
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                WINDOW_CLASS,
                &HSTRING::from(title),
                WS_OVERLAPPEDWINDOW | WS_VISIBLE,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                width,
                height,
                None,
                None,
                Some(hinstance),
                None,
            )?
        };
        self.hwnd.set(hwnd);
        Ok(hwnd)
    }

    pub(crate) fn hwnd(&self) -> HWND {
        self.hwnd.get()
    }

    /// Forgets the handle once the system has destroyed the window.
    pub(crate) fn detach(&self) {
        self.hwnd.set(HWND::default());
    }

    pub(crate) fn show(&self) {
        unsafe {
            let _ = ShowWindow(self.hwnd(), SW_SHOW);
            let _ = UpdateWindow(self.hwnd());
        }
    }

    pub(crate) fn refresh(&self) {
        unsafe {
            if !self.hwnd().is_invalid() {
                let _ = InvalidateRect(Some(self.hwnd()), None, true);
            }
        }
    }

    pub(crate) fn client_rect(&self) -> RECT {
        let mut rc = RECT::default();
        if let Err(error) = unsafe { GetClientRect(self.hwnd(), &mut rc) } {
            log::warn!("unable to get client rect: {error}");
        }
        rc
    }

    pub(crate) fn def_wnd_proc(&self, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
        unsafe { DefWindowProcW(self.hwnd(), msg, wparam, lparam) }
    }
}

unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    // Release the map before dispatching; handlers may pump nested messages.
    let target = HWND_MAP.with_borrow(|hwnd_map| hwnd_map.get(&hwnd.0).and_then(Weak::upgrade));
    let result = match target {
        Some(target) => target.wnd_proc(msg, wparam, lparam),
        None => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    };
    if msg == WM_NCDESTROY {
        HWND_MAP.with(|refcell| {
            if let Ok(mut hwnd_map) = refcell.try_borrow_mut() {
                hwnd_map.remove(&hwnd.0);
            }
        });
    }
    result
}

impl Drop for Window {
    fn drop(&mut self) {
        let hwnd = self.hwnd.get();
        if !hwnd.is_invalid() && unsafe { IsWindow(Some(hwnd)) }.as_bool() {
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
        }
    }
}
