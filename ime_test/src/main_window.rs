// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    cell::{Cell, RefCell},
    ffi::c_void,
    rc::Rc,
};

use anyhow::Result;
use log::{debug, error, info, trace, warn};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, COLOR_WINDOW, DT_EXPANDTABS, DT_LEFT, DT_WORDBREAK, DrawTextW, EndPaint,
    FillRect, GetSysColorBrush, HFONT, PAINTSTRUCT, SelectObject, SetBkMode, SetTextColor,
    TRANSPARENT,
};
use windows::Win32::UI::Input::Ime::{IMN_SETCONVERSIONMODE, IMN_SETOPENSTATUS};
use windows::Win32::UI::WindowsAndMessaging::{
    MB_ICONERROR, MB_OK, MessageBoxW, PostQuitMessage, WM_CHAR, WM_DESTROY, WM_IME_COMPOSITION,
    WM_IME_ENDCOMPOSITION, WM_IME_NOTIFY, WM_IME_STARTCOMPOSITION, WM_NCDESTROY, WM_PAINT,
    WM_SETFONT, WM_SIZE,
};
use windows_core::{HSTRING, w};

use crate::{
    composition::{BufferError, CompositionBuffer},
    config::Config,
    font::Font,
    ime::{CompositionChange, ImeContext, OwnedImeContext},
    input::{ImeEvent, Utf16Decoder},
    status::ImeStatus,
    status_bar::StatusBar,
    window::{Window, WndProc},
};

/// The test window and everything typed into it.
pub(crate) struct MainWindow {
    window: Window,
    hinstance: HINSTANCE,
    config: Config,
    buffer: RefCell<CompositionBuffer>,
    decoder: RefCell<Utf16Decoder>,
    ime_status: RefCell<ImeStatus>,
    ime_context: RefCell<Option<OwnedImeContext>>,
    status_bar: RefCell<Option<StatusBar>>,
    font: Cell<HFONT>,
    _owned_font: Option<Font>,
}

impl MainWindow {
    pub(crate) fn create(hinstance: HINSTANCE, config: Config) -> Result<Rc<MainWindow>> {
        let (buffer, prompt_error) = CompositionBuffer::with_prompt(&config.prompt);
        let owned_font = Font::new(&config.font_face, config.font_size);
        let window = Window::new();
        let hwnd = window.create(hinstance, &config.title, config.width, config.height)?;
        let main_window = Rc::new(MainWindow {
            window,
            hinstance,
            buffer: RefCell::new(buffer),
            decoder: RefCell::new(Utf16Decoder::new()),
            ime_status: RefCell::new(ImeStatus::default()),
            ime_context: RefCell::new(None),
            status_bar: RefCell::new(None),
            font: Cell::new(owned_font.as_ref().map(Font::handle).unwrap_or_default()),
            _owned_font: owned_font,
            config,
        });
        let target: Rc<dyn WndProc> = main_window.clone();
        Window::register_hwnd(hwnd, &target);
        main_window.on_create()?;
        if let Some(error) = prompt_error {
            main_window.report_buffer_error(&error);
        }
        Ok(main_window)
    }

    pub(crate) fn show(&self) {
        self.window.show();
    }

    fn on_create(&self) -> Result<()> {
        match OwnedImeContext::associate(self.window.hwnd()) {
            Some(context) => {
                *self.ime_context.borrow_mut() = Some(context);
            }
            None => {
                error!("unable to create an input context");
                self.report_error("Failed to create IME context!");
            }
        }
        // Opening the context already notified IMN_SETOPENSTATUS.
        let status_bar = StatusBar::create(self.window.hwnd(), self.hinstance)?;
        status_bar.show(&self.ime_status.borrow());
        *self.status_bar.borrow_mut() = Some(status_bar);
        Ok(())
    }

    fn on_destroy(&self) {
        self.ime_context.take();
        self.status_bar.take();
        unsafe { PostQuitMessage(0) };
    }

    fn on_paint(&self) {
        let hwnd = self.window.hwnd();
        let margin = self.config.text_margin;
        let mut rc = self.window.client_rect();
        rc.top += margin;
        rc.left += margin;
        rc.bottom -= margin;
        rc.right -= margin;
        let mut text: Vec<u16> = self.buffer.borrow().display_text().encode_utf16().collect();

        let mut ps = PAINTSTRUCT::default();
        unsafe {
            let hdc = BeginPaint(hwnd, &mut ps);
            FillRect(hdc, &ps.rcPaint, GetSysColorBrush(COLOR_WINDOW));
            let font = self.font.get();
            let old_font = (!font.is_invalid()).then(|| SelectObject(hdc, font.into()));
            SetTextColor(hdc, COLORREF(0));
            SetBkMode(hdc, TRANSPARENT);
            DrawTextW(hdc, &mut text, &mut rc, DT_LEFT | DT_EXPANDTABS | DT_WORDBREAK);
            if let Some(old_font) = old_font {
                SelectObject(hdc, old_font);
            }
            let _ = EndPaint(hwnd, &ps);
        }
    }

    fn on_char(&self, unit: u16) {
        let chars: Vec<char> = self.decoder.borrow_mut().push(unit).collect();
        for c in chars {
            debug!("WM_CHAR {c:?}");
            self.apply(ImeEvent::CharacterInput(c));
        }
    }

    fn on_start_composition(&self) {
        let (x, y) = (self.config.candidate_x, self.config.candidate_y);
        let Some(context) = ImeContext::get(self.window.hwnd()) else {
            warn!("no input context to place the candidate window");
            return;
        };
        debug!("candidate pos x:{x} y:{y}");
        if !context.set_candidate_pos(x, y) {
            warn!("unable to move the candidate window");
        }
    }

    /// Returns false when the message carries neither a result nor a preview.
    fn on_composition(&self, lparam: LPARAM) -> bool {
        let Some(change) = CompositionChange::from_lparam(lparam) else {
            debug!("other composition change {:#x}", lparam.0);
            return false;
        };
        let text = match ImeContext::get(self.window.hwnd()) {
            Some(context) => context.composition_string(change),
            None => {
                warn!("no input context for {change:?}");
                return false;
            }
        };
        match text {
            Ok(text) => self.apply(change.into_event(text)),
            Err(error) => self.report_buffer_error(&error),
        }
        true
    }

    fn on_end_composition(&self) {
        // A cancelled composition ends without a result string.
        if self.buffer.borrow().is_composing() {
            self.apply(ImeEvent::CompositionPreviewChanged(String::new()));
        }
    }

    fn on_notify(&self, command: u32) {
        let Some(context) = ImeContext::get(self.window.hwnd()) else {
            return;
        };
        match command {
            IMN_SETOPENSTATUS => {
                let open = context.open_status();
                info!("IME enabled {open}");
                self.ime_status.borrow_mut().open = open;
            }
            IMN_SETCONVERSIONMODE => {
                let Some((conversion, sentence)) = context.conversion_status() else {
                    warn!("unable to query the conversion status");
                    return;
                };
                info!("IME status changed to conversion {conversion:#x} sentence {sentence:#x}");
                let mut status = self.ime_status.borrow_mut();
                status.conversion = Some(conversion);
                status.sentence = Some(sentence);
            }
            _ => return,
        }
        drop(context);
        if let Some(status_bar) = self.status_bar.borrow().as_ref() {
            status_bar.show(&self.ime_status.borrow());
        }
    }

    fn apply(&self, event: ImeEvent) {
        let result = self.buffer.borrow_mut().apply(&event);
        match result {
            Ok(()) => {
                let buffer = self.buffer.borrow();
                debug!(
                    "input text {:?} display text {:?}",
                    buffer.committed_text(),
                    buffer.display_text()
                );
                drop(buffer);
                self.window.refresh();
            }
            Err(error) => self.report_buffer_error(&error),
        }
    }

    fn report_buffer_error(&self, error: &BufferError) {
        error!("text input dropped: {error}");
        self.report_error(&format!("Text input dropped: {error}"));
    }

    fn report_error(&self, message: &str) {
        unsafe {
            MessageBoxW(
                Some(self.window.hwnd()),
                &HSTRING::from(message),
                w!("Error"),
                MB_ICONERROR | MB_OK,
            );
        }
    }
}

impl WndProc for MainWindow {
    fn wnd_proc(&self, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
        trace!(
            "message {msg:#x}, wparam {:#x}, lparam {:#x}",
            wparam.0, lparam.0
        );
        match msg {
            WM_DESTROY => {
                self.on_destroy();
                LRESULT(0)
            }
            WM_NCDESTROY => {
                let result = self.window.def_wnd_proc(msg, wparam, lparam);
                self.window.detach();
                result
            }
            WM_SETFONT => {
                self.font.set(HFONT(wparam.0 as *mut c_void));
                if lparam.0 != 0 {
                    self.window.refresh();
                }
                LRESULT(0)
            }
            WM_PAINT => {
                self.on_paint();
                LRESULT(0)
            }
            WM_SIZE => {
                if let Some(status_bar) = self.status_bar.borrow().as_ref() {
                    status_bar.on_parent_resized();
                }
                self.window.refresh();
                self.window.def_wnd_proc(msg, wparam, lparam)
            }
            WM_CHAR => {
                self.on_char(wparam.0 as u16);
                LRESULT(0)
            }
            WM_IME_STARTCOMPOSITION => {
                self.on_start_composition();
                LRESULT(0)
            }
            WM_IME_COMPOSITION => {
                if self.on_composition(lparam) {
                    LRESULT(0)
                } else {
                    self.window.def_wnd_proc(msg, wparam, lparam)
                }
            }
            WM_IME_ENDCOMPOSITION => {
                self.on_end_composition();
                self.window.def_wnd_proc(msg, wparam, lparam)
            }
            WM_IME_NOTIFY => {
                self.on_notify(wparam.0 as u32);
                self.window.def_wnd_proc(msg, wparam, lparam)
            }
            _ => self.window.def_wnd_proc(msg, wparam, lparam),
        }
    }
}
