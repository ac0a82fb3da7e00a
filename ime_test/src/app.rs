// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Context, Result};
use log::info;
use windows::Win32::Foundation::HINSTANCE;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{DispatchMessageW, GetMessageW, MSG, TranslateMessage};

use crate::{config::Config, main_window::MainWindow, window::Window};

pub(crate) fn run(config: Config) -> Result<()> {
    let hinstance: HINSTANCE = unsafe { GetModuleHandleW(None) }
        .context("unable to get module handle")?
        .into();
    Window::register_class(hinstance)?;
    let main_window = MainWindow::create(hinstance, config).context("unable to create window")?;
    main_window.show();

    let mut msg = MSG::default();
    // GetMessageW returns -1 on error and 0 on WM_QUIT.
    while unsafe { GetMessageW(&mut msg, None, 0, 0) }.0 > 0 {
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
    info!("message loop exited with {}", msg.wParam.0);
    Ok(())
}
