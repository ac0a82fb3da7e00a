// SPDX-License-Identifier: GPL-3.0-or-later

//! Committed and displayed text of the test window.
//!
//! The committed text only changes on plain keystrokes and finished
//! compositions. The display text is the committed text plus whatever the
//! IME is currently composing. Whether a composition is in flight is never
//! stored: every preview update rebuilds the display text from scratch and
//! every commit or keystroke drops the preview.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::input::ImeEvent;

pub(crate) const BACKSPACE: char = '\u{8}';

#[derive(Debug, Error)]
pub(crate) enum BufferError {
    #[error("unable to allocate {requested} bytes of text: {source}")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct CompositionBuffer {
    committed: String,
    display: String,
}

impl CompositionBuffer {
    /// Starts with `text` already committed, e.g. the prompt shown on launch.
    pub(crate) fn with_text(text: &str) -> Result<CompositionBuffer, BufferError> {
        let committed = concat(&[text])?;
        let display = concat(&[text])?;
        Ok(CompositionBuffer { committed, display })
    }

    /// Like [`CompositionBuffer::with_text`], but starts empty when the
    /// prompt cannot be allocated and hands back the error for reporting.
    pub(crate) fn with_prompt(prompt: &str) -> (CompositionBuffer, Option<BufferError>) {
        match CompositionBuffer::with_text(prompt) {
            Ok(buffer) => (buffer, None),
            Err(error) => (CompositionBuffer::default(), Some(error)),
        }
    }

    pub(crate) fn append_char(&mut self, c: char) -> Result<(), BufferError> {
        if c == BACKSPACE {
            let keep = self
                .committed
                .char_indices()
                .next_back()
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            let display = concat(&[&self.committed[..keep]])?;
            self.committed.truncate(keep);
            self.display = display;
        } else {
            let mut encoded = [0; 4];
            let encoded = c.encode_utf8(&mut encoded);
            let committed = concat(&[&self.committed, encoded])?;
            let display = concat(&[&committed])?;
            self.committed = committed;
            self.display = display;
        }
        Ok(())
    }

    pub(crate) fn update_preview(&mut self, preview: &str) -> Result<(), BufferError> {
        self.display = concat(&[&self.committed, preview])?;
        Ok(())
    }

    pub(crate) fn commit_composition(&mut self, result: &str) -> Result<(), BufferError> {
        let committed = concat(&[&self.committed, result])?;
        let display = concat(&[&committed])?;
        self.committed = committed;
        self.display = display;
        Ok(())
    }

    pub(crate) fn apply(&mut self, event: &ImeEvent) -> Result<(), BufferError> {
        match event {
            ImeEvent::CharacterInput(c) => self.append_char(*c),
            ImeEvent::CompositionPreviewChanged(preview) => self.update_preview(preview),
            ImeEvent::CompositionCommitted(result) => self.commit_composition(result),
        }
    }

    pub(crate) fn display_text(&self) -> &str {
        &self.display
    }

    pub(crate) fn committed_text(&self) -> &str {
        &self.committed
    }

    pub(crate) fn is_composing(&self) -> bool {
        self.display.len() > self.committed.len()
    }
}

/// Builds a new string out of `parts` without aborting on allocation failure.
fn concat(parts: &[&str]) -> Result<String, BufferError> {
    let requested = parts.iter().map(|part| part.len()).sum();
    let mut text = allocate(requested)?;
    for part in parts {
        text.push_str(part);
    }
    Ok(text)
}

fn allocate(requested: usize) -> Result<String, BufferError> {
    let mut text = String::new();
    text.try_reserve_exact(reservation(requested))
        .map_err(|source| BufferError::Allocation { requested, source })?;
    Ok(text)
}

#[cfg(not(test))]
fn reservation(requested: usize) -> usize {
    requested
}

/// Requests above the per-thread limit become impossible ones, so the
/// reservation fails the same way an exhausted heap would.
#[cfg(test)]
fn reservation(requested: usize) -> usize {
    if requested > tests::ALLOCATION_LIMIT.get() {
        usize::MAX
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{BACKSPACE, BufferError, CompositionBuffer, allocate};
    use crate::input::ImeEvent;

    thread_local! {
        pub(super) static ALLOCATION_LIMIT: Cell<usize> = const { Cell::new(usize::MAX) };
    }

    /// Caps every allocation made by the buffer on this thread.
    fn limit_allocations(bytes: usize) {
        ALLOCATION_LIMIT.set(bytes);
    }

    fn unlimit_allocations() {
        ALLOCATION_LIMIT.set(usize::MAX);
    }

    fn buffer(text: &str) -> CompositionBuffer {
        CompositionBuffer::with_text(text).unwrap()
    }

    #[test]
    fn append_two_characters() {
        let mut buf = CompositionBuffer::default();
        buf.append_char('H').unwrap();
        buf.append_char('i').unwrap();
        assert_eq!("Hi", buf.committed_text());
        assert_eq!("Hi", buf.display_text());
    }

    #[test]
    fn preview_is_not_committed() {
        let mut buf = buffer("Hi");
        buf.update_preview("あ").unwrap();
        assert_eq!("Hiあ", buf.display_text());
        assert_eq!("Hi", buf.committed_text());
        assert!(buf.is_composing());
    }

    #[test]
    fn commit_replaces_preview() {
        let mut buf = buffer("Hi");
        buf.update_preview("あ").unwrap();
        buf.commit_composition("亜").unwrap();
        assert_eq!("Hi亜", buf.committed_text());
        assert_eq!("Hi亜", buf.display_text());
        assert!(!buf.is_composing());
    }

    #[test]
    fn backspace_removes_last_char() {
        let mut buf = buffer("A");
        buf.append_char(BACKSPACE).unwrap();
        assert_eq!("", buf.committed_text());
        assert_eq!("", buf.display_text());
    }

    #[test]
    fn backspace_on_empty_is_noop() {
        let mut buf = CompositionBuffer::default();
        buf.append_char(BACKSPACE).unwrap();
        buf.append_char(BACKSPACE).unwrap();
        assert_eq!("", buf.committed_text());
        assert_eq!("", buf.display_text());
    }

    #[test]
    fn backspace_removes_whole_scalar_value() {
        let mut buf = buffer("a𠀋");
        buf.append_char(BACKSPACE).unwrap();
        assert_eq!("a", buf.committed_text());
        let mut buf = buffer("日本");
        buf.append_char(BACKSPACE).unwrap();
        assert_eq!("日", buf.display_text());
    }

    #[test]
    fn backspace_drops_preview() {
        let mut buf = buffer("ab");
        buf.update_preview("にほん").unwrap();
        buf.append_char(BACKSPACE).unwrap();
        assert_eq!("a", buf.committed_text());
        assert_eq!("a", buf.display_text());
    }

    #[test]
    fn length_tracks_appends_minus_backspaces() {
        let keys = "ab\u{8}\u{8}\u{8}cde\u{8}f\u{8}\u{8}\u{8}\u{8}g";
        let mut buf = CompositionBuffer::default();
        let mut expected = 0usize;
        for c in keys.chars() {
            buf.append_char(c).unwrap();
            if c == BACKSPACE {
                expected = expected.saturating_sub(1);
            } else {
                expected += 1;
            }
            assert_eq!(expected, buf.committed_text().chars().count());
            assert_eq!(buf.committed_text(), buf.display_text());
        }
        assert_eq!("g", buf.committed_text());
    }

    #[test]
    fn preview_replaces_previous_preview() {
        let mut buf = buffer("x");
        for preview in ["k", "か", "かn", "かん", ""] {
            buf.update_preview(preview).unwrap();
            assert_eq!(format!("x{preview}"), buf.display_text());
            assert_eq!("x", buf.committed_text());
        }
        assert!(!buf.is_composing());
    }

    #[test]
    fn empty_preview_then_empty_commit_changes_nothing() {
        let mut buf = buffer("Hi");
        let before = buf.clone();
        buf.update_preview("").unwrap();
        buf.commit_composition("").unwrap();
        assert_eq!(before, buf);
    }

    #[test]
    fn apply_dispatches_events() {
        let mut buf = CompositionBuffer::default();
        let events = [
            ImeEvent::CharacterInput('H'),
            ImeEvent::CharacterInput('i'),
            ImeEvent::CompositionPreviewChanged("あ".to_owned()),
        ];
        for event in &events {
            buf.apply(event).unwrap();
        }
        assert_eq!("Hiあ", buf.display_text());
        buf.apply(&ImeEvent::CompositionCommitted("亜".to_owned()))
            .unwrap();
        assert_eq!("Hi亜", buf.committed_text());
        assert_eq!("Hi亜", buf.display_text());
    }

    #[test]
    fn oversized_allocation_is_reported() {
        let err = allocate(usize::MAX).unwrap_err();
        let BufferError::Allocation { requested, .. } = &err;
        assert_eq!(usize::MAX, *requested);
        assert!(err.to_string().starts_with("unable to allocate"));
    }

    #[test]
    fn failed_allocation_leaves_buffer_unchanged() {
        let mut buf = buffer("Hello");
        buf.update_preview("xy").unwrap();
        let before = buf.clone();

        limit_allocations(5);
        assert!(matches!(
            buf.commit_composition("abc"),
            Err(BufferError::Allocation { requested: 8, .. })
        ));
        assert_eq!(before, buf);
        assert!(matches!(
            buf.append_char('z'),
            Err(BufferError::Allocation { requested: 6, .. })
        ));
        assert_eq!(before, buf);
        assert!(matches!(
            buf.update_preview("longer preview"),
            Err(BufferError::Allocation { .. })
        ));
        assert_eq!(before, buf);
        assert_eq!("Helloxy", buf.display_text());

        buf.append_char(BACKSPACE).unwrap();
        unlimit_allocations();
        assert_eq!("Hell", buf.committed_text());
        assert_eq!("Hell", buf.display_text());
        buf.append_char('o').unwrap();
        assert_eq!("Hello", buf.display_text());
    }

    #[test]
    fn prompt_falls_back_to_empty_buffer() {
        limit_allocations(4);
        let (buf, error) = CompositionBuffer::with_prompt("Enter Text (IME)");
        unlimit_allocations();
        assert_eq!(CompositionBuffer::default(), buf);
        assert!(matches!(
            error,
            Some(BufferError::Allocation { requested: 16, .. })
        ));

        let (buf, error) = CompositionBuffer::with_prompt("Enter Text (IME)");
        assert!(error.is_none());
        assert_eq!("Enter Text (IME)", buf.display_text());
    }
}
