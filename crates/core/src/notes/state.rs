use super::{Note, NoteDraft};
use crate::store::Observable;

/// Client-side note state shared across the UI.
///
/// Both holders are plain observable slots: no validation and no persistence.
#[derive(Debug, Clone, Default)]
pub struct NoteStores {
    /// The note open in the editor.
    pub current: Observable<NoteDraft>,
    /// Every note known to the client, in display order.
    pub all: Observable<Vec<Note>>,
}

impl NoteStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores both holders to their initial, empty values.
    pub fn reset(&self) {
        self.current.set(NoteDraft::default());
        self.all.set(Vec::new());
    }
}
