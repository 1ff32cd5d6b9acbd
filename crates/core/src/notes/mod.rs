mod state;
mod types;

pub use state::NoteStores;
pub use types::{Note, NoteDraft};
