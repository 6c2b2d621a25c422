//! File entries and their previews.
//!
//! [`entry::FileEntry`] is the listing record shared by every layer;
//! [`preview`] holds the preview session, the modality dispatcher and the
//! byte-level inspectors used to render fetched content.

pub mod entry;
pub mod preview;

pub use entry::EntryKind;
pub use preview::{
    ImageInfo, ModalityKind, PdfInfo, PreviewDispatcher, PreviewModality, PreviewState,
    TextPreview,
};
