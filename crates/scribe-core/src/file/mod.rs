//! File capability model: references, permissions and host traits.

mod capability;
mod reference;

pub use capability::{FileHandle, FileHost, FilePicker, WritableFile};
pub use reference::{AccessMode, EntryCheck, FileReference, PermissionState};
