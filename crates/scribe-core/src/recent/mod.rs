pub mod model;
pub mod repository;
pub mod service;

pub use model::{MAX_RECENT_FILES, RecentEntry, RecentList};
pub use repository::RecentFilesRepository;
pub use service::RecentFiles;
