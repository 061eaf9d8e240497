pub mod export;
pub mod loader;
pub mod manager;
pub mod retry;

pub use export::{PlaylistDraft, TrackQuery, PLAYLIST_BATCH_SIZE};
pub use loader::{CatalogLoader, LoadReport, LoaderConfig};
pub use manager::{CatalogSnapshot, CatalogStore};
pub use retry::RetryPolicy;
