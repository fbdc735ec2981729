//! Storage layer.
//!
//! Images are plain files laid out per user token:
//!
//! ```text
//! <root>/
//! ├── <token-a>/
//! │   ├── receipt.jpg
//! │   └── lunch.png
//! └── <token-b>/
//!     └── taxi.jpg
//! ```
//!
//! - [`StoreLocator`]: pure (token, file name) → path resolution with traversal checks
//! - [`DiskStore`]: root bootstrap and upload writes through the locator

mod disk;
mod locator;

pub use disk::{DiskStore, StoredImage};
pub use locator::{base_name, sanitize_file_name, StoreLocator};
