//! Archive Module
//!
//! Reads zip, rar and 7z archives through one entry model. Zip and rar are
//! decoded in-process; 7z goes through the bundled `7za` tool.

mod backend;
mod bridge;
mod entry;
mod format;
mod listing;
mod rar_backend;
mod reader;
mod settle;
mod seven_zip;
mod zip_backend;

pub use backend::{ArchiveBackend, ArchiveContext};
pub use bridge::{platform_dir, run, SevenZipBridge, ToolLayout};
pub use entry::{normalize_entry_name, ArchiveEntry};
pub use format::ArchiveFormat;
pub use listing::{parse_blocks, parse_listing, ParsedBlock, RawListingRecord};
pub use rar_backend::RarBackend;
pub use reader::{ArchiveReader, ExtractProgress};
pub use seven_zip::SevenZipBackend;
pub use zip_backend::{with_synthesized_directories, ZipBackend};
