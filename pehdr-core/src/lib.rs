pub mod cursor;
pub mod error;
pub mod flags;
pub mod header;
pub mod image;
pub mod sections;

pub use error::*;
pub use header::coff::CoffHeader;
pub use header::data_directory::DataDirectory;
pub use header::dos::DosHeader;
pub use header::optional::{OptionalHeader, OptionalKind};
pub use header::Header;
pub use image::*;
pub use sections::*;
