pub mod pages;
pub mod types;

pub use pages::PageSelector;
pub use types::{ImageAsset, ImageKind, NormalizedBox, PlacementRect};
