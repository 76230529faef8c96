//! Heuristic field extraction. Each field is resolved by an ordered chain
//! of strategies; the first one that yields something usable wins.

pub mod content;
pub mod dates;
pub mod image;
pub mod metadata;
pub mod summary;
pub mod text;
pub mod title;

pub use content::extract_content;
pub use metadata::extract_meta;
