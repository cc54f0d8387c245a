//! Value Objects

pub mod content;
pub mod slug;
pub mod tag_name;

pub use content::{
    BlockBody, ContentBlock, ContentError, MAX_CONTENT_BLOCKS, MAX_CONTENT_LENGTH,
    MAX_TITLE_LENGTH, validate_content,
};
pub use slug::{Slug, SlugError};
pub use tag_name::{TagName, TagNameError};
