//! Content Blocks
//!
//! An article body is an ordered sequence of typed blocks. On the wire each
//! block is `{ "type": ..., "order": ..., "content": { ... } }`; in memory the
//! payload is a sum type so validation is exhaustive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TITLE_LENGTH: usize = 150;
pub const MAX_CONTENT_LENGTH: usize = 10_000;
pub const MAX_CONTENT_BLOCKS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("Article content needs at least one block")]
    Empty,

    #[error("Article content may have at most {MAX_CONTENT_BLOCKS} blocks")]
    TooManyBlocks,

    #[error("Block orders must be strictly increasing (block {index})")]
    OutOfOrder { index: usize },

    #[error("Block {index} ({kind}): {reason}")]
    InvalidBlock {
        index: usize,
        kind: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum BlockBody {
    Heading {
        text: String,
        level: u8,
    },
    Paragraph {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<String>,
    },
    Image {
        url: String,
        alt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Code {
        code: String,
        language: String,
    },
    VideoEmbed {
        provider: String,
        url: String,
    },
    List {
        items: Vec<String>,
    },
    Divider {
        style: String,
    },
}

impl BlockBody {
    pub fn kind(&self) -> &'static str {
        match self {
            BlockBody::Heading { .. } => "heading",
            BlockBody::Paragraph { .. } => "paragraph",
            BlockBody::Image { .. } => "image",
            BlockBody::Code { .. } => "code",
            BlockBody::VideoEmbed { .. } => "video_embed",
            BlockBody::List { .. } => "list",
            BlockBody::Divider { .. } => "divider",
        }
    }

    /// Reader-visible text of the block, for policy screening.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            BlockBody::Heading { text, .. } => vec![text.as_str()],
            BlockBody::Paragraph { text, .. } => vec![text.as_str()],
            BlockBody::Image { alt, caption, .. } => {
                let mut texts = vec![alt.as_str()];
                texts.extend(caption.as_deref());
                texts
            }
            BlockBody::Code { code, .. } => vec![code.as_str()],
            BlockBody::VideoEmbed { url, .. } => vec![url.as_str()],
            BlockBody::List { items } => items.iter().map(String::as_str).collect(),
            BlockBody::Divider { .. } => Vec::new(),
        }
    }

    fn check(&self) -> Result<(), &'static str> {
        let blank = |s: &str| s.trim().is_empty();
        match self {
            BlockBody::Heading { text, level } => {
                if blank(text) {
                    return Err("text is required");
                }
                if text.chars().count() > MAX_TITLE_LENGTH {
                    return Err("text is too long");
                }
                if !(1..=6).contains(level) {
                    return Err("level must be between 1 and 6");
                }
            }
            BlockBody::Paragraph { text, .. } => {
                if blank(text) {
                    return Err("text is required");
                }
                if text.chars().count() > MAX_CONTENT_LENGTH {
                    return Err("text is too long");
                }
            }
            BlockBody::Image { url, alt, .. } => {
                if blank(url) {
                    return Err("url is required");
                }
                if blank(alt) {
                    return Err("alt is required");
                }
            }
            BlockBody::Code { code, language } => {
                if blank(code) {
                    return Err("code is required");
                }
                if blank(language) {
                    return Err("language is required");
                }
            }
            BlockBody::VideoEmbed { provider, url } => {
                if blank(provider) {
                    return Err("provider is required");
                }
                if blank(url) {
                    return Err("url is required");
                }
            }
            BlockBody::List { items } => {
                if items.is_empty() {
                    return Err("items are required");
                }
                if items.iter().any(|item| blank(item)) {
                    return Err("items cannot be blank");
                }
            }
            BlockBody::Divider { style } => {
                if blank(style) {
                    return Err("style is required");
                }
            }
        }
        Ok(())
    }
}

/// One positioned block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireBlock", into = "WireBlock")]
pub struct ContentBlock {
    pub order: i32,
    pub body: BlockBody,
}

impl ContentBlock {
    pub fn new(order: i32, body: BlockBody) -> Self {
        Self { order, body }
    }

    pub fn paragraph(order: i32, text: impl Into<String>) -> Self {
        Self::new(
            order,
            BlockBody::Paragraph {
                text: text.into(),
                style: None,
            },
        )
    }
}

/// Flat JSON form: the payload sits next to `order` under `type` / `content`.
#[derive(Serialize, Deserialize)]
struct WireBlock {
    order: i32,
    #[serde(flatten)]
    body: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<WireBlock> for ContentBlock {
    type Error = serde_json::Error;

    fn try_from(wire: WireBlock) -> Result<Self, Self::Error> {
        let body = serde_json::from_value(serde_json::Value::Object(wire.body))?;
        Ok(Self {
            order: wire.order,
            body,
        })
    }
}

impl From<ContentBlock> for WireBlock {
    fn from(block: ContentBlock) -> Self {
        let body = match serde_json::to_value(block.body) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        Self {
            order: block.order,
            body,
        }
    }
}

/// Walk the sequence once and check shape plus per-block invariants.
pub fn validate_content(blocks: &[ContentBlock]) -> Result<(), ContentError> {
    if blocks.is_empty() {
        return Err(ContentError::Empty);
    }
    if blocks.len() > MAX_CONTENT_BLOCKS {
        return Err(ContentError::TooManyBlocks);
    }

    let mut previous: Option<i32> = None;
    for (index, block) in blocks.iter().enumerate() {
        if previous.is_some_and(|p| block.order <= p) {
            return Err(ContentError::OutOfOrder { index });
        }
        previous = Some(block.order);

        block.body.check().map_err(|reason| ContentError::InvalidBlock {
            index,
            kind: block.body.kind(),
            reason,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paragraphs(n: usize) -> Vec<ContentBlock> {
        (0..n)
            .map(|i| ContentBlock::paragraph(i as i32 + 1, format!("para {}", i)))
            .collect()
    }

    #[test]
    fn test_block_count_boundaries() {
        assert_eq!(validate_content(&[]), Err(ContentError::Empty));
        assert!(validate_content(&paragraphs(MAX_CONTENT_BLOCKS)).is_ok());
        assert_eq!(
            validate_content(&paragraphs(MAX_CONTENT_BLOCKS + 1)),
            Err(ContentError::TooManyBlocks)
        );
    }

    #[test]
    fn test_order_must_increase_gaps_allowed() {
        let gapped = vec![ContentBlock::paragraph(1, "a"), ContentBlock::paragraph(10, "b")];
        assert!(validate_content(&gapped).is_ok());

        let repeated = vec![ContentBlock::paragraph(2, "a"), ContentBlock::paragraph(2, "b")];
        assert_eq!(
            validate_content(&repeated),
            Err(ContentError::OutOfOrder { index: 1 })
        );
    }

    #[test]
    fn test_per_block_invariants() {
        let cases = [
            BlockBody::Heading { text: "Title".into(), level: 7 },
            BlockBody::Heading { text: " ".into(), level: 1 },
            BlockBody::Image { url: "https://x/y.png".into(), alt: "".into(), caption: None },
            BlockBody::Code { code: "fn main() {}".into(), language: "".into() },
            BlockBody::VideoEmbed { provider: "".into(), url: "https://v".into() },
            BlockBody::List { items: vec![] },
            BlockBody::Divider { style: "".into() },
        ];
        for body in cases {
            let kind = body.kind();
            let result = validate_content(&[ContentBlock::new(1, body)]);
            assert!(
                matches!(result, Err(ContentError::InvalidBlock { kind: k, .. }) if k == kind),
                "{} should be rejected",
                kind
            );
        }

        let long = "x".repeat(MAX_CONTENT_LENGTH + 1);
        assert!(validate_content(&[ContentBlock::paragraph(1, long)]).is_err());
    }

    #[test]
    fn test_wire_format() {
        let block: ContentBlock = serde_json::from_value(json!({
            "type": "heading",
            "order": 1,
            "content": {"text": "Intro", "level": 2}
        }))
        .unwrap();
        assert_eq!(
            block.body,
            BlockBody::Heading { text: "Intro".into(), level: 2 }
        );

        let value = serde_json::to_value(ContentBlock::new(
            3,
            BlockBody::Divider { style: "dots".into() },
        ))
        .unwrap();
        assert_eq!(
            value,
            json!({"type": "divider", "order": 3, "content": {"style": "dots"}})
        );
    }

    #[test]
    fn test_unknown_block_type_fails() {
        let result: Result<ContentBlock, _> = serde_json::from_value(json!({
            "type": "carousel",
            "order": 1,
            "content": {}
        }));
        assert!(result.is_err());
    }
}
