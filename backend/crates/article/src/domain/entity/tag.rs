//! Tag Entity
//!
//! Tags are born pending and end approved or rejected; only approved tags
//! let an article reach published.

use chrono::{DateTime, Utc};
use kernel::id::{TagId, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::TagName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagStatus {
    Pending,
    Approved,
    Rejected,
}

impl TagStatus {
    pub const fn id(&self) -> i16 {
        match self {
            TagStatus::Pending => 1,
            TagStatus::Approved => 2,
            TagStatus::Rejected => 3,
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TagStatus::Pending),
            2 => Some(TagStatus::Approved),
            3 => Some(TagStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub tag_id: TagId,
    pub name: TagName,
    pub status: TagStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: TagName, created_by: UserId) -> Self {
        let now = Utc::now();
        Self {
            tag_id: TagId::new(),
            name,
            status: TagStatus::Pending,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_approved(&self) -> bool {
        self.status == TagStatus::Approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tag_is_pending() {
        let tag = Tag::new(TagName::new("Rust").unwrap(), UserId::new());
        assert_eq!(tag.status, TagStatus::Pending);
        assert!(!tag.is_approved());
        assert_eq!(tag.name.as_str(), "rust");
    }

    #[test]
    fn test_status_ids_round_trip() {
        for status in [TagStatus::Pending, TagStatus::Approved, TagStatus::Rejected] {
            assert_eq!(TagStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(TagStatus::from_id(0), None);
    }
}
