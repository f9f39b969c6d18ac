//! JSONB column types shared by several tables.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::ShippingAddress;

/// Ordered list of strings (image URLs, sizes).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct StringList(pub Vec<String>);

impl StringList {
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn extend_unique(&mut self, items: impl IntoIterator<Item = String>) {
        for item in items {
            if !self.0.contains(&item) {
                self.0.push(item);
            }
        }
    }

    pub fn remove_all(&mut self, items: &[String]) {
        self.0.retain(|existing| !items.contains(existing));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct IdList(pub Vec<Uuid>);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct SavedAddresses(pub Vec<ShippingAddress>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_lists_append_without_duplicates_and_remove() {
        let mut images = StringList(vec!["a.jpg".into(), "b.jpg".into()]);
        images.extend_unique(["b.jpg".to_string(), "c.jpg".to_string()]);
        assert_eq!(images.0, vec!["a.jpg", "b.jpg", "c.jpg"]);

        images.remove_all(&["a.jpg".to_string(), "zzz.jpg".to_string()]);
        assert_eq!(images.0, vec!["b.jpg", "c.jpg"]);
        assert_eq!(images.first(), Some("b.jpg"));
    }
}
