//! Salon (tenant) aggregate.

use chrono::{DateTime, Utc};
use serde::Serialize;

use style_preview_core::{SalonCategory, ServedAudience, Slug, StyleId, TenantId, TenantStatus};

/// A salon together with its style library.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub status: TenantStatus,
    #[serde(rename = "type")]
    pub category: SalonCategory,
    #[serde(rename = "services")]
    pub audience: ServedAudience,
    /// Remaining generation credits. Never negative.
    pub credits: i32,
    /// Reference photos, oldest first.
    #[serde(rename = "hairStyles")]
    pub style_library: Vec<StyleLibraryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Look up a style-library entry by id.
    #[must_use]
    pub fn style(&self, id: StyleId) -> Option<&StyleLibraryEntry> {
        self.style_library.iter().find(|entry| entry.id == id)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }
}

/// A reference hairstyle photo in a salon's library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleLibraryEntry {
    pub id: StyleId,
    pub name: String,
    #[serde(rename = "imageUrl")]
    pub image_ref: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Data for creating a salon.
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub name: String,
    pub slug: Slug,
    pub status: TenantStatus,
    pub category: SalonCategory,
    pub audience: ServedAudience,
    pub credits: i32,
}

/// Partial update of a salon. `None` leaves the field unchanged.
///
/// The balance is not part of it; see [`crate::store::TenantStore::update_credits`].
#[derive(Debug, Clone, Default)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub slug: Option<Slug>,
    pub status: Option<TenantStatus>,
    pub category: Option<SalonCategory>,
    pub audience: Option<ServedAudience>,
}

/// Data for adding a style-library entry.
#[derive(Debug, Clone)]
pub struct NewStyleEntry {
    pub name: String,
    pub image_ref: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tenant_with_styles(styles: Vec<StyleLibraryEntry>) -> Tenant {
        Tenant {
            id: TenantId::generate(),
            name: "Demo".to_string(),
            slug: "demo".to_string(),
            status: TenantStatus::Active,
            category: SalonCategory::Hairsalon,
            audience: ServedAudience::Both,
            credits: 10,
            style_library: styles,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_style_lookup_by_id() {
        let entry = StyleLibraryEntry {
            id: StyleId::generate(),
            name: "Pixie".to_string(),
            image_ref: "https://i.ibb.co/pixie.jpg".to_string(),
            uploaded_at: Utc::now(),
        };
        let tenant = tenant_with_styles(vec![entry.clone()]);

        assert_eq!(tenant.style(entry.id), Some(&entry));
        assert!(tenant.style(StyleId::generate()).is_none());
    }

    #[test]
    fn test_json_uses_api_field_names() {
        let tenant = tenant_with_styles(Vec::new());
        let json = serde_json::to_value(&tenant).unwrap();

        assert_eq!(json["type"], "hairsalon");
        assert_eq!(json["services"], "both");
        assert!(json["hairStyles"].as_array().unwrap().is_empty());
        assert!(json.get("createdAt").is_some());
    }
}
