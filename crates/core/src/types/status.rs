//! Enums describing tenants, users and generations.
//!
//! Each enum serializes with the same lowercase strings the JSON API and the
//! database enum types use, so a value read from one side can be written to
//! the other without translation.

use serde::{Deserialize, Serialize};

/// Whether a salon may use the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "tenant_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    #[default]
    Active,
    /// Suspended salons can still sign in but cannot upload or generate.
    Suspended,
}

impl TenantStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TenantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            _ => Err(format!("invalid tenant status: {s}")),
        }
    }
}

/// Kind of business a salon runs. Style transfer is only offered to hair salons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "salon_category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SalonCategory {
    Barbershop,
    #[default]
    Hairsalon,
}

impl SalonCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Barbershop => "barbershop",
            Self::Hairsalon => "hairsalon",
        }
    }

    /// Whether the style-transfer workflow is available to this category.
    #[must_use]
    pub const fn supports_style_transfer(self) -> bool {
        matches!(self, Self::Hairsalon)
    }
}

impl std::fmt::Display for SalonCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SalonCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "barbershop" => Ok(Self::Barbershop),
            "hairsalon" => Ok(Self::Hairsalon),
            _ => Err(format!("invalid salon type: {s}")),
        }
    }
}

/// Which clients a salon serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "served_audience", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ServedAudience {
    Male,
    Female,
    #[default]
    Both,
}

impl ServedAudience {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for ServedAudience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServedAudience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "both" => Ok(Self::Both),
            _ => Err(format!("invalid services: {s}")),
        }
    }
}

/// How a preview was requested: from a text prompt or from a style-library photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "generation_kind", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationKind {
    Prompt,
    StyleReference,
}

impl GenerationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::StyleReference => "style-reference",
        }
    }
}

impl std::fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GenerationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prompt" => Ok(Self::Prompt),
            "style-reference" => Ok(Self::StyleReference),
            _ => Err(format!("invalid generation type: {s}")),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform operator managing every tenant.
    Admin,
    /// Salon operator bound to exactly one tenant.
    Salon,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Salon => "salon",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "salon" => Ok(Self::Salon),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_kind_wire_format() {
        assert_eq!(
            serde_json::to_string(&GenerationKind::StyleReference).unwrap(),
            "\"style-reference\""
        );
        assert_eq!(
            "style-reference".parse::<GenerationKind>().unwrap(),
            GenerationKind::StyleReference
        );
        assert!("style_reference".parse::<GenerationKind>().is_err());
    }

    #[test]
    fn test_display_matches_from_str() {
        for status in [TenantStatus::Active, TenantStatus::Suspended] {
            assert_eq!(status.to_string().parse::<TenantStatus>().unwrap(), status);
        }
        for audience in [ServedAudience::Male, ServedAudience::Female, ServedAudience::Both] {
            assert_eq!(
                audience.to_string().parse::<ServedAudience>().unwrap(),
                audience
            );
        }
        for role in [UserRole::Admin, UserRole::Salon] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_only_hair_salons_support_style_transfer() {
        assert!(SalonCategory::Hairsalon.supports_style_transfer());
        assert!(!SalonCategory::Barbershop.supports_style_transfer());
    }

    #[test]
    fn test_invalid_values_name_the_field() {
        let err = "spa".parse::<SalonCategory>().unwrap_err();
        assert_eq!(err, "invalid salon type: spa");
    }
}
