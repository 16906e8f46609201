//! Preconditions checked before any credits are spent.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. the caller is a salon operator bound to a salon
//! 2. the salon exists
//! 3. the salon is active
//! 4. the body is a JSON object with fields of the right types
//! 5. `inputImageId` is present
//! 6. exactly one of `prompt` / `hairStyleId` is present, ids are UUIDs and
//!    `variations` is in range
//! 7. the image exists and belongs to the salon
//! 8. the style exists in the salon's library
//! 9. style transfer is only offered to hair salons
//!
//! Validation reads from the stores but never writes.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::instrument;

use style_preview_core::{GenerationKind, ImageId, MAX_VARIATIONS, StyleId, UserRole};

use super::GenerationError;
use crate::models::{Principal, StyleLibraryEntry, Tenant, UploadedImage};
use crate::store::{ImageStore, TenantStore};

/// Which endpoint the request came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    /// `POST /api/generations`: prompt or style reference.
    Standard,
    /// `POST /api/generations/style-transfer`: style reference only, hair salons only.
    StyleTransfer,
}

/// Raw request body. Fields stay loosely typed so each problem maps to its
/// own validation error instead of a generic JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub input_image_id: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub hair_style_id: Option<String>,
    #[serde(default)]
    pub variations: Option<i64>,
    /// First syntax or type problem found while decoding the body.
    #[serde(skip)]
    pub malformed: Option<(&'static str, String)>,
}

impl GenerationRequest {
    /// Decode a request body without rejecting it.
    ///
    /// Syntax and type problems are kept in `malformed` and reported by
    /// [`RequestValidator::validate`] once the caller and salon have been
    /// checked. An empty body is an empty request.
    #[must_use]
    pub fn from_json(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Self::from_fields(&fields),
            Ok(_) => Self::malformed("body", "must be a JSON object".to_string()),
            Err(e) => Self::malformed("body", format!("invalid JSON: {e}")),
        }
    }

    fn malformed(field: &'static str, reason: String) -> Self {
        Self {
            malformed: Some((field, reason)),
            ..Self::default()
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        let mut request = Self::default();
        request.input_image_id = request.string_field(fields, "inputImageId");
        request.prompt = request.string_field(fields, "prompt");
        request.hair_style_id = request.string_field(fields, "hairStyleId");
        match fields.get("variations") {
            None | Some(Value::Null) => {}
            Some(value) => match value.as_i64() {
                Some(n) => request.variations = Some(n),
                None => request.note("variations", "must be an integer"),
            },
        }
        request
    }

    fn string_field(&mut self, fields: &Map<String, Value>, name: &'static str) -> Option<String> {
        match fields.get(name) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.note(name, "must be a string");
                None
            }
        }
    }

    fn note(&mut self, field: &'static str, reason: &str) {
        if self.malformed.is_none() {
            self.malformed = Some((field, reason.to_string()));
        }
    }
}

/// A request that passed every check, with the records it refers to.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub tenant: Tenant,
    pub image: UploadedImage,
    pub prompt: Option<String>,
    pub style: Option<StyleLibraryEntry>,
    pub variations: u32,
    pub kind: GenerationKind,
}

/// Checks generation requests against the tenant and image stores.
#[derive(Clone)]
pub struct RequestValidator {
    tenants: Arc<dyn TenantStore>,
    images: Arc<dyn ImageStore>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl RequestValidator {
    #[must_use]
    pub fn new(tenants: Arc<dyn TenantStore>, images: Arc<dyn ImageStore>) -> Self {
        Self { tenants, images }
    }

    /// Run all checks.
    ///
    /// # Errors
    ///
    /// Returns the first failed check as a [`GenerationError`].
    #[instrument(skip_all, fields(workflow = ?workflow))]
    pub async fn validate(
        &self,
        principal: Option<&Principal>,
        request: &GenerationRequest,
        workflow: Workflow,
    ) -> Result<ValidatedRequest, GenerationError> {
        // 1
        let tenant_id = principal
            .filter(|p| p.role == UserRole::Salon)
            .and_then(Principal::operator_tenant)
            .ok_or(GenerationError::Unauthorized)?;

        // 2, 3
        let tenant = self
            .tenants
            .get_by_id(tenant_id)
            .await?
            .ok_or(GenerationError::TenantNotFound)?;
        if !tenant.is_active() {
            return Err(GenerationError::TenantSuspended);
        }

        // 4
        if let Some((field, reason)) = &request.malformed {
            return Err(GenerationError::invalid(*field, reason.clone()));
        }

        // 5
        let input_image_id = non_blank(request.input_image_id.as_ref())
            .ok_or(GenerationError::MissingField("inputImageId"))?;

        // 6
        let prompt = non_blank(request.prompt.as_ref());
        let style_id = non_blank(request.hair_style_id.as_ref());
        match (prompt, style_id, workflow) {
            (None, None, Workflow::Standard) => {
                return Err(GenerationError::MissingField("prompt or hairStyleId"));
            }
            (_, None, Workflow::StyleTransfer) => {
                return Err(GenerationError::MissingField("hairStyleId"));
            }
            (Some(_), Some(_), _) => {
                return Err(GenerationError::invalid(
                    "prompt",
                    "provide either prompt or hairStyleId, not both",
                ));
            }
            _ => {}
        }

        let image_id: ImageId = input_image_id
            .parse()
            .map_err(|_| GenerationError::invalid("inputImageId", "must be a UUID"))?;
        let style_id: Option<StyleId> = style_id
            .map(str::parse::<StyleId>)
            .transpose()
            .map_err(|_| GenerationError::invalid("hairStyleId", "must be a UUID"))?;
        let variations = parse_variations(request.variations)?;

        // 7
        let image = self
            .images
            .get_by_id(image_id)
            .await?
            .ok_or(GenerationError::ImageNotFound)?;
        if !image.is_owned_by(tenant.id) {
            return Err(GenerationError::ImageForbidden);
        }

        // 8
        let style = match style_id {
            Some(id) => Some(
                tenant
                    .style(id)
                    .cloned()
                    .ok_or(GenerationError::StyleNotFound)?,
            ),
            None => None,
        };

        // 9
        if workflow == Workflow::StyleTransfer && !tenant.category.supports_style_transfer() {
            return Err(GenerationError::UnsupportedOperation(
                "Style transfer is only available for hair salons".to_string(),
            ));
        }

        let kind = if style.is_some() {
            GenerationKind::StyleReference
        } else {
            GenerationKind::Prompt
        };

        Ok(ValidatedRequest {
            tenant,
            image,
            prompt: prompt.map(str::to_string),
            style,
            variations,
            kind,
        })
    }
}

fn parse_variations(value: Option<i64>) -> Result<u32, GenerationError> {
    let Some(value) = value else {
        return Ok(1);
    };
    u32::try_from(value)
        .ok()
        .filter(|v| (1..=MAX_VARIATIONS).contains(v))
        .ok_or_else(|| {
            GenerationError::invalid(
                "variations",
                format!("must be between 1 and {MAX_VARIATIONS}"),
            )
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use style_preview_core::{
        SalonCategory, ServedAudience, Slug, TenantId, TenantStatus, UserId,
    };

    use super::*;
    use crate::models::{NewImage, NewStyleEntry, NewTenant, TenantUpdate};
    use crate::store::MemoryStore;

    struct Fixture {
        store: MemoryStore,
        validator: RequestValidator,
        tenant: Tenant,
        image: UploadedImage,
        style: StyleLibraryEntry,
    }

    impl Fixture {
        async fn new(category: SalonCategory) -> Self {
            let store = MemoryStore::new();
            let tenant = TenantStore::create(
                &store,
                NewTenant {
                    name: "Demo".to_string(),
                    slug: Slug::parse("demo").unwrap(),
                    status: TenantStatus::Active,
                    category,
                    audience: ServedAudience::Both,
                    credits: 10,
                },
            )
            .await
            .unwrap();
            let image = ImageStore::create(
                &store,
                NewImage {
                    tenant_id: tenant.id,
                    storage_ref: "data:image/jpeg;base64,AAAA".to_string(),
                },
            )
            .await
            .unwrap();
            let style = store
                .add_style(
                    tenant.id,
                    NewStyleEntry {
                        name: "Pixie".to_string(),
                        image_ref: "https://i.ibb.co/pixie.jpg".to_string(),
                    },
                )
                .await
                .unwrap();
            let validator = RequestValidator::new(Arc::new(store.clone()), Arc::new(store.clone()));
            Self {
                store,
                validator,
                tenant,
                image,
                style,
            }
        }

        fn principal(&self) -> Principal {
            Principal {
                principal_id: UserId::generate(),
                role: UserRole::Salon,
                tenant_id: Some(self.tenant.id),
            }
        }

        fn prompt_request(&self) -> GenerationRequest {
            GenerationRequest {
                input_image_id: Some(self.image.id.to_string()),
                prompt: Some("bob cut".to_string()),
                ..Default::default()
            }
        }

        fn style_request(&self) -> GenerationRequest {
            GenerationRequest {
                input_image_id: Some(self.image.id.to_string()),
                hair_style_id: Some(self.style.id.to_string()),
                ..Default::default()
            }
        }

        async fn check(
            &self,
            request: &GenerationRequest,
            workflow: Workflow,
        ) -> Result<ValidatedRequest, GenerationError> {
            self.validator
                .validate(Some(&self.principal()), request, workflow)
                .await
        }
    }

    #[tokio::test]
    async fn test_valid_prompt_request() {
        let f = Fixture::new(SalonCategory::Barbershop).await;
        let validated = f
            .check(&f.prompt_request(), Workflow::Standard)
            .await
            .unwrap();

        assert_eq!(validated.kind, GenerationKind::Prompt);
        assert_eq!(validated.prompt.as_deref(), Some("bob cut"));
        assert_eq!(validated.variations, 1);
        assert!(validated.style.is_none());
    }

    #[tokio::test]
    async fn test_valid_style_request() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;
        let validated = f
            .check(&f.style_request(), Workflow::StyleTransfer)
            .await
            .unwrap();

        assert_eq!(validated.kind, GenerationKind::StyleReference);
        assert_eq!(validated.style.unwrap().name, "Pixie");
    }

    #[tokio::test]
    async fn test_missing_principal_is_unauthorized() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;
        let result = f
            .validator
            .validate(None, &f.prompt_request(), Workflow::Standard)
            .await;
        assert!(matches!(result, Err(GenerationError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_admin_is_unauthorized() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;
        let admin = Principal {
            principal_id: UserId::generate(),
            role: UserRole::Admin,
            tenant_id: Some(f.tenant.id),
        };
        let result = f
            .validator
            .validate(Some(&admin), &f.prompt_request(), Workflow::Standard)
            .await;
        assert!(matches!(result, Err(GenerationError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_unknown_tenant() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;
        let stray = Principal {
            principal_id: UserId::generate(),
            role: UserRole::Salon,
            tenant_id: Some(TenantId::generate()),
        };
        let result = f
            .validator
            .validate(Some(&stray), &f.prompt_request(), Workflow::Standard)
            .await;
        assert!(matches!(result, Err(GenerationError::TenantNotFound)));
    }

    #[tokio::test]
    async fn test_suspended_tenant_checked_before_fields() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;
        f.store
            .update(
                f.tenant.id,
                TenantUpdate {
                    status: Some(TenantStatus::Suspended),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = f
            .check(&GenerationRequest::default(), Workflow::Standard)
            .await;
        assert!(matches!(result, Err(GenerationError::TenantSuspended)));
    }

    #[tokio::test]
    async fn test_suspended_tenant_checked_before_body_types() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;
        f.store
            .update(
                f.tenant.id,
                TenantUpdate {
                    status: Some(TenantStatus::Suspended),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let bodies: [&[u8]; 3] = [
            br#"{"inputImageId":"x","prompt":"bob","variations":"2"}"#,
            br#"{"prompt":5}"#,
            b"{not json",
        ];
        for body in bodies {
            let request = GenerationRequest::from_json(body);
            assert!(request.malformed.is_some());
            assert!(matches!(
                f.check(&request, Workflow::Standard).await,
                Err(GenerationError::TenantSuspended)
            ));
        }
    }

    #[tokio::test]
    async fn test_wrong_body_types_rejected_for_active_tenant() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;
        let body = format!(
            r#"{{"inputImageId":"{}","prompt":"bob","variations":"2"}}"#,
            f.image.id
        );
        let err = f
            .check(&GenerationRequest::from_json(body.as_bytes()), Workflow::Standard)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidField {
                field: "variations",
                ..
            }
        ));
        assert_eq!(err.kind(), "ValidationError");

        let err = f
            .check(&GenerationRequest::from_json(b"[1, 2]"), Workflow::Standard)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidField { field: "body", .. }));
    }

    #[test]
    fn test_from_json_decodes_fields() {
        let request = GenerationRequest::from_json(
            br#"{"inputImageId":"a","prompt":"bob","hairStyleId":null,"variations":3,"extra":true}"#,
        );
        assert!(request.malformed.is_none());
        assert_eq!(request.input_image_id.as_deref(), Some("a"));
        assert_eq!(request.prompt.as_deref(), Some("bob"));
        assert!(request.hair_style_id.is_none());
        assert_eq!(request.variations, Some(3));

        let empty = GenerationRequest::from_json(b"  \n");
        assert!(empty.malformed.is_none());
        assert!(empty.input_image_id.is_none());
    }

    #[test]
    fn test_from_json_keeps_first_problem() {
        let request = GenerationRequest::from_json(br#"{"prompt":5,"variations":1.5}"#);
        let (field, reason) = request.malformed.unwrap();
        assert_eq!(field, "prompt");
        assert_eq!(reason, "must be a string");

        let request = GenerationRequest::from_json(br#"{"variations":1.5}"#);
        assert_eq!(request.malformed.unwrap().0, "variations");
    }

    #[tokio::test]
    async fn test_missing_and_blank_fields() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;

        let mut request = f.prompt_request();
        request.input_image_id = Some("   ".to_string());
        assert!(matches!(
            f.check(&request, Workflow::Standard).await,
            Err(GenerationError::MissingField("inputImageId"))
        ));

        let mut request = f.prompt_request();
        request.prompt = Some(String::new());
        assert!(matches!(
            f.check(&request, Workflow::Standard).await,
            Err(GenerationError::MissingField(_))
        ));
    }

    #[tokio::test]
    async fn test_prompt_and_style_together_rejected() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;
        let mut request = f.style_request();
        request.prompt = Some("bob cut".to_string());

        assert!(matches!(
            f.check(&request, Workflow::Standard).await,
            Err(GenerationError::InvalidField { field: "prompt", .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_ids_and_variations() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;

        let mut request = f.prompt_request();
        request.input_image_id = Some("img-1".to_string());
        assert!(matches!(
            f.check(&request, Workflow::Standard).await,
            Err(GenerationError::InvalidField {
                field: "inputImageId",
                ..
            })
        ));

        for bad in [0, 5, -1] {
            let mut request = f.prompt_request();
            request.variations = Some(bad);
            assert!(matches!(
                f.check(&request, Workflow::Standard).await,
                Err(GenerationError::InvalidField {
                    field: "variations",
                    ..
                })
            ));
        }

        let mut request = f.prompt_request();
        request.variations = Some(4);
        assert_eq!(
            f.check(&request, Workflow::Standard).await.unwrap().variations,
            4
        );
    }

    #[tokio::test]
    async fn test_unknown_image() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;
        let mut request = f.prompt_request();
        request.input_image_id = Some(ImageId::generate().to_string());

        assert!(matches!(
            f.check(&request, Workflow::Standard).await,
            Err(GenerationError::ImageNotFound)
        ));
    }

    #[tokio::test]
    async fn test_cross_tenant_image_forbidden() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;
        let other = TenantStore::create(
            &f.store,
            NewTenant {
                name: "Other".to_string(),
                slug: Slug::parse("other").unwrap(),
                status: TenantStatus::Active,
                category: SalonCategory::Hairsalon,
                audience: ServedAudience::Both,
                credits: 10,
            },
        )
        .await
        .unwrap();
        let foreign = ImageStore::create(
            &f.store,
            NewImage {
                tenant_id: other.id,
                storage_ref: "data:image/jpeg;base64,BBBB".to_string(),
            },
        )
        .await
        .unwrap();

        let mut request = f.prompt_request();
        request.input_image_id = Some(foreign.id.to_string());
        assert!(matches!(
            f.check(&request, Workflow::Standard).await,
            Err(GenerationError::ImageForbidden)
        ));
    }

    #[tokio::test]
    async fn test_unknown_style() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;
        let mut request = f.style_request();
        request.hair_style_id = Some(StyleId::generate().to_string());

        assert!(matches!(
            f.check(&request, Workflow::Standard).await,
            Err(GenerationError::StyleNotFound)
        ));
    }

    #[tokio::test]
    async fn test_style_transfer_requires_hair_salon() {
        let f = Fixture::new(SalonCategory::Barbershop).await;
        assert!(matches!(
            f.check(&f.style_request(), Workflow::StyleTransfer).await,
            Err(GenerationError::UnsupportedOperation(_))
        ));

        // The standard workflow accepts style references from any category.
        let validated = f
            .check(&f.style_request(), Workflow::Standard)
            .await
            .unwrap();
        assert_eq!(validated.kind, GenerationKind::StyleReference);
    }

    #[tokio::test]
    async fn test_style_transfer_requires_style_id() {
        let f = Fixture::new(SalonCategory::Hairsalon).await;
        assert!(matches!(
            f.check(&f.prompt_request(), Workflow::StyleTransfer).await,
            Err(GenerationError::MissingField("hairStyleId"))
        ));
    }
}
