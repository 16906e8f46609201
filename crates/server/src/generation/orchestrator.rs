//! Sequencing of one paid generation.
//!
//! ```text
//! Validating -> CostLookup -> Deducting -> Generating -> Persisting -> Done
//! ```
//!
//! Any stage may fail terminally. Nothing is charged before `Deducting`
//! succeeds, and a record is written only after the backend returned.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{Span, debug, error, field, info, instrument, warn};

use super::GenerationError;
use super::validator::{GenerationRequest, RequestValidator, ValidatedRequest, Workflow};
use crate::models::{GenerationRecord, NewGeneration, Principal};
use crate::provider::{Provider, ProviderRequest};
use crate::services::ledger::CreditLedger;
use crate::store::GenerationStore;

/// Workflow stage, recorded on the tracing span as it advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    CostLookup,
    Deducting,
    Generating,
    Persisting,
    Done,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::CostLookup => "cost_lookup",
            Self::Deducting => "deducting",
            Self::Generating => "generating",
            Self::Persisting => "persisting",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credits charged and left after a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreditSummary {
    pub used: i32,
    pub remaining: i32,
}

/// A completed generation.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub generation: GenerationRecord,
    pub credits: CreditSummary,
    /// Name of the style-library entry used, if any.
    pub style_name: Option<String>,
}

/// Runs generations end to end.
#[derive(Clone)]
pub struct Orchestrator {
    validator: RequestValidator,
    ledger: CreditLedger,
    provider: Provider,
    generations: Arc<dyn GenerationStore>,
    refund_on_failure: bool,
}

fn enter(stage: Stage) {
    Span::current().record("stage", stage.as_str());
    debug!(%stage, "Generation stage");
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        validator: RequestValidator,
        ledger: CreditLedger,
        provider: Provider,
        generations: Arc<dyn GenerationStore>,
        refund_on_failure: bool,
    ) -> Self {
        Self {
            validator,
            ledger,
            provider,
            generations,
            refund_on_failure,
        }
    }

    #[must_use]
    pub const fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Validate, charge, generate and record.
    ///
    /// # Errors
    ///
    /// Returns the [`GenerationError`] of the stage that failed.
    #[instrument(
        skip_all,
        fields(
            workflow = ?workflow,
            provider = self.provider.name(),
            stage = field::Empty,
            tenant_id = field::Empty,
        )
    )]
    pub async fn run(
        &self,
        principal: Option<&Principal>,
        request: &GenerationRequest,
        workflow: Workflow,
    ) -> Result<GenerationOutcome, GenerationError> {
        enter(Stage::Validating);
        let validated = self.validator.validate(principal, request, workflow).await?;
        Span::current().record("tenant_id", field::display(validated.tenant.id));

        enter(Stage::CostLookup);
        let cost = validated.kind.credit_cost();

        enter(Stage::Deducting);
        let remaining = self.ledger.deduct(validated.tenant.id, cost).await?;

        match self.generate_and_record(&validated, cost).await {
            Ok(generation) => {
                enter(Stage::Done);
                info!(
                    generation_id = %generation.id,
                    cost,
                    remaining,
                    "Generation completed"
                );
                Ok(GenerationOutcome {
                    generation,
                    credits: CreditSummary {
                        used: cost,
                        remaining,
                    },
                    style_name: validated.style.map(|style| style.name),
                })
            }
            Err(err) => {
                self.after_paid_failure(&validated, cost, &err).await;
                Err(err)
            }
        }
    }

    async fn generate_and_record(
        &self,
        validated: &ValidatedRequest,
        cost: i32,
    ) -> Result<GenerationRecord, GenerationError> {
        enter(Stage::Generating);
        let output = self
            .provider
            .generate(&ProviderRequest {
                photo_ref: validated.image.storage_ref.clone(),
                prompt: validated.prompt.clone(),
                style_ref: validated.style.as_ref().map(|s| s.image_ref.clone()),
                variations: validated.variations,
                kind: validated.kind,
            })
            .await?;

        enter(Stage::Persisting);
        self.generations
            .create(NewGeneration {
                tenant_id: validated.tenant.id,
                input_image_id: validated.image.id,
                output_ref: output.output_ref,
                prompt: validated.prompt.clone(),
                style_id: validated.style.as_ref().map(|s| s.id),
                kind: output.kind,
                variations: i32::try_from(validated.variations).unwrap_or(1),
                processing_ms: output.duration_ms,
                credit_cost: cost,
            })
            .await
            .map_err(GenerationError::Persistence)
    }

    /// Credits were taken but no record exists.
    async fn after_paid_failure(&self, validated: &ValidatedRequest, cost: i32, err: &GenerationError) {
        let tenant_id = validated.tenant.id;
        if !self.refund_on_failure {
            warn!(%tenant_id, cost, error = %err, "Generation failed after charge; credits kept");
            return;
        }
        match self.ledger.refund(tenant_id, cost).await {
            Ok(balance) => info!(%tenant_id, cost, balance, "Refunded failed generation"),
            Err(refund_err) => error!(
                %tenant_id,
                cost,
                error = %refund_err,
                "Failed to refund credits after generation failure"
            ),
        }
    }
}
