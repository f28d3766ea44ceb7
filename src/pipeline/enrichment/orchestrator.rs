//! Enrichment state machine.
//!
//! ```text
//! Start → DoorPromptBuilt → DoorCompletionReceived → DoorJsonExtracted
//!       → ValidationPromptBuilt → ValidationCompletionReceived → Done
//! ```
//!
//! Each step consumes the previous step's output, so the run is strictly
//! sequential. Any error ends the run; the failure records the last stage
//! reached. Nothing is retried.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use super::parser::extract_json;
use super::prompt::{build_door_completion_prompt, build_validation_prompt};
use super::types::{CompletionRequest, LlmClient};
use super::EnrichmentError;
use crate::models::{PlanDocument, ValidationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    DoorPromptBuilt,
    DoorCompletionReceived,
    DoorJsonExtracted,
    ValidationPromptBuilt,
    ValidationCompletionReceived,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::DoorPromptBuilt => "door_prompt_built",
            Self::DoorCompletionReceived => "door_completion_received",
            Self::DoorJsonExtracted => "door_json_extracted",
            Self::ValidationPromptBuilt => "validation_prompt_built",
            Self::ValidationCompletionReceived => "validation_completion_received",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Terminal `Failed` state: the error plus the stage the run had reached.
#[derive(Error, Debug)]
#[error("enrichment failed after {stage}: {source}")]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    #[source]
    pub source: EnrichmentError,
}

pub struct EnrichmentPipeline<'a, C: LlmClient> {
    client: &'a C,
    model: &'a str,
}

impl<'a, C: LlmClient> EnrichmentPipeline<'a, C> {
    pub fn new(client: &'a C, model: &'a str) -> Self {
        Self { client, model }
    }

    /// Full run: door completion, then validation of the completed plan.
    pub async fn run(&self, plan: &PlanDocument) -> Result<ValidationReport, PipelineFailure> {
        let mut stage = PipelineStage::Start;
        let result = self.drive(plan, &mut stage).await;
        match &result {
            Ok(report) => tracing::info!(
                valid = report.valid(),
                issues = report.issue_count(),
                suggestions = report.suggestions().len(),
                "Enrichment complete"
            ),
            Err(e) => tracing::warn!(stage = %e.stage, error = %e.source, "Enrichment failed"),
        }
        result
    }

    /// Stage 1 only: the door-completed plan.
    pub async fn complete_doors(&self, plan: &PlanDocument) -> Result<PlanDocument, PipelineFailure> {
        let mut stage = PipelineStage::Start;
        let result = self.door_stage(plan, &mut stage).await;
        if let Err(e) = &result {
            tracing::warn!(stage = %e.stage, error = %e.source, "Door completion failed");
        }
        result
    }

    async fn drive(
        &self,
        plan: &PlanDocument,
        stage: &mut PipelineStage,
    ) -> Result<ValidationReport, PipelineFailure> {
        let door_plan = self.door_stage(plan, stage).await?;

        let prompt = build_validation_prompt(&door_plan).map_err(|e| fail(*stage, e))?;
        advance(stage, PipelineStage::ValidationPromptBuilt);

        let text = self
            .client
            .complete(&CompletionRequest::structured(self.model, prompt))
            .await
            .map_err(|e| fail(*stage, e))?;
        advance(stage, PipelineStage::ValidationCompletionReceived);

        let object = extract_json(&text).map_err(|e| fail(*stage, e))?;
        let report = ValidationReport::from_value(Value::Object(object))
            .map_err(|e| fail(*stage, EnrichmentError::UnexpectedShape(e.to_string())))?;
        if !report.is_consistent() {
            tracing::warn!(
                valid = report.valid(),
                issues = report.issue_count(),
                "Validation verdict disagrees with its issue list"
            );
        }
        advance(stage, PipelineStage::Done);
        Ok(report)
    }

    async fn door_stage(
        &self,
        plan: &PlanDocument,
        stage: &mut PipelineStage,
    ) -> Result<PlanDocument, PipelineFailure> {
        let prompt = build_door_completion_prompt(plan).map_err(|e| fail(*stage, e))?;
        advance(stage, PipelineStage::DoorPromptBuilt);

        let text = self
            .client
            .complete(&CompletionRequest::structured(self.model, prompt))
            .await
            .map_err(|e| fail(*stage, e))?;
        advance(stage, PipelineStage::DoorCompletionReceived);

        let object = extract_json(&text).map_err(|e| fail(*stage, e))?;
        let door_plan = PlanDocument::from_value(Value::Object(object))
            .map_err(|e| fail(*stage, EnrichmentError::UnexpectedShape(e.to_string())))?;
        advance(stage, PipelineStage::DoorJsonExtracted);

        tracing::debug!(
            doors_before = plan.doors.len(),
            doors_after = door_plan.doors.len(),
            load_bearing = door_plan.load_bearing_walls.as_ref().map_or(0, Vec::len),
            "Door completion extracted"
        );
        Ok(door_plan)
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    tracing::debug!(from = %stage, to = %next, "Enrichment stage");
    *stage = next;
}

fn fail(stage: PipelineStage, source: EnrichmentError) -> PipelineFailure {
    PipelineFailure { stage, source }
}
