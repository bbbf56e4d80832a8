//! Per-query pipeline state with validated stage transitions.
//!
//! A [`PipelineState`] is created for each query and moves through
//! `Created -> Retrieved -> Answered`. The direct `Created -> Answered`
//! transition is only allowed once a retrieval failure has been recorded.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::document::{QueryResult, RetrievedDocument};
use crate::error::{RagError, Result};

/// Step label appended after a successful retrieval.
pub const STEP_RETRIEVED: &str = "Retrieved documents";
/// Step label appended after answer generation.
pub const STEP_ANSWERED: &str = "Generated final answer";

/// The stage a query has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Created,
    Retrieved,
    Answered,
}

impl WorkflowStage {
    /// Whether the workflow has finished.
    pub fn is_terminal(self) -> bool {
        self == Self::Answered
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Retrieved => "retrieved",
            Self::Answered => "answered",
        };
        f.write_str(name)
    }
}

/// Validate that a stage transition is allowed.
///
/// Valid transitions:
/// - Created -> Retrieved
/// - Retrieved -> Answered
/// - Created -> Answered, only when `failed` is set
pub fn validate_transition(from: WorkflowStage, to: WorkflowStage, failed: bool) -> Result<()> {
    let valid = matches!(
        (from, to),
        (WorkflowStage::Created, WorkflowStage::Retrieved)
            | (WorkflowStage::Retrieved, WorkflowStage::Answered)
    ) || (failed && from == WorkflowStage::Created && to == WorkflowStage::Answered);

    if valid { Ok(()) } else { Err(RagError::InvalidTransition { from, to }) }
}

/// The working record threaded through the retrieve and answer steps.
///
/// The query is fixed at construction. Other fields are written only by the
/// steps, through methods that enforce the stage order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineState {
    query: String,
    stage: WorkflowStage,
    retrieved_docs: Vec<RetrievedDocument>,
    final_answer: String,
    processing_steps: Vec<String>,
    error: Option<String>,
}

impl PipelineState {
    /// Create a fresh state for `query`.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            stage: WorkflowStage::Created,
            retrieved_docs: Vec::new(),
            final_answer: String::new(),
            processing_steps: Vec::new(),
            error: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn stage(&self) -> WorkflowStage {
        self.stage
    }

    pub fn retrieved_docs(&self) -> &[RetrievedDocument] {
        &self.retrieved_docs
    }

    pub fn final_answer(&self) -> &str {
        &self.final_answer
    }

    /// Names of the steps that have completed, in order.
    pub fn processing_steps(&self) -> &[String] {
        &self.processing_steps
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn advance(&mut self, to: WorkflowStage) -> Result<()> {
        validate_transition(self.stage, to, self.error.is_some())?;
        self.stage = to;
        Ok(())
    }

    pub(crate) fn record_retrieval(&mut self, docs: Vec<RetrievedDocument>) -> Result<()> {
        self.advance(WorkflowStage::Retrieved)?;
        self.retrieved_docs = docs;
        self.processing_steps.push(STEP_RETRIEVED.to_string());
        Ok(())
    }

    pub(crate) fn record_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub(crate) fn record_answer(&mut self, answer: String) -> Result<()> {
        self.advance(WorkflowStage::Answered)?;
        self.final_answer = answer;
        self.processing_steps.push(STEP_ANSWERED.to_string());
        Ok(())
    }

    /// Project a finished state into a [`QueryResult`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidTransition`] if the state has not reached
    /// [`WorkflowStage::Answered`].
    pub fn into_result(self, processing_time: Duration) -> Result<QueryResult> {
        if !self.stage.is_terminal() {
            return Err(RagError::InvalidTransition {
                from: self.stage,
                to: WorkflowStage::Answered,
            });
        }
        Ok(QueryResult {
            query: self.query,
            documents: self.retrieved_docs,
            answer: self.final_answer,
            processing_time: processing_time.as_secs_f64(),
        })
    }
}
