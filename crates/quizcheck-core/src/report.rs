//! Session report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::QuestionStatus;
use crate::session::QuizSession;
use crate::statistics::QuizStats;
use crate::traits::ExpressionEngine;

/// Outcome of one quiz session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// The session the report was taken from.
    pub session_id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub lesson_id: String,
    /// Expression engine used to grade open questions.
    pub engine: String,
    /// Per-question status, in quiz order.
    pub results: Vec<QuestionResult>,
    pub stats: QuizStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: String,
    pub status: QuestionStatus,
}

impl QuizReport {
    /// Snapshot the current state of a session.
    pub fn from_session<E: ExpressionEngine>(session: &QuizSession<E>) -> Self {
        let results = session
            .questions()
            .iter()
            .zip(session.history())
            .map(|(q, status)| QuestionResult {
                question_id: q.id.clone(),
                status: *status,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            session_id: session.id(),
            created_at: Utc::now(),
            lesson_id: session.lesson().lesson_id.clone(),
            engine: session.grader().engine().name().to_string(),
            results,
            stats: session.stats(),
        }
    }

    /// Default file name inside an output directory.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.json",
            self.lesson_id,
            self.created_at.format("%Y%m%dT%H%M%S")
        )
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: QuizReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
