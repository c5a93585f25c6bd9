//! Single-user progress store backed by a JSON file.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use quizcheck_core::model::LessonContext;
use quizcheck_core::traits::ProgressStore;

/// Persisted progress of the local user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalProgress {
    #[serde(default)]
    pub correct_questions: BTreeSet<String>,
    /// Lesson ID to completion time.
    #[serde(default)]
    pub completed_lessons: BTreeMap<String, DateTime<Utc>>,
}

/// Progress store for a single local user.
///
/// The local user is always signed in. With a path, every write is flushed
/// to disk before it returns; without one, progress lives for the process.
pub struct LocalProgressStore {
    path: Option<PathBuf>,
    state: Mutex<LocalProgress>,
}

impl LocalProgressStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(LocalProgress::default()),
        }
    }

    /// Open the store at `path`, loading existing progress if the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read progress: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse progress: {}", path.display()))?
        } else {
            LocalProgress::default()
        };

        Ok(Self {
            path: Some(path),
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn progress(&self) -> LocalProgress {
        self.state.lock().await.clone()
    }

    pub async fn is_lesson_completed(&self, lesson_id: &str) -> bool {
        self.state
            .lock()
            .await
            .completed_lessons
            .contains_key(lesson_id)
    }

    async fn persist(&self, state: &LocalProgress) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(state)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write progress: {}", path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for LocalProgressStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn record_correct_answer(&self, question_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.correct_questions.insert(question_id.to_string()) {
            self.persist(&state).await?;
        }
        tracing::debug!(question_id, "correct answer stored");
        Ok(())
    }

    async fn complete_lesson(&self, lesson: &LessonContext) -> Result<()> {
        let mut state = self.state.lock().await;
        // Upsert: a repeat completion refreshes the timestamp.
        state
            .completed_lessons
            .insert(lesson.lesson_id.clone(), Utc::now());
        self.persist(&state).await?;
        tracing::info!(
            lesson_id = %lesson.lesson_id,
            segment = %lesson.segment_path(),
            "lesson marked complete"
        );
        Ok(())
    }

    async fn completed_question_ids(
        &self,
        question_ids: &[String],
    ) -> Result<Option<HashSet<String>>> {
        let state = self.state.lock().await;
        let completed = question_ids
            .iter()
            .filter(|id| state.correct_questions.contains(id.as_str()))
            .cloned()
            .collect();
        Ok(Some(completed))
    }
}
