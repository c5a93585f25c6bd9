//! PostgREST-style HTTP progress store.
//!
//! Writes are upserts into two tables: `user_progress` (one row per user and
//! correctly answered question) and `lesson_progress` (one row per user and
//! completed lesson).

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizcheck_core::model::LessonContext;
use quizcheck_core::traits::ProgressStore;

use crate::error::ProgressError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP progress store for one (possibly anonymous) user.
pub struct HttpProgressStore {
    base_url: Url,
    api_key: String,
    access_token: Option<String>,
    user_id: Option<String>,
    client: reqwest::Client,
}

impl HttpProgressStore {
    /// An anonymous store; call [`with_user`](Self::with_user) to sign in.
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url)
            .with_context(|| format!("invalid progress base_url: {base_url}"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: parsed,
            api_key: api_key.to_string(),
            access_token: None,
            user_id: None,
            client,
        })
    }

    /// Act on behalf of `user_id`, authenticating with the user's access
    /// token when one is given and with the API key otherwise.
    pub fn with_user(mut self, user_id: impl Into<String>, access_token: Option<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.access_token = access_token;
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn table_url(&self, table: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}/rest/v1/{table}", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.query_pairs_mut().clear().extend_pairs(params);
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {bearer}"))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ProgressError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProgressError::Timeout(DEFAULT_TIMEOUT_SECS)
            } else {
                ProgressError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProgressError::Unauthenticated(error_message(body)));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProgressError::ApiError {
                status,
                message: error_message(body),
            });
        }
        Ok(response)
    }

    async fn upsert<T: Serialize + Sync>(
        &self,
        table: &str,
        on_conflict: &str,
        row: &T,
    ) -> Result<(), ProgressError> {
        let url = self.table_url(table, &[("on_conflict", on_conflict)]);
        let builder = self
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates")
            .json(row);
        self.send(builder).await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct UserProgressRow<'a> {
    user_id: &'a str,
    question_id: &'a str,
    is_correct: bool,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct LessonProgressRow<'a> {
    user_id: &'a str,
    lesson_id: &'a str,
    is_completed: bool,
    completed_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct CompletedRow {
    question_id: String,
}

#[derive(Deserialize)]
struct PostgrestError {
    message: String,
}

fn error_message(body: String) -> String {
    serde_json::from_str::<PostgrestError>(&body)
        .map(|e| e.message)
        .unwrap_or(body)
}

/// Quote a value for a PostgREST `in.(...)` filter.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[async_trait]
impl ProgressStore for HttpProgressStore {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn record_correct_answer(&self, question_id: &str) -> anyhow::Result<()> {
        let Some(user_id) = self.user_id.as_deref() else {
            tracing::debug!("no signed-in user, answer not recorded");
            return Ok(());
        };

        let row = UserProgressRow {
            user_id,
            question_id,
            is_correct: true,
            created_at: Utc::now(),
        };
        self.upsert("user_progress", "user_id,question_id", &row).await?;
        tracing::debug!("correct answer stored");
        Ok(())
    }

    #[instrument(skip(self, lesson), fields(lesson_id = %lesson.lesson_id))]
    async fn complete_lesson(&self, lesson: &LessonContext) -> anyhow::Result<()> {
        let Some(user_id) = self.user_id.as_deref() else {
            tracing::warn!("no signed-in user, lesson not marked complete");
            return Ok(());
        };

        let row = LessonProgressRow {
            user_id,
            lesson_id: &lesson.lesson_id,
            is_completed: true,
            completed_at: Utc::now(),
        };
        self.upsert("lesson_progress", "user_id,lesson_id", &row).await?;
        tracing::info!(segment = %lesson.segment_path(), "lesson marked complete");
        Ok(())
    }

    #[instrument(skip(self, question_ids), fields(count = question_ids.len()))]
    async fn completed_question_ids(
        &self,
        question_ids: &[String],
    ) -> anyhow::Result<Option<HashSet<String>>> {
        let Some(user_id) = self.user_id.as_deref() else {
            return Ok(None);
        };
        if question_ids.is_empty() {
            return Ok(Some(HashSet::new()));
        }

        let user_filter = format!("eq.{user_id}");
        let id_filter = format!(
            "in.({})",
            question_ids
                .iter()
                .map(|id| quote(id))
                .collect::<Vec<_>>()
                .join(",")
        );
        let url = self.table_url(
            "user_progress",
            &[
                ("select", "question_id"),
                ("user_id", user_filter.as_str()),
                ("is_correct", "eq.true"),
                ("question_id", id_filter.as_str()),
            ],
        );

        let response = self.send(self.request(Method::GET, url)).await?;
        let rows: Vec<CompletedRow> =
            response.json().await.map_err(|e| ProgressError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        Ok(Some(rows.into_iter().map(|r| r.question_id).collect()))
    }
}
