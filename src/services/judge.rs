use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::engine::evaluator::{TextJudge, Verdict};
use crate::services::deepseek::{extract_json, AiClient};

const JUDGE_MAX_TOKENS: u32 = 400;

const JUDGE_SYSTEM_PROMPT: &str = "\
You are an English teacher reviewing a student's translation. Judge whether \
the student's answer conveys the same meaning as the reference in natural \
English. Minor wording differences are fine; meaning errors are not.\n\
Respond with strict JSON only:\n\
{\"is_correct\": true|false, \"feedback\": \"one short sentence for the student\", \
\"explanation\": \"one short sentence on why\"}";

/// Semantic free-text judge backed by the chat API.
pub(crate) struct AiJudge<'a> {
    client: &'a AiClient,
}

impl<'a> AiJudge<'a> {
    pub(crate) fn new(client: &'a AiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextJudge for AiJudge<'_> {
    async fn judge(&self, prompt: &str, reference: &str, submission: &str) -> Result<Verdict> {
        let user_prompt = format!(
            "Task: {prompt}\nReference answer: {reference}\nStudent answer: {submission}"
        );

        let reply = self.client.chat(JUDGE_SYSTEM_PROMPT, &user_prompt, JUDGE_MAX_TOKENS).await?;
        let value = extract_json(&reply).context("Judge reply contained no JSON verdict")?;

        let is_correct =
            value.get("is_correct").and_then(|v| v.as_bool()).context("Verdict missing is_correct")?;
        let feedback =
            value.get("feedback").and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let explanation =
            value.get("explanation").and_then(|v| v.as_str()).unwrap_or_default().to_string();

        Ok(Verdict { is_correct, feedback, explanation })
    }
}

/// Judge used when no AI client is configured; always fails so the
/// evaluator's deterministic fallback takes over.
pub(crate) struct OfflineJudge;

#[async_trait]
impl TextJudge for OfflineJudge {
    async fn judge(&self, _: &str, _: &str, _: &str) -> Result<Verdict> {
        anyhow::bail!("no AI judge configured")
    }
}
