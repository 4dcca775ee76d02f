use async_trait::async_trait;

use crate::engine::question::AnswerOutcome;
use crate::engine::session::AttemptSummarizer;
use crate::services::deepseek::AiClient;

const SUMMARY_MAX_TOKENS: u32 = 300;

const SUMMARY_SYSTEM_PROMPT: &str = "\
You are an English teacher writing a short progress note about a student's \
completed test. Mention what went well and the most important thing to work \
on. At most four sentences, plain text, addressed to the teacher.";

/// Produces the optional teacher-facing note attached to test attempts.
/// Any failure is swallowed: the attempt is recorded without a summary.
pub(crate) struct AiSummarizer<'a> {
    client: Option<&'a AiClient>,
}

impl<'a> AiSummarizer<'a> {
    pub(crate) fn new(client: Option<&'a AiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AttemptSummarizer for AiSummarizer<'_> {
    async fn summarize(&self, subject_title: &str, answers: &[AnswerOutcome]) -> Option<String> {
        let client = self.client?;

        let correct = answers.iter().filter(|a| a.is_correct).count();
        let mut lines = vec![format!(
            "Test: {subject_title}. Score: {correct}/{}. Answers:",
            answers.len()
        )];
        for outcome in answers {
            lines.push(format!(
                "- Q: {} | student: {} | {}",
                outcome.question.prompt,
                if outcome.selected.is_empty() { "(blank)" } else { &outcome.selected },
                if outcome.is_correct { "correct" } else { "incorrect" },
            ));
        }

        match client.chat(SUMMARY_SYSTEM_PROMPT, &lines.join("\n"), SUMMARY_MAX_TOKENS).await {
            Ok(reply) => {
                let trimmed = reply.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Attempt summary generation failed");
                None
            }
        }
    }
}
