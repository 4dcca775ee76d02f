use std::collections::HashMap;

use crate::services::deepseek::AiClient;

const ANALYSIS_MAX_TOKENS: u32 = 800;

const ANALYSIS_SYSTEM_PROMPT: &str = "\
You are an English teacher reviewing a text a student uploaded for study. \
Summarize what the text is about, point out vocabulary worth learning, and \
note any recurring grammar patterns. Keep it under 200 words, plain text.";

/// Texts are clipped before they hit the chat API; anything longer adds cost
/// without changing the analysis.
const MAX_ANALYSIS_CHARS: usize = 6_000;

#[derive(Debug, Clone)]
pub(crate) struct TextAnalysis {
    pub(crate) summary: String,
    pub(crate) word_count: usize,
    pub(crate) ai_generated: bool,
}

/// Analyze an uploaded text: AI commentary when available, a local frequency
/// digest otherwise.
pub(crate) async fn analyze_text(client: Option<&AiClient>, text: &str) -> TextAnalysis {
    let word_count = text.split_whitespace().count();

    if let Some(client) = client {
        let clipped: String = text.chars().take(MAX_ANALYSIS_CHARS).collect();
        match client.chat(ANALYSIS_SYSTEM_PROMPT, &clipped, ANALYSIS_MAX_TOKENS).await {
            Ok(reply) if !reply.trim().is_empty() => {
                return TextAnalysis {
                    summary: reply.trim().to_string(),
                    word_count,
                    ai_generated: true,
                };
            }
            Ok(_) => tracing::warn!("Text analysis reply was empty"),
            Err(err) => tracing::warn!(error = %err, "Text analysis failed, using local digest"),
        }
    }

    TextAnalysis { summary: local_digest(text, word_count), word_count, ai_generated: false }
}

fn local_digest(text: &str, word_count: usize) -> String {
    let mut frequencies: HashMap<String, usize> = HashMap::new();
    for word in text.split_whitespace() {
        let cleaned: String =
            word.chars().filter(|c| c.is_alphabetic()).collect::<String>().to_lowercase();
        // Short function words dominate any frequency list; skip them.
        if cleaned.len() >= 5 {
            *frequencies.entry(cleaned).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let top: Vec<String> = ranked.into_iter().take(10).map(|(word, _)| word).collect();

    if top.is_empty() {
        format!("The text contains {word_count} words.")
    } else {
        format!(
            "The text contains {word_count} words. Frequent vocabulary: {}.",
            top.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_client_produces_local_digest() {
        let text = "Serene mornings bring serene thoughts. Serene places matter.";
        let analysis = analyze_text(None, text).await;

        assert!(!analysis.ai_generated);
        assert_eq!(analysis.word_count, 8);
        assert!(analysis.summary.contains("serene"), "summary: {}", analysis.summary);
    }

    #[tokio::test]
    async fn digest_handles_text_with_no_long_words() {
        let analysis = analyze_text(None, "a b c d").await;
        assert_eq!(analysis.summary, "The text contains 4 words.");
    }
}
