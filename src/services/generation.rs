use serde_json::Value;

use crate::db::types::{AnswerType, Category};
use crate::services::deepseek::{extract_json, AiClient};

const GENERATION_MAX_TOKENS: u32 = 2000;

const GENERATION_SYSTEM_PROMPT: &str = "\
You write questions for an English-learning app. Produce exactly the number \
of questions requested, as a strict JSON array with no other text.\n\
For multiple-choice questions each item is:\n\
{\"prompt\": \"...\", \"correct_answer\": \"...\", \"wrong1\": \"...\", \"wrong2\": \"...\", \"wrong3\": \"...\"}\n\
For translation questions each item is:\n\
{\"prompt\": \"Translate: ...\", \"reference_answer\": \"...\"}";

#[derive(Debug, Clone)]
pub(crate) struct GeneratedQuestion {
    pub(crate) prompt: String,
    pub(crate) answer_type: AnswerType,
    pub(crate) correct_answer: Option<String>,
    pub(crate) wrong1: Option<String>,
    pub(crate) wrong2: Option<String>,
    pub(crate) wrong3: Option<String>,
    pub(crate) reference_answer: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GenerationSource {
    Ai,
    Fallback,
}

impl GenerationSource {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug)]
pub(crate) struct GenerationOutcome {
    pub(crate) questions: Vec<GeneratedQuestion>,
    pub(crate) source: GenerationSource,
}

/// Generate `count` exam questions for a category, optionally themed by a
/// teacher-supplied topic. Falls back to a built-in set whenever the AI is
/// unconfigured, unreachable, or returns an unusable payload.
pub(crate) async fn generate_questions(
    client: Option<&AiClient>,
    category: Category,
    topic: Option<&str>,
    count: usize,
) -> GenerationOutcome {
    if let Some(client) = client {
        let kind = match category.answer_type() {
            AnswerType::MultipleChoice => "multiple-choice",
            AnswerType::FreeText => "translation",
        };
        let topic_line = topic
            .filter(|value| !value.trim().is_empty())
            .map(|value| format!(" on the topic \"{}\"", value.trim()))
            .unwrap_or_default();
        let user_prompt = format!(
            "Write {count} {kind} questions for the {} category{topic_line}.",
            category.label()
        );

        match client.chat(GENERATION_SYSTEM_PROMPT, &user_prompt, GENERATION_MAX_TOKENS).await {
            Ok(reply) => {
                if let Some(value) = extract_json(&reply) {
                    let questions = parse_generated(&value, category);
                    if !questions.is_empty() {
                        let mut questions = questions;
                        questions.truncate(count);
                        return GenerationOutcome { questions, source: GenerationSource::Ai };
                    }
                }
                tracing::warn!(category = category.as_str(), "AI generation reply was unusable");
            }
            Err(err) => {
                tracing::warn!(error = %err, category = category.as_str(), "AI generation failed");
            }
        }
    }

    GenerationOutcome { questions: fallback_questions(category, count), source: GenerationSource::Fallback }
}

fn parse_generated(value: &Value, category: Category) -> Vec<GeneratedQuestion> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let prompt = non_empty(item.get("prompt"))?;
            match category.answer_type() {
                AnswerType::MultipleChoice => {
                    let correct = non_empty(item.get("correct_answer"))?;
                    Some(GeneratedQuestion {
                        prompt,
                        answer_type: AnswerType::MultipleChoice,
                        correct_answer: Some(correct),
                        wrong1: non_empty(item.get("wrong1")),
                        wrong2: non_empty(item.get("wrong2")),
                        wrong3: non_empty(item.get("wrong3")),
                        reference_answer: None,
                    })
                }
                AnswerType::FreeText => {
                    let reference = non_empty(item.get("reference_answer"))?;
                    Some(GeneratedQuestion {
                        prompt,
                        answer_type: AnswerType::FreeText,
                        correct_answer: None,
                        wrong1: None,
                        wrong2: None,
                        wrong3: None,
                        reference_answer: Some(reference),
                    })
                }
            }
        })
        .collect()
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn fallback_questions(category: Category, count: usize) -> Vec<GeneratedQuestion> {
    let seed: Vec<GeneratedQuestion> = match category {
        Category::Vocabulary => vec![
            mcq("Select the correct meaning for the word 'reluctant'.", "unwilling", "cheerful", "rapid", "careless"),
            mcq("Select the correct meaning for the word 'abundant'.", "plentiful", "scarce", "fragile", "distant"),
            mcq("Select the correct meaning for the word 'candid'.", "honest and direct", "secretive", "sweet", "exhausted"),
            mcq("Select the correct meaning for the word 'diligent'.", "hardworking", "lazy", "famous", "quiet"),
            mcq("Select the correct meaning for the word 'vivid'.", "bright and clear", "dull", "hidden", "ancient"),
        ],
        Category::Grammar => vec![
            mcq("She ____ to the gym every morning before work.", "goes", "go", "going", "gone"),
            mcq("If I ____ more time, I would learn another language.", "had", "have", "has", "having"),
            mcq("The report ____ by the committee last week.", "was reviewed", "reviewed", "is reviewing", "reviews"),
            mcq("By next June, they ____ here for ten years.", "will have lived", "live", "are living", "lived"),
            mcq("I wish you ____ earlier about the change of plans.", "had told me", "tell me", "have told me", "telling me"),
        ],
        Category::Translation => vec![
            translation("Translate: Я учу английский каждый день.", "I study English every day."),
            translation("Translate: Мы встретимся завтра после работы.", "We will meet tomorrow after work."),
            translation("Translate: Она уже прочитала эту книгу.", "She has already read this book."),
            translation("Translate: Мне нравится гулять в парке по выходным.", "I like walking in the park on weekends."),
            translation("Translate: Он задал очень интересный вопрос.", "He asked a very interesting question."),
        ],
    };

    seed.into_iter().cycle().take(count).collect()
}

fn mcq(prompt: &str, correct: &str, w1: &str, w2: &str, w3: &str) -> GeneratedQuestion {
    GeneratedQuestion {
        prompt: prompt.to_string(),
        answer_type: AnswerType::MultipleChoice,
        correct_answer: Some(correct.to_string()),
        wrong1: Some(w1.to_string()),
        wrong2: Some(w2.to_string()),
        wrong3: Some(w3.to_string()),
        reference_answer: None,
    }
}

fn translation(prompt: &str, reference: &str) -> GeneratedQuestion {
    GeneratedQuestion {
        prompt: prompt.to_string(),
        answer_type: AnswerType::FreeText,
        correct_answer: None,
        wrong1: None,
        wrong2: None,
        wrong3: None,
        reference_answer: Some(reference.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_generated_accepts_valid_mcq_items() {
        let value = json!([
            {"prompt": "Pick one.", "correct_answer": "a", "wrong1": "b", "wrong2": "c", "wrong3": "d"},
            {"prompt": "", "correct_answer": "x"},
            {"correct_answer": "orphan"}
        ]);
        let parsed = parse_generated(&value, Category::Vocabulary);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].correct_answer.as_deref(), Some("a"));
    }

    #[test]
    fn parse_generated_requires_reference_for_translation() {
        let value = json!([
            {"prompt": "Translate: x", "reference_answer": "y"},
            {"prompt": "Translate: z"}
        ]);
        let parsed = parse_generated(&value, Category::Translation);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].answer_type, AnswerType::FreeText);
    }

    #[tokio::test]
    async fn missing_client_uses_fallback_set() {
        let outcome = generate_questions(None, Category::Grammar, None, 7).await;
        assert_eq!(outcome.source, GenerationSource::Fallback);
        assert_eq!(outcome.questions.len(), 7);
        assert!(outcome.questions.iter().all(|q| q.correct_answer.is_some()));
    }
}
