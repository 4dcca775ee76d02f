use rand::seq::SliceRandom;

use crate::db::models::ExamQuestion;
use crate::db::types::AnswerType;
use crate::engine::question::{Question, QuestionMeta, QuestionSource, RawQuestion};

/// Visible placeholder substituted for the stored `__` blank marker in
/// grammar sentences.
const BLANK_PLACEHOLDER: &str = "____";

/// Normalize a raw stored record into the uniform session view, shuffling
/// MCQ options with a fresh random permutation.
pub(crate) fn normalize(raw: &RawQuestion) -> Question {
    normalize_with(raw, |options| options.shuffle(&mut rand::thread_rng()))
}

/// Same as [`normalize`] but with an injected permutation, so tests can pin
/// the on-screen option order.
pub(crate) fn normalize_with<F>(raw: &RawQuestion, shuffle: F) -> Question
where
    F: FnOnce(&mut Vec<String>),
{
    match raw {
        RawQuestion::Vocabulary(row) => {
            let mut options =
                build_options(&row.correct_answer, [row.wrong1.as_str(), row.wrong2.as_str(), row.wrong3.as_str()]);
            shuffle(&mut options);
            Question {
                id: row.id.clone(),
                prompt: format!("Select the correct meaning for the word '{}'.", row.word),
                answer_type: AnswerType::MultipleChoice,
                correct_answer: row.correct_answer.clone(),
                options,
                meta: QuestionMeta { word: Some(row.word.clone()), ..QuestionMeta::default() },
            }
        }
        RawQuestion::Grammar(row) => {
            let mut options =
                build_options(&row.correct_answer, [row.wrong1.as_str(), row.wrong2.as_str(), row.wrong3.as_str()]);
            shuffle(&mut options);
            let sentence = row.sentence_with_placeholder.replace("__", BLANK_PLACEHOLDER);
            Question {
                id: row.id.clone(),
                prompt: sentence.clone(),
                answer_type: AnswerType::MultipleChoice,
                correct_answer: row.correct_answer.clone(),
                options,
                meta: QuestionMeta { sentence: Some(sentence), ..QuestionMeta::default() },
            }
        }
        RawQuestion::Translation(row) => Question {
            id: row.id.clone(),
            prompt: row.prompt.clone(),
            answer_type: AnswerType::FreeText,
            correct_answer: row.reference_answer.clone(),
            options: Vec::new(),
            meta: QuestionMeta {
                reference_hint: Some(row.reference_answer.clone()),
                ..QuestionMeta::default()
            },
        },
        RawQuestion::ExamSpecific(row) => normalize_exam_question(row, shuffle),
    }
}

fn normalize_exam_question<F>(row: &ExamQuestion, shuffle: F) -> Question
where
    F: FnOnce(&mut Vec<String>),
{
    let correct = row
        .correct_answer
        .clone()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| row.reference_answer.clone())
        .unwrap_or_default();

    match row.answer_type {
        AnswerType::MultipleChoice => {
            let wrongs = [
                row.wrong1.as_deref().unwrap_or(""),
                row.wrong2.as_deref().unwrap_or(""),
                row.wrong3.as_deref().unwrap_or(""),
            ];
            let mut options = build_options(&correct, wrongs);
            shuffle(&mut options);
            Question {
                id: format!("exam-{}", row.id),
                prompt: row.prompt.clone(),
                answer_type: AnswerType::MultipleChoice,
                correct_answer: correct,
                options,
                meta: QuestionMeta { source: QuestionSource::Exam, ..QuestionMeta::default() },
            }
        }
        AnswerType::FreeText => Question {
            id: format!("exam-{}", row.id),
            prompt: row.prompt.clone(),
            answer_type: AnswerType::FreeText,
            correct_answer: correct,
            options: Vec::new(),
            meta: QuestionMeta {
                source: QuestionSource::Exam,
                reference_hint: row.reference_answer.clone(),
                ..QuestionMeta::default()
            },
        },
    }
}

/// Build the MCQ option list: correct answer plus the non-empty wrong slots,
/// deduplicated while keeping first occurrence.
fn build_options<'a>(correct: &str, wrongs: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut options = vec![correct.to_string()];
    for wrong in wrongs {
        let wrong = wrong.trim();
        if !wrong.is_empty() && !options.iter().any(|existing| existing == wrong) {
            options.push(wrong.to_string());
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::db::models::{GrammarRow, TranslationRow, VocabularyRow};
    use crate::db::types::Category;

    fn vocabulary_row() -> VocabularyRow {
        VocabularyRow {
            id: "q-1".to_string(),
            word: "serene".to_string(),
            correct_answer: "calm and peaceful".to_string(),
            wrong1: "noisy".to_string(),
            wrong2: "angry".to_string(),
            wrong3: "confused".to_string(),
            created_at: datetime!(2026-01-01 00:00:00),
        }
    }

    #[test]
    fn vocabulary_prompt_names_the_word() {
        let question = normalize(&RawQuestion::Vocabulary(vocabulary_row()));
        assert_eq!(question.prompt, "Select the correct meaning for the word 'serene'.");
        assert_eq!(question.meta.word.as_deref(), Some("serene"));
    }

    #[test]
    fn options_contain_correct_answer_and_are_unique() {
        let question = normalize(&RawQuestion::Vocabulary(vocabulary_row()));
        assert_eq!(question.options.len(), 4);
        assert!(question.options.contains(&question.correct_answer));
        let mut unique = question.options.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), question.options.len());
    }

    #[test]
    fn empty_and_duplicate_wrong_slots_are_dropped() {
        let mut row = vocabulary_row();
        row.wrong2 = String::new();
        row.wrong3 = "noisy".to_string();
        let question = normalize(&RawQuestion::Vocabulary(row));
        assert_eq!(question.options.len(), 2);
        assert!(question.options.contains(&"calm and peaceful".to_string()));
        assert!(question.options.contains(&"noisy".to_string()));
    }

    #[test]
    fn normalizing_twice_keeps_prompt_and_answer_but_reshuffles_independently() {
        let raw = RawQuestion::Vocabulary(vocabulary_row());
        let first = normalize_with(&raw, |options| options.reverse());
        let second = normalize_with(&raw, |_| {});

        assert_eq!(first.prompt, second.prompt);
        assert_eq!(first.correct_answer, second.correct_answer);
        assert_ne!(first.options, second.options);

        let mut a = first.options.clone();
        let mut b = second.options.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b, "both presentations draw from the same option set");
    }

    #[test]
    fn grammar_blank_marker_becomes_visible_placeholder() {
        let row = GrammarRow {
            id: "g-1".to_string(),
            sentence_with_placeholder: "By the time we arrived, the film __.".to_string(),
            correct_answer: "had finished".to_string(),
            wrong1: "finishing".to_string(),
            wrong2: "has finish".to_string(),
            wrong3: "finish".to_string(),
            created_at: datetime!(2026-01-01 00:00:00),
        };
        let question = normalize(&RawQuestion::Grammar(row));
        assert_eq!(question.prompt, "By the time we arrived, the film ____.");
        assert_eq!(question.answer_type, Category::Grammar.answer_type());
    }

    #[test]
    fn translation_has_no_options() {
        let row = TranslationRow {
            id: "t-1".to_string(),
            prompt: "Translate: Ich lerne jeden Tag neue Woerter.".to_string(),
            reference_answer: "I learn new words every day.".to_string(),
            created_at: datetime!(2026-01-01 00:00:00),
        };
        let question = normalize(&RawQuestion::Translation(row));
        assert_eq!(question.answer_type, AnswerType::FreeText);
        assert!(question.options.is_empty());
        assert_eq!(question.correct_answer, "I learn new words every day.");
        assert_eq!(question.meta.reference_hint.as_deref(), Some("I learn new words every day."));
    }
}
