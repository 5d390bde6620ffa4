//! Prompt builders for the free-form generator.
//!
//! Instructions stay in English even for non-English output: the
//! generator follows English instructions far more reliably, and the
//! importance tags must come back in the canonical English form.

use pagelens_protocols::types::LanguageCode;

fn output_language_line(output: LanguageCode) -> String {
    if output == LanguageCode::En {
        String::new()
    } else {
        format!("Write all content in {}.\n", output.english_name())
    }
}

/// Key-point extraction with importance tags.
pub fn key_points(text: &str, output: LanguageCode) -> String {
    format!(
        "List the 3 to 7 most important points of the following text.\n\
         Format: one point per line, as a bullet starting with an importance \
         marker, exactly one of [HIGH], [MEDIUM] or [LOW].\n\
         Example: - [HIGH] The main finding.\n\
         Keep the markers in English exactly as shown.\n\
         {}\nText:\n{}",
        output_language_line(output),
        text
    )
}

/// Exactly three quiz question/answer pairs in a line-tagged format.
pub fn quiz(text: &str, output: LanguageCode) -> String {
    format!(
        "Write exactly 3 comprehension questions about the following text, \
         each with its answer.\n\
         Format: Q1:, A1:, Q2:, A2:, Q3:, A3:, one per line, nothing else.\n\
         {}\nText:\n{}",
        output_language_line(output),
        text
    )
}

/// A two-speaker scripted exchange about the text.
pub fn dialogue(text: &str, output: LanguageCode) -> String {
    format!(
        "Write a dialogue between two speakers, Alex and Sam, discussing the \
         following text. 10 to 15 turns total.\n\
         Format: one line per turn, as \"Speaker: what they say\".\n\
         {}\nText:\n{}",
        output_language_line(output),
        text
    )
}

/// Free-form question answering over bounded page context.
pub fn chat(context: &str, question: &str, output: LanguageCode) -> String {
    format!(
        "Answer the question using only the context below. If the context \
         does not contain the answer, say so briefly.\n\
         {}\nContext:\n{}\n\nQuestion: {}",
        output_language_line(output),
        context,
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_prompt_has_no_language_line() {
        let prompt = key_points("body", LanguageCode::En);
        assert!(!prompt.contains("Write all content"));
        assert!(prompt.contains("[HIGH]"));
        assert!(prompt.ends_with("body"));
    }

    #[test]
    fn test_non_english_prompt_names_language() {
        let prompt = quiz("body", LanguageCode::Ja);
        assert!(prompt.contains("Write all content in Japanese."));
        assert!(prompt.contains("Q1:"));
    }

    #[test]
    fn test_chat_prompt_includes_context_and_question() {
        let prompt = chat("the context", "the question?", LanguageCode::Es);
        assert!(prompt.contains("the context"));
        assert!(prompt.contains("Question: the question?"));
        assert!(prompt.contains("Spanish"));
    }
}
