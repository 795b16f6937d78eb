pub mod dummy;
pub mod openai;

use crate::language::{Direction, Language};
use crate::{LLMError, TranslationError};
use std::time::Duration;

pub trait LLMBuilder {
    type Built: LLM;

    fn build(&self) -> Result<Self::Built, TranslationError>;
}

/// The one wire-level boundary the core depends on: given a system and user
/// message plus generation parameters, produce text and usage counts, or fail.
pub trait LLM {
    /// Identifier sent as the remote model field; also the tokenizer hint for
    /// local estimates.
    fn model_id(&self) -> &str;

    async fn generate(&self, req: GenerationRequest) -> Result<Generation, LLMError>;
}

impl<T: LLM> LLM for &T {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    async fn generate(&self, req: GenerationRequest) -> Result<Generation, LLMError> {
        (**self).generate(req).await
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

/// Remote-reported token counts are kept optional: when the capability omits
/// usage, the caller falls back to the local estimator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

pub(crate) const ALTERNATIVES_SYSTEM_PROMPT: &str =
    "You are a professional translator providing alternative expressions.";

/// Fixed system-instruction skeleton. The style block is included only when a
/// style or proper-noun directive applies; the user message stays untouched.
pub(crate) fn build_system_prompt(
    direction: &Direction,
    style_instruction: Option<&str>,
    preserve_proper_nouns: bool,
) -> String {
    let mut directives = String::new();
    if let Some(instruction) = style_instruction {
        directives.push_str("\nSTYLE INSTRUCTION: ");
        directives.push_str(instruction);
    }
    if preserve_proper_nouns {
        directives.push_str(
            "\nIMPORTANT: Preserve all proper nouns (names, places, brands) in their original form.",
        );
    }
    if !directives.is_empty() {
        directives.push('\n');
    }

    format!(
        "You are a professional translator. Translate the following {source} text to {target}.\n\
         IMPORTANT: Preserve all Markdown formatting exactly as it appears in the original text.\n\
         {directives}\n\
         Only respond with the translation, nothing else.",
        source = direction.source.name(),
        target = direction.target.name(),
    )
}

/// User message for the secondary alternatives call: rephrases the already
/// produced translation, never re-translates the source.
pub(crate) fn build_alternatives_prompt(
    base_translation: &str,
    target: Language,
    style_instruction: &str,
) -> String {
    format!(
        "Given this translation:\n\
         \"{base_translation}\"\n\
         \n\
         Provide 2-3 alternative ways to express the same meaning in {target}, \
         following this style: {style_instruction}\n\
         \n\
         Only output the alternatives, one per line, without numbering or explanation.",
        target = target.name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    fn korean_to_english() -> Direction {
        Direction::for_language(Language::Korean)
    }

    #[test]
    fn bare_prompt_has_no_style_block() {
        let prompt = build_system_prompt(&korean_to_english(), None, false);
        assert_eq!(
            prompt,
            "You are a professional translator. Translate the following Korean text to English.\n\
             IMPORTANT: Preserve all Markdown formatting exactly as it appears in the original text.\n\
             \n\
             Only respond with the translation, nothing else."
        );
    }

    #[test]
    fn style_block_is_set_off_by_blank_lines() {
        let direction = korean_to_english();
        let prompt = build_system_prompt(
            &direction,
            Some(Style::Business.instruction(&direction)),
            false,
        );
        assert!(prompt.contains(
            "\n\nSTYLE INSTRUCTION: Use standard business English, professional but not overly formal.\n\n"
        ));
        assert!(prompt.ends_with("Only respond with the translation, nothing else."));
    }

    #[test]
    fn proper_noun_directive_is_appended_after_the_style() {
        let direction = korean_to_english();
        let prompt = build_system_prompt(&direction, Some("custom"), true);
        assert!(prompt.contains(
            "STYLE INSTRUCTION: custom\n\
             IMPORTANT: Preserve all proper nouns (names, places, brands) in their original form."
        ));
    }

    #[test]
    fn proper_noun_directive_works_without_a_style() {
        let prompt = build_system_prompt(&korean_to_english(), None, true);
        assert!(!prompt.contains("STYLE INSTRUCTION"));
        assert!(prompt.contains("Preserve all proper nouns"));
    }

    #[test]
    fn direction_names_flow_into_the_prompt() {
        let to_korean = Direction::for_language(Language::English);
        let prompt = build_system_prompt(&to_korean, None, false);
        assert!(prompt.contains("Translate the following English text to Korean."));
    }

    #[test]
    fn alternatives_prompt_embeds_translation_and_style() {
        let prompt = build_alternatives_prompt("Good morning", Language::English, "Keep it brief.");
        assert!(prompt.starts_with("Given this translation:\n\"Good morning\""));
        assert!(prompt.contains("in English, following this style: Keep it brief."));
        assert!(prompt.ends_with("one per line, without numbering or explanation."));
    }
}
