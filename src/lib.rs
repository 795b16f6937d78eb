pub mod config;
pub mod language;
pub mod llm;
pub mod markdown;
pub mod observe;
pub mod provider;
pub mod style;
pub mod tokens;
mod utils;

use crate::language::Direction;
use crate::llm::{GenerationRequest, LLM};
use crate::observe::{CallSpan, Observer};
use crate::utils::preview;
use itertools::Itertools;
use std::fmt::Display;
use std::time::Duration;

pub use crate::config::AppConfig;
pub use crate::language::LanguageDetector;
pub use crate::llm::{Generation, LLMBuilder};
pub use crate::observe::{NoopObserver, TracingObserver};
pub use crate::provider::{DeploymentMap, ResolvedProvider};
pub use crate::style::Style;

const ALTERNATIVES_TEMPERATURE: f32 = 0.7;
const ALTERNATIVES_MAX_TOKENS: u32 = 500;
const MAX_ALTERNATIVES: usize = 3;

/// Failure of a single remote generation call, classified coarsely so callers
/// can decide between retrying, surfacing, or giving up.
#[derive(Debug)]
pub enum LLMError {
    Timeout { after: Duration },
    ConnectionError(anyhow::Error),
    ApiError(anyhow::Error),
    OtherError(anyhow::Error),
}

impl Display for LLMError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMError::Timeout { after } => {
                write!(f, "Request timed out after {} s", after.as_secs())
            }
            LLMError::ConnectionError(e) => {
                write!(f, "Connection error: {}", e)
            }
            LLMError::ApiError(e) => {
                write!(f, "API error: {}", e)
            }
            LLMError::OtherError(e) => {
                write!(f, "Error: {}", e)
            }
        }
    }
}

#[derive(Debug)]
pub enum TranslationError {
    /// Input was blank after trimming; nothing to send.
    EmptyInput,
    /// Language detection produced no usable direction.
    UndeterminedLanguage,
    /// The requested model or deployment alias is not configured. Raised at
    /// construction time, before any remote call.
    UnsupportedModelOrDeployment {
        requested: String,
        available: Vec<String>,
    },
    /// The remote capability failed; recoverable by retry or user display.
    RemoteCallFailed(LLMError),
}

impl Display for TranslationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationError::EmptyInput => {
                write!(f, "Input text is empty")
            }
            TranslationError::UndeterminedLanguage => {
                write!(f, "Could not determine the translation direction")
            }
            TranslationError::UnsupportedModelOrDeployment {
                requested,
                available,
            } => {
                write!(
                    f,
                    "Unsupported model or deployment: {} (available: {})",
                    requested,
                    available.iter().join(", ")
                )
            }
            TranslationError::RemoteCallFailed(e) => {
                write!(f, "Translation call failed: {}", e)
            }
        }
    }
}

impl From<LLMError> for TranslationError {
    fn from(err: LLMError) -> Self {
        TranslationError::RemoteCallFailed(err)
    }
}

/// One translation to perform. Immutable once constructed; a custom
/// instruction, when present, replaces the style-catalog lookup entirely.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub text: String,
    pub direction: Direction,
    pub style: Option<Style>,
    pub custom_instruction: Option<String>,
    pub preserve_proper_nouns: bool,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, direction: Direction) -> Self {
        TranslationRequest {
            text: text.into(),
            direction,
            style: None,
            custom_instruction: None,
            preserve_proper_nouns: false,
        }
    }
}

/// Successful translation. Token counts are the remote-reported ones when
/// present; otherwise the prompt side comes from the local estimator and the
/// completion side is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledTranslation {
    pub primary: Translation,
    pub alternatives: Vec<String>,
}

/// Per-style outcomes in the order the styles were requested. A failed style
/// keeps its slot; the batch never aborts as a whole.
pub type MultiStyleOutcome = Vec<(Style, Result<StyledTranslation, TranslationError>)>;

/// Generation parameters applied to every primary translation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            temperature: 0.3,
            max_output_tokens: 4000,
            timeout: Duration::from_secs(60),
        }
    }
}

impl GenerationSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        GenerationSettings {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Orchestrates translation calls over an injected client and observer. Holds
/// no mutable state; every call is a pure outbound request/response.
pub struct Translator<L, O> {
    llm: L,
    observer: O,
    settings: GenerationSettings,
}

impl<L: LLM> Translator<L, NoopObserver> {
    pub fn new(llm: L, settings: GenerationSettings) -> Self {
        Translator {
            llm,
            observer: NoopObserver,
            settings,
        }
    }
}

impl<L: LLM, O: Observer> Translator<L, O> {
    pub fn with_observer(llm: L, settings: GenerationSettings, observer: O) -> Self {
        Translator {
            llm,
            observer,
            settings,
        }
    }

    /// Performs exactly one remote call. Pre-flight failures (`EmptyInput`,
    /// `UndeterminedLanguage`) are caught before anything goes on the wire.
    pub async fn translate(
        &self,
        req: &TranslationRequest,
    ) -> Result<Translation, TranslationError> {
        if req.text.trim().is_empty() {
            return Err(TranslationError::EmptyInput);
        }
        if !req.direction.is_known() {
            return Err(TranslationError::UndeterminedLanguage);
        }

        let style_instruction = match (&req.custom_instruction, req.style) {
            (Some(custom), _) => Some(custom.as_str()),
            (None, Some(style)) => Some(style.instruction(&req.direction)),
            (None, None) => None,
        };
        let system =
            llm::build_system_prompt(&req.direction, style_instruction, req.preserve_proper_nouns);

        let generation = self
            .call(
                "translate",
                &system,
                &req.text,
                self.settings.temperature,
                self.settings.max_output_tokens,
            )
            .await?;

        Ok(self.finish_translation(generation, &system, &req.text))
    }

    /// One independent call per requested style, sequentially, with per-style
    /// failure isolation. Output order follows the requested style order.
    pub async fn translate_multi(
        &self,
        text: &str,
        direction: Direction,
        styles: &[Style],
        preserve_proper_nouns: bool,
        include_alternatives: bool,
    ) -> MultiStyleOutcome {
        log::info!(
            r#"Translating "{}" in {} style(s)"#,
            preview(text, 20),
            styles.len()
        );

        let mut results = MultiStyleOutcome::with_capacity(styles.len());
        for &style in styles {
            let mut request = TranslationRequest::new(text, direction);
            request.style = Some(style);
            request.preserve_proper_nouns = preserve_proper_nouns;

            let outcome = match self.translate(&request).await {
                Ok(primary) => {
                    let alternatives = if include_alternatives {
                        self.alternatives(&primary.text, style, &direction).await
                    } else {
                        Vec::new()
                    };
                    Ok(StyledTranslation {
                        primary,
                        alternatives,
                    })
                }
                Err(err) => {
                    log::warn!("{} style translation failed, skipping: {}", style.key(), err);
                    Err(err)
                }
            };
            results.push((style, outcome));
        }
        results
    }

    /// Secondary call that rephrases an already produced translation. Failure
    /// is non-fatal: the primary translation stands and the list is empty.
    async fn alternatives(
        &self,
        base_translation: &str,
        style: Style,
        direction: &Direction,
    ) -> Vec<String> {
        let user = llm::build_alternatives_prompt(
            base_translation,
            direction.target,
            style.instruction(direction),
        );

        match self
            .call(
                "alternatives",
                llm::ALTERNATIVES_SYSTEM_PROMPT,
                &user,
                ALTERNATIVES_TEMPERATURE,
                ALTERNATIVES_MAX_TOKENS,
            )
            .await
        {
            Ok(generation) => generation
                .text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .take(MAX_ALTERNATIVES)
                .map(str::to_owned)
                .collect(),
            Err(err) => {
                log::warn!("Alternative phrasing generation failed: {}", err);
                Vec::new()
            }
        }
    }

    async fn call(
        &self,
        operation: &'static str,
        system: &str,
        user: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<Generation, TranslationError> {
        let span = CallSpan::begin(operation, self.llm.model_id(), user.chars().count());
        let request = GenerationRequest {
            system: system.to_owned(),
            user: user.to_owned(),
            temperature,
            max_output_tokens,
            timeout: self.settings.timeout,
        };

        match self.llm.generate(request).await {
            Ok(generation) => {
                self.observer.record(span.finish(
                    generation.prompt_tokens.unwrap_or(0),
                    generation.completion_tokens.unwrap_or(0),
                ));
                Ok(generation)
            }
            Err(err) => {
                let err = TranslationError::RemoteCallFailed(err);
                self.observer.record(span.fail(&err));
                Err(err)
            }
        }
    }

    /// Remote-reported usage wins; the local estimator only fills in the
    /// prompt side when the capability did not report any.
    fn finish_translation(&self, generation: Generation, system: &str, user: &str) -> Translation {
        let prompt_tokens = generation.prompt_tokens.unwrap_or_else(|| {
            let model = self.llm.model_id();
            (tokens::count_tokens(system, model) + tokens::count_tokens(user, model)) as u32
        });
        Translation {
            text: generation.text,
            prompt_tokens,
            completion_tokens: generation.completion_tokens.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::llm::dummy::DummyLLM;
    use anyhow::anyhow;

    fn korean_to_english() -> Direction {
        Direction::for_language(Language::Korean)
    }

    fn translator(llm: &DummyLLM) -> Translator<&DummyLLM, NoopObserver> {
        Translator::new(llm, GenerationSettings::default())
    }

    #[tokio::test]
    async fn empty_input_is_rejected_before_any_call() {
        let llm = DummyLLM::new();
        let request = TranslationRequest::new("   \n ", korean_to_english());
        let err = translator(&llm).translate(&request).await.unwrap_err();
        assert!(matches!(err, TranslationError::EmptyInput));
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn unknown_direction_is_rejected_before_any_call() {
        let llm = DummyLLM::new();
        let request =
            TranslationRequest::new("1234 !!", Direction::for_language(Language::Unknown));
        let err = translator(&llm).translate(&request).await.unwrap_err();
        assert!(matches!(err, TranslationError::UndeterminedLanguage));
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn remote_usage_counts_are_authoritative() {
        let llm = DummyLLM::with_script([DummyLLM::reply_with_usage("Hello", 42, 7)]);
        let request = TranslationRequest::new("안녕하세요", korean_to_english());
        let translation = translator(&llm).translate(&request).await.unwrap();
        assert_eq!(translation.text, "Hello");
        assert_eq!(translation.prompt_tokens, 42);
        assert_eq!(translation.completion_tokens, 7);
    }

    #[tokio::test]
    async fn missing_usage_falls_back_to_the_local_estimator() {
        let llm = DummyLLM::with_script([DummyLLM::reply("Hello")]);
        let request = TranslationRequest::new("안녕하세요", korean_to_english());
        let translation = translator(&llm).translate(&request).await.unwrap();

        let sent = llm.requests();
        assert_eq!(sent.len(), 1);
        let expected = tokens::count_tokens(&sent[0].system, "gpt-4o-mini")
            + tokens::count_tokens(&sent[0].user, "gpt-4o-mini");
        assert_eq!(translation.prompt_tokens, expected as u32);
        assert_eq!(translation.completion_tokens, 0);
    }

    #[tokio::test]
    async fn user_message_is_the_raw_input() {
        let llm = DummyLLM::new();
        let text = "**굵게** 표시된 텍스트";
        let request = TranslationRequest::new(text, korean_to_english());
        translator(&llm).translate(&request).await.unwrap();

        let sent = llm.requests();
        assert_eq!(sent[0].user, text);
    }

    #[tokio::test]
    async fn custom_instruction_overrides_the_style_catalog() {
        let llm = DummyLLM::new();
        let mut request = TranslationRequest::new("안녕하세요", korean_to_english());
        request.style = Some(Style::Business);
        request.custom_instruction = Some("Sound like a pirate.".to_owned());
        translator(&llm).translate(&request).await.unwrap();

        let sent = llm.requests();
        assert!(sent[0].system.contains("STYLE INSTRUCTION: Sound like a pirate."));
        assert!(!sent[0].system.contains("business English"));
    }

    #[tokio::test]
    async fn proper_noun_directive_is_optional() {
        let llm = DummyLLM::new();
        let mut request = TranslationRequest::new("서울에서 왔어요", korean_to_english());
        request.preserve_proper_nouns = true;
        translator(&llm).translate(&request).await.unwrap();
        assert!(llm.requests()[0].system.contains("Preserve all proper nouns"));

        let llm = DummyLLM::new();
        let request = TranslationRequest::new("서울에서 왔어요", korean_to_english());
        translator(&llm).translate(&request).await.unwrap();
        assert!(!llm.requests()[0].system.contains("Preserve all proper nouns"));
    }

    #[tokio::test]
    async fn multi_style_batch_isolates_per_style_failures() {
        let llm = DummyLLM::with_script([
            DummyLLM::reply("Literal translation"),
            Err(LLMError::Timeout {
                after: Duration::from_secs(60),
            }),
        ]);
        let results = translator(&llm)
            .translate_multi(
                "안녕하세요",
                korean_to_english(),
                &[Style::Literal, Style::Business],
                false,
                false,
            )
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, Style::Literal);
        assert_eq!(
            results[0].1.as_ref().unwrap().primary.text,
            "Literal translation"
        );
        assert_eq!(results[1].0, Style::Business);
        assert!(matches!(
            results[1].1,
            Err(TranslationError::RemoteCallFailed(LLMError::Timeout { .. }))
        ));
    }

    #[tokio::test]
    async fn multi_style_output_follows_request_order() {
        let llm = DummyLLM::new();
        let styles = [Style::Concise, Style::Formal, Style::Literal];
        let results = translator(&llm)
            .translate_multi("안녕하세요", korean_to_english(), &styles, false, false)
            .await;
        let returned: Vec<Style> = results.iter().map(|(style, _)| *style).collect();
        assert_eq!(returned, styles);
    }

    #[tokio::test]
    async fn alternatives_rephrase_the_translation_not_the_source() {
        let llm = DummyLLM::with_script([
            DummyLLM::reply("Good morning"),
            DummyLLM::reply("Morning!\n\nTop of the morning\nA fine morning\nYet another"),
        ]);
        let results = translator(&llm)
            .translate_multi("좋은 아침", korean_to_english(), &[Style::Conversational], false, true)
            .await;

        let styled = results[0].1.as_ref().unwrap();
        assert_eq!(styled.primary.text, "Good morning");
        assert_eq!(
            styled.alternatives,
            vec!["Morning!", "Top of the morning", "A fine morning"]
        );

        let sent = llm.requests();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].user.contains("Good morning"));
        assert!(!sent[1].user.contains("좋은 아침"));
        assert_eq!(sent[1].system, llm::ALTERNATIVES_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn failed_alternatives_call_keeps_the_primary() {
        let llm = DummyLLM::with_script([
            DummyLLM::reply("Good morning"),
            Err(LLMError::ApiError(anyhow!("rate limited"))),
        ]);
        let results = translator(&llm)
            .translate_multi("좋은 아침", korean_to_english(), &[Style::Business], false, true)
            .await;

        let styled = results[0].1.as_ref().unwrap();
        assert_eq!(styled.primary.text, "Good morning");
        assert!(styled.alternatives.is_empty());
    }

    #[tokio::test]
    async fn observer_sees_successes_and_failures() {
        use crate::observe::CallRecord;
        use std::sync::Mutex;

        struct Recording(Mutex<Vec<CallRecord>>);
        impl Observer for &Recording {
            fn record(&self, record: CallRecord) {
                self.0.lock().expect("records mutex").push(record);
            }
        }

        let recording = Recording(Mutex::new(Vec::new()));
        let llm = DummyLLM::with_script([
            DummyLLM::reply_with_usage("Hello", 10, 2),
            Err(LLMError::ApiError(anyhow!("boom"))),
        ]);
        let translator =
            Translator::with_observer(&llm, GenerationSettings::default(), &recording);

        let request = TranslationRequest::new("안녕하세요", korean_to_english());
        translator.translate(&request).await.unwrap();
        translator.translate(&request).await.unwrap_err();

        let records = recording.0.lock().expect("records mutex");
        assert_eq!(records.len(), 2);
        assert!(records[0].error.is_none());
        assert_eq!(records[0].prompt_tokens, 10);
        assert!(records[1].error.as_deref().unwrap().contains("boom"));
    }
}
