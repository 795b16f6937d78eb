use super::{Generation, GenerationRequest, LLM, LLMBuilder};
use crate::{LLMError, TranslationError};
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct DummyLLMBuilder;

impl LLMBuilder for DummyLLMBuilder {
    type Built = DummyLLM;

    fn build(&self) -> Result<Self::Built, TranslationError> {
        Ok(DummyLLM::new())
    }
}

/// Offline stand-in for the remote chat capability. Pops one scripted outcome
/// per call and falls back to a fixed reply once the script runs out; every
/// incoming request is kept for inspection.
pub struct DummyLLM {
    model: String,
    script: Mutex<VecDeque<Result<Generation, LLMError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl DummyLLM {
    pub fn new() -> Self {
        DummyLLM::with_script([])
    }

    pub fn with_script(
        outcomes: impl IntoIterator<Item = Result<Generation, LLMError>>,
    ) -> Self {
        DummyLLM {
            model: "gpt-4o-mini".to_owned(),
            script: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Scripted success without usage counts.
    pub fn reply(text: &str) -> Result<Generation, LLMError> {
        Ok(Generation {
            text: text.to_owned(),
            prompt_tokens: None,
            completion_tokens: None,
        })
    }

    /// Scripted success with remote-reported usage.
    pub fn reply_with_usage(
        text: &str,
        prompt_tokens: u32,
        completion_tokens: u32,
    ) -> Result<Generation, LLMError> {
        Ok(Generation {
            text: text.to_owned(),
            prompt_tokens: Some(prompt_tokens),
            completion_tokens: Some(completion_tokens),
        })
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("requests mutex").clone()
    }
}

impl Default for DummyLLM {
    fn default() -> Self {
        DummyLLM::new()
    }
}

impl LLM for DummyLLM {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, req: GenerationRequest) -> Result<Generation, LLMError> {
        self.requests.lock().expect("requests mutex").push(req);
        self.script
            .lock()
            .expect("script mutex")
            .pop_front()
            .unwrap_or_else(|| DummyLLM::reply("Dummy output"))
    }
}
