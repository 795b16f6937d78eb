use tiktoken_rs::{CoreBPE, cl100k_base, get_bpe_from_model};

/// Approximate sub-word token count for `text` under the given model's
/// tokenizer. Advisory only: used for UI feedback and input-length gating,
/// never for billing. Unknown model names fall back to the cl100k_base
/// encoding instead of failing.
pub fn count_tokens(text: &str, model: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    encoder_for(model).encode_with_special_tokens(text).len()
}

fn encoder_for(model: &str) -> CoreBPE {
    get_bpe_from_model(model).unwrap_or_else(|_| cl100k_base().expect("bundled encoding"))
}

/// Per-text counters mirrored in the UI next to the input box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    pub characters: usize,
    pub tokens: usize,
    pub words: usize,
    pub lines: usize,
}

pub fn statistics(text: &str, model: &str) -> Statistics {
    Statistics {
        characters: text.chars().count(),
        tokens: count_tokens(text, model),
        words: text.split_whitespace().count(),
        lines: text.lines().count(),
    }
}

/// Character-count gate for the configured maximum accepted input length.
pub fn exceeds_limit(text: &str, max_chars: usize) -> bool {
    text.chars().count() > max_chars
}
