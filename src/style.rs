use crate::language::{Direction, Language};

/// Closed set of translation tone presets. A free-form custom instruction on
/// the request overrides the catalog lookup entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Literal,
    Conversational,
    Business,
    Formal,
    Concise,
}

impl Style {
    pub const ALL: [Style; 5] = [
        Style::Literal,
        Style::Conversational,
        Style::Business,
        Style::Formal,
        Style::Concise,
    ];

    /// Fallback used when a requested style key cannot be resolved.
    pub const DEFAULT: Style = Style::Business;

    pub fn key(self) -> &'static str {
        match self {
            Style::Literal => "literal",
            Style::Conversational => "conversational",
            Style::Business => "business",
            Style::Formal => "formal",
            Style::Concise => "concise",
        }
    }

    /// Display label shown in style pickers.
    pub fn label(self) -> &'static str {
        match self {
            Style::Literal => "📝 원문 유지",
            Style::Conversational => "📱 자연스러운 구어체",
            Style::Business => "💼 비즈니스 기본",
            Style::Formal => "📋 공식/문서용",
            Style::Concise => "✂️ 간결하게",
        }
    }

    pub fn from_key(key: &str) -> Option<Style> {
        Style::ALL.into_iter().find(|style| style.key() == key)
    }

    /// Natural-language instruction embedded in the system prompt. Phrasing
    /// differs by target language, so the table is selected per direction.
    pub fn instruction(self, direction: &Direction) -> &'static str {
        if direction.target == Language::Korean {
            match self {
                Style::Conversational => {
                    "자연스러운 구어체 한국어로 번역하세요. 친구와 대화하듯이 편안한 말투를 사용합니다."
                }
                Style::Business => {
                    "표준 비즈니스 한국어로 번역하세요. 전문적이지만 지나치게 격식을 차리지 않습니다."
                }
                Style::Formal => {
                    "공식적이고 격식 있는 한국어로 번역하세요. 문서나 보고서에 적합한 표현을 사용합니다."
                }
                Style::Literal => "원문의 구조와 의미를 최대한 보존하여 직역하세요.",
                Style::Concise => "핵심 메시지만 전달하는 간결한 한국어로 번역하세요.",
            }
        } else {
            match self {
                Style::Conversational => {
                    "Use natural, conversational English as if speaking with a friend."
                }
                Style::Business => {
                    "Use standard business English, professional but not overly formal."
                }
                Style::Formal => {
                    "Use formal, official English suitable for documents and reports."
                }
                Style::Literal => {
                    "Translate literally, preserving the original structure and meaning as much as possible."
                }
                Style::Concise => "Translate concisely, conveying only the core message.",
            }
        }
    }
}
