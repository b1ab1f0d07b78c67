//! Static code templates for integrating provider SDKs.
//!
//! The table is a compile-time constant: three providers, two languages each.

mod snippets;

use serde::{Deserialize, Serialize};
use strum::VariantArray;

/// Install instructions and sample code for one provider in one language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeTemplate {
    pub install: &'static str,
    pub env_vars: &'static [&'static str],
    pub code: &'static str,
    pub usage: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, VariantArray)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Typescript,
    Python,
}

impl Language {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Typescript => "typescript",
            Self::Python => "python",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Providers with templates, in match priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, VariantArray)]
pub enum TemplateProvider {
    Anthropic,
    OpenAi,
    Google,
}

impl TemplateProvider {
    /// Lowercase substrings that select this provider
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Anthropic => &["claude", "anthropic"],
            Self::OpenAi => &["gpt", "openai"],
            Self::Google => &["gemini", "google"],
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Anthropic => "Claude/Anthropic",
            Self::OpenAi => "GPT/OpenAI",
            Self::Google => "Gemini/Google",
        }
    }

    /// Case-insensitive substring match, first provider in priority order wins.
    pub fn detect(model: &str) -> Option<Self> {
        let model = model.to_lowercase();
        Self::VARIANTS
            .iter()
            .copied()
            .find(|provider| provider.keywords().iter().any(|kw| model.contains(kw)))
    }

    pub fn template(self, language: Language) -> &'static CodeTemplate {
        match (self, language) {
            (Self::Anthropic, Language::Typescript) => &snippets::ANTHROPIC_TYPESCRIPT,
            (Self::Anthropic, Language::Python) => &snippets::ANTHROPIC_PYTHON,
            (Self::OpenAi, Language::Typescript) => &snippets::OPENAI_TYPESCRIPT,
            (Self::OpenAi, Language::Python) => &snippets::OPENAI_PYTHON,
            (Self::Google, Language::Typescript) => &snippets::GOOGLE_TYPESCRIPT,
            (Self::Google, Language::Python) => &snippets::GOOGLE_PYTHON,
        }
    }
}

/// Resolve a free-text model name to its template.
pub fn lookup(model: &str, language: Language) -> Option<&'static CodeTemplate> {
    TemplateProvider::detect(model).map(|provider| provider.template(language))
}

/// "Claude/Anthropic, GPT/OpenAI, Gemini/Google"
pub fn supported_providers() -> String {
    TemplateProvider::VARIANTS
        .iter()
        .map(|p| p.label())
        .collect::<Vec<_>>()
        .join(", ")
}
