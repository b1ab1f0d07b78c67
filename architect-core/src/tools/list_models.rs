use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::VariantArray;
use tracing::{debug, warn};

use crate::api::{ApiError, ArchitectApi, CatalogEnvelope, CatalogModel};
use crate::config::Config;
use crate::format::{per_million, thousands};
use crate::tools::r#trait::{ToolExecutor, ToolOutput, ToolRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, VariantArray)]
pub enum ProviderFilter {
    OpenAI,
    Anthropic,
    Google,
    Meta,
    Mistral,
    #[serde(rename = "all")]
    All,
}

impl ProviderFilter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Google => "Google",
            Self::Meta => "Meta",
            Self::Mistral => "Mistral",
            Self::All => "all",
        }
    }

    pub fn matches(self, provider: &str) -> bool {
        self == Self::All || provider.eq_ignore_ascii_case(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, VariantArray)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    #[default]
    Table,
    Grouped,
}

impl ListFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Grouped => "grouped",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListModelsParams {
    #[serde(default)]
    provider: Option<ProviderFilter>,
    #[serde(default)]
    limit: Option<f64>,
    #[serde(default)]
    format: ListFormat,
}

pub struct ListModels {
    config: Arc<Config>,
    api: Arc<dyn ArchitectApi>,
}

impl ListModels {
    pub fn new(config: Arc<Config>, api: Arc<dyn ArchitectApi>) -> Self {
        Self { config, api }
    }

    fn resolve_limit(&self, limit: Option<f64>) -> Result<usize> {
        match limit {
            None => Ok(self.config.default_list_limit),
            Some(l) if !l.is_finite() || l < 0.0 => {
                bail!("Invalid arguments for {}: limit must be a non-negative number", self.name())
            }
            Some(l) => Ok(l.floor() as usize),
        }
    }

    async fn fetch(&self) -> Result<Vec<CatalogModel>, ApiError> {
        let reply = self.api.list_models().await?;
        if !reply.is_success() {
            return Err(ApiError::Status(reply.status));
        }
        Ok(CatalogEnvelope::decode(reply.json()?)?.into_models())
    }
}

#[async_trait::async_trait]
impl ToolExecutor for ListModels {
    fn name(&self) -> &'static str {
        "list_models"
    }

    fn description(&self) -> &'static str {
        "List available AI models with optional filtering by provider."
    }

    fn input_schema(&self) -> Value {
        let providers: Vec<&str> = ProviderFilter::VARIANTS.iter().map(|p| p.as_str()).collect();
        let formats: Vec<&str> = ListFormat::VARIANTS.iter().map(|f| f.as_str()).collect();
        json!({
            "type": "object",
            "properties": {
                "provider": {
                    "type": "string",
                    "enum": providers,
                    "description": "Filter by provider"
                },
                "limit": {
                    "type": "number",
                    "description": format!(
                        "Maximum number of models to return (default: {})",
                        self.config.default_list_limit
                    )
                },
                "format": {
                    "type": "string",
                    "enum": formats,
                    "description": "Output layout: a single table, or sections per provider"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, request: &ToolRequest) -> Result<ToolOutput> {
        let params: ListModelsParams = request.parse(self.name())?;
        let limit = self.resolve_limit(params.limit)?;

        let models = match self.fetch().await {
            Ok(models) => models,
            Err(e) => {
                warn!(error = %e, "Model catalog fetch failed");
                return Ok(ToolOutput::error(format!("Failed to list models: {e}")));
            }
        };
        let total = models.len();

        let selected: Vec<CatalogModel> = models
            .into_iter()
            .filter(|m| params.provider.map_or(true, |p| p.matches(&m.provider)))
            .take(limit)
            .collect();
        debug!(total, shown = selected.len(), limit, "Filtered model catalog");

        let text = match params.format {
            ListFormat::Table => render_table(&selected),
            ListFormat::Grouped => render_grouped(&selected),
        };
        Ok(ToolOutput::text(text))
    }
}

fn showing_line(count: usize) -> String {
    format!(
        "\n*Showing {count} models. Use `get_ai_recommendation` for personalized suggestions.*"
    )
}

pub fn render_table(models: &[CatalogModel]) -> String {
    let mut out = String::from("## 📊 Available AI Models\n\n");
    out.push_str("| Model | Provider | Input $/1M | Output $/1M |\n");
    out.push_str("|-------|----------|------------|-------------|\n");

    for m in models {
        let _ = writeln!(
            out,
            "| {} | {} | ${} | ${} |",
            m.name,
            m.provider,
            per_million(m.input_cost_per_1k),
            per_million(m.output_cost_per_1k),
        );
    }

    out.push_str(&showing_line(models.len()));
    out
}

pub fn render_grouped(models: &[CatalogModel]) -> String {
    let mut groups: Vec<(&str, Vec<&CatalogModel>)> = Vec::new();
    for m in models {
        let provider = if m.provider.trim().is_empty() {
            "Unknown"
        } else {
            m.provider.as_str()
        };
        match groups.iter_mut().find(|(name, _)| *name == provider) {
            Some((_, members)) => members.push(m),
            None => groups.push((provider, vec![m])),
        }
    }

    let mut out = String::from("## 📊 Available AI Models\n");
    for (provider, members) in &groups {
        let _ = write!(out, "\n### {provider}\n");
        for m in members {
            let _ = write!(
                out,
                "- **{}**: ${}/1M input, ${}/1M output",
                m.name,
                per_million(m.input_cost_per_1k),
                per_million(m.output_cost_per_1k),
            );
            if let Some(context) = m.context_window {
                let _ = write!(out, ", {} tokens context", thousands(context));
            }
            out.push('\n');
        }
    }

    out.push_str(&showing_line(models.len()));
    out
}
