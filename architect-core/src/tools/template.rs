use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use strum::VariantArray;
use tracing::debug;

use crate::config::{Config, API_KEY_ENV, PRICING_URL, SETTINGS_URL};
use crate::format::footer;
use crate::templates::{self, CodeTemplate, Language};
use crate::tools::r#trait::{ToolExecutor, ToolOutput, ToolRequest};

#[derive(Debug, Deserialize)]
struct TemplateParams {
    model: String,
    #[serde(default)]
    language: Language,
}

pub struct GetCodeTemplate {
    config: Arc<Config>,
}

impl GetCodeTemplate {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn gated(&self) -> bool {
        self.config.templates_require_key && !self.config.has_api_key()
    }
}

#[async_trait::async_trait]
impl ToolExecutor for GetCodeTemplate {
    fn name(&self) -> &'static str {
        "get_code_template"
    }

    fn description(&self) -> &'static str {
        "Get production-ready code templates for integrating an AI model (TypeScript & Python), \
         with install commands, environment variables, a client helper and a usage example."
    }

    fn input_schema(&self) -> Value {
        let languages: Vec<&str> = Language::VARIANTS.iter().map(|l| l.as_str()).collect();
        json!({
            "type": "object",
            "properties": {
                "model": {
                    "type": "string",
                    "description": "The AI model name (e.g., 'Claude', 'GPT-4', 'Gemini')"
                },
                "language": {
                    "type": "string",
                    "enum": languages,
                    "description": "Programming language for the template"
                }
            },
            "required": ["model"]
        })
    }

    async fn execute(&self, request: &ToolRequest) -> Result<ToolOutput> {
        let params: TemplateParams = request.parse(self.name())?;

        if self.gated() {
            debug!("Template requested without API key while gated");
            return Ok(ToolOutput::text(render_pro_gate()));
        }

        let text = match templates::lookup(&params.model, params.language) {
            Some(template) => render_template(&params.model, params.language, template),
            None => render_not_found(&params.model, params.language),
        };
        Ok(ToolOutput::text(text))
    }
}

pub fn render_template(model: &str, language: Language, template: &CodeTemplate) -> String {
    format!(
        "## 📝 Code Template: {model} ({language})\n\n\
         ### Installation\n```bash\n{install}\n```\n\n\
         ### Environment Variables\n```\n{env}\n```\n\n\
         ### Code\n```{language}\n{code}\n```\n\n\
         ### Usage Example\n```{language}\n{usage}\n```\n\n\
         {footer}",
        install = template.install,
        env = template.env_vars.join("\n"),
        code = template.code,
        usage = template.usage,
        footer = footer(),
    )
}

pub fn render_not_found(model: &str, language: Language) -> String {
    format!(
        "No template found for \"{model}\" in {language}. Available: {}.",
        templates::supported_providers()
    )
}

pub fn render_pro_gate() -> String {
    format!(
        "🔒 **Code Templates are a Pro Feature**\n\n\
         Production-ready code templates require an ArchitectGBT Pro subscription.\n\n\
         **Upgrade:** {PRICING_URL}\n\n\
         **Already Pro?**\n\
         1. Get your API key: {SETTINGS_URL}\n\
         2. Add it to your MCP config:\n\
         ```json\n\
         {{\n  \"mcpServers\": {{\n    \"architectgbt\": {{\n      \"command\": \"architectgbt-mcp\",\n      \
         \"env\": {{\n        \"{API_KEY_ENV}\": \"agbt_your_key_here\"\n      }}\n    }}\n  }}\n}}\n\
         ```\n\
         3. Restart your IDE\n\n\
         **Free tier includes:**\n\
         - Browsing AI models with `list_models` (unlimited)\n\
         - 3 AI recommendations/day with `get_ai_recommendation`"
    )
}
