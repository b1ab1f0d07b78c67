use std::fmt::Display;
use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use strum::VariantArray;
use tracing::{debug, warn};

use crate::api::{
    ApiError, ApiReply, ArchitectApi, Budget, ModelSuggestion, Priority, RateLimitBody,
    RecommendRequest, RecommendationReply, RecommendedModel, Alternative, UsageInfo,
};
use crate::config::{Config, API_KEY_ENV, PRICING_URL, SETTINGS_URL, SITE_URL};
use crate::format::{footer, price, thousands, truncate};
use crate::tools::r#trait::{ToolExecutor, ToolOutput, ToolRequest};

/// Alternatives shown after the top pick
const MAX_ALTERNATIVES: usize = 2;
/// Characters of alternative reasoning kept before truncation
const ALTERNATIVE_REASON_CHARS: usize = 120;

#[derive(Debug, Deserialize)]
struct RecommendationParams {
    /// Description of what the user wants to build
    prompt: String,
    #[serde(default)]
    budget: Option<Budget>,
    #[serde(default)]
    priority: Option<Priority>,
}

pub struct GetRecommendation {
    config: Arc<Config>,
    api: Arc<dyn ArchitectApi>,
}

impl GetRecommendation {
    pub fn new(config: Arc<Config>, api: Arc<dyn ArchitectApi>) -> Self {
        Self { config, api }
    }

    async fn recommend(&self, request: &RecommendRequest) -> ToolOutput {
        match self.api.recommend(request).await {
            Ok(reply) => self.handle_reply(request, reply),
            Err(e) => {
                warn!(error = %e, "Recommendation call failed");
                failure(e)
            }
        }
    }

    fn handle_reply(&self, request: &RecommendRequest, reply: ApiReply) -> ToolOutput {
        debug!(status = reply.status, "Handling recommendation reply");
        match reply.status {
            429 => {
                let body = RateLimitBody::parse(&reply.body);
                ToolOutput::text(render_rate_limit(
                    &body,
                    reply.reset_header.as_deref(),
                    self.config.has_api_key(),
                ))
            }
            401 | 405 if self.config.has_api_key() => {
                ToolOutput::text(render_key_rejected(reply.status))
            }
            401 | 405 => ToolOutput::text(render_auth_required(&request.prompt)),
            status if !reply.is_success() => failure(ApiError::Status(status)),
            _ => match reply
                .json::<Value>()
                .and_then(RecommendationReply::decode)
            {
                Ok(decoded) => ToolOutput::text(render_reply(&decoded)),
                Err(e) => {
                    warn!(error = %e, "Could not decode recommendation response");
                    failure(e)
                }
            },
        }
    }
}

fn failure(reason: impl Display) -> ToolOutput {
    ToolOutput::error(format!(
        "Failed to get recommendation: {reason}. Please try again."
    ))
}

#[async_trait::async_trait]
impl ToolExecutor for GetRecommendation {
    fn name(&self) -> &'static str {
        "get_ai_recommendation"
    }

    fn description(&self) -> &'static str {
        "Analyze a project description and recommend the best AI model with pricing, reasoning, \
         and alternatives. Use this when someone asks which AI model to use for their project. \
         Free tier: 3 recommendations/day without an API key; set ARCHITECTGBT_API_KEY for Pro access."
    }

    fn input_schema(&self) -> Value {
        let budgets: Vec<&str> = Budget::VARIANTS.iter().map(|b| b.as_str()).collect();
        let priorities: Vec<&str> = Priority::VARIANTS.iter().map(|p| p.as_str()).collect();
        json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "Description of what you want to build (e.g., 'customer support chatbot for e-commerce')"
                },
                "budget": {
                    "type": "string",
                    "enum": budgets,
                    "description": "Budget constraint for API costs"
                },
                "priority": {
                    "type": "string",
                    "enum": priorities,
                    "description": "What matters most for this project"
                }
            },
            "required": ["prompt"]
        })
    }

    async fn execute(&self, request: &ToolRequest) -> Result<ToolOutput> {
        let params: RecommendationParams = request.parse(self.name())?;
        let api_request = RecommendRequest {
            prompt: params.prompt,
            budget: params.budget,
            priority: params.priority,
        };
        Ok(self.recommend(&api_request).await)
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render_reply(reply: &RecommendationReply) -> String {
    match reply {
        RecommendationReply::Clarification { message, questions } => {
            render_clarification(message.as_deref(), questions)
        }
        RecommendationReply::Ranked {
            recommendations,
            summary,
            usage,
        } => render_ranked(recommendations, summary.as_deref(), usage.as_ref()),
        RecommendationReply::Single {
            model,
            reasoning,
            alternatives,
        } => render_single(model, reasoning.as_deref(), alternatives),
    }
}

pub fn render_clarification(message: Option<&str>, questions: &[String]) -> String {
    let mut out = String::from("## 🤔 A Few More Details Needed\n\n");
    out.push_str(message.unwrap_or(
        "To recommend the right model I need a bit more information about your project.",
    ));
    out.push_str("\n\n");

    for (i, question) in questions.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, question);
    }
    if !questions.is_empty() {
        out.push('\n');
    }

    out.push_str(
        "Call `get_ai_recommendation` again with a prompt that answers these questions.\n\n",
    );
    out.push_str(&footer());
    out
}

pub fn render_ranked(
    recommendations: &[ModelSuggestion],
    summary: Option<&str>,
    usage: Option<&UsageInfo>,
) -> String {
    let mut out = String::from("## 🎯 AI Model Recommendation\n\n");

    if let Some(summary) = summary {
        let _ = write!(out, "{summary}\n\n");
    }

    let Some((top, rest)) = recommendations.split_first() else {
        out.push_str(
            "No models matched this request. Try describing your use case, expected volume \
             and constraints in more detail.\n\n",
        );
        push_usage(&mut out, usage);
        out.push_str(&footer());
        return out;
    };

    let _ = writeln!(out, "### 🏆 Top Pick: {}", top.name);
    if let Some(provider) = &top.provider {
        let _ = writeln!(out, "- **Provider:** {provider}");
    }
    if let Some(model_id) = &top.model_id {
        let _ = writeln!(out, "- **Model ID:** {model_id}");
    }
    if let Some(cost) = cost_line(top.input_price, top.output_price) {
        let _ = writeln!(out, "- **Cost:** {cost}");
    }
    if let Some(context) = top.context_window {
        let _ = writeln!(out, "- **Context Window:** {} tokens", thousands(context));
    }

    push_list(&mut out, "✅ Pros", &top.pros);
    push_list(&mut out, "⚠️ Cons", &top.cons);

    if let Some(reasoning) = top.reasoning.as_deref().filter(|r| !r.trim().is_empty()) {
        let _ = write!(out, "\n### Why This Model?\n{}\n", reasoning.trim());
    }

    if !rest.is_empty() {
        out.push_str("\n### Alternatives\n");
        for (i, alt) in rest.iter().take(MAX_ALTERNATIVES).enumerate() {
            let _ = write!(out, "{}. **{}**", i + 1, alt.name);
            if let Some(provider) = &alt.provider {
                let _ = write!(out, " ({provider})");
            }
            if let Some(cost) = cost_line(alt.input_price, alt.output_price) {
                let _ = write!(out, " · {cost}");
            }
            if let Some(reason) = alt.reasoning.as_deref().filter(|r| !r.trim().is_empty()) {
                let _ = write!(out, " - {}", truncate(reason, ALTERNATIVE_REASON_CHARS));
            }
            out.push('\n');
        }
    }

    out.push('\n');
    push_usage(&mut out, usage);
    out.push_str(&footer());
    out
}

/// Layout of the older service revision that returned a single model.
pub fn render_single(
    model: &RecommendedModel,
    reasoning: Option<&str>,
    alternatives: &[Alternative],
) -> String {
    let mut out = String::from("## 🎯 AI Model Recommendation\n\n");

    let _ = writeln!(out, "### Recommended: {}", model.name);
    let _ = writeln!(
        out,
        "- **Provider:** {}",
        model.provider.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(
        out,
        "- **Model ID:** {}",
        model.model_id.as_deref().unwrap_or("N/A")
    );
    if model.input_price.is_some() || model.output_price.is_some() {
        let _ = writeln!(
            out,
            "- **Pricing:** ${}/1M input, ${}/1M output",
            model.input_price.map(price).unwrap_or_else(|| "?".into()),
            model.output_price.map(price).unwrap_or_else(|| "?".into()),
        );
    }
    if let Some(context) = model.context_window {
        let _ = writeln!(out, "- **Context Window:** {} tokens", thousands(context));
    }

    if let Some(reasoning) = reasoning {
        let _ = write!(out, "\n### Why This Model?\n{reasoning}\n");
    }

    if !alternatives.is_empty() {
        out.push_str("\n### Alternatives\n");
        for (i, alt) in alternatives.iter().enumerate() {
            let detail = alt
                .reason
                .as_deref()
                .or(alt.description.as_deref())
                .unwrap_or("");
            let _ = writeln!(out, "{}. **{}** - {}", i + 1, alt.name, detail);
        }
    }

    out.push('\n');
    out.push_str(&footer());
    out
}

pub fn render_rate_limit(body: &RateLimitBody, reset_header: Option<&str>, has_key: bool) -> String {
    let mut out = String::from("⏳ **Recommendation Limit Reached**\n\n");

    match body.message.as_deref() {
        Some(message) => {
            let _ = write!(out, "{message}\n\n");
        }
        None if has_key => out.push_str("Your plan's recommendation quota has been used up.\n\n"),
        None => {
            let limit = body.limit.unwrap_or(3);
            let _ = write!(
                out,
                "The free tier allows {limit} AI recommendations per day, and today's quota has been used.\n\n"
            );
        }
    }

    match body.reset_at.as_deref().or(reset_header) {
        Some(reset) => {
            let _ = write!(out, "**Quota resets:** {reset}\n\n");
        }
        None => out.push_str("**Quota resets:** daily\n\n"),
    }

    if has_key {
        let _ = write!(
            out,
            "Manage your plan and usage at {SETTINGS_URL}\n\n"
        );
    } else {
        let _ = write!(
            out,
            "**Need more?** Upgrade to ArchitectGBT Pro for unlimited recommendations: {PRICING_URL}\n\
             Already Pro? Get your API key at {SETTINGS_URL} and set `{API_KEY_ENV}` in your MCP config.\n\n"
        );
    }

    out.push_str(
        "Meanwhile you can still:\n\
         - Use `list_models` to browse available models\n\
         - Use `get_code_template` to get integration code for any model",
    );
    out
}

/// 401/405 without an API key configured.
pub fn render_auth_required(prompt: &str) -> String {
    format!(
        "❌ **Authentication Required**\n\n\
         The ArchitectGBT API requires authentication. To get AI model recommendations:\n\n\
         1. Visit {SITE_URL}\n\
         2. Sign up for a free account\n\
         3. Use the website directly for personalized recommendations\n\n\
         Alternatively, you can:\n\
         - Use `list_models` to browse available models\n\
         - Use `get_code_template` to get integration code for any model\n\n\
         For your query: \"{prompt}\"\n\
         I recommend visiting the website for a personalized analysis."
    )
}

/// 401/405 with an API key configured.
pub fn render_key_rejected(status: u16) -> String {
    format!(
        "🔑 **API Key Rejected**\n\n\
         The ArchitectGBT API did not accept the configured API key (HTTP {status}).\n\n\
         To fix it:\n\
         1. Check or regenerate your key at {SETTINGS_URL}\n\
         2. Update `{API_KEY_ENV}` in your MCP config and restart your IDE\n\n\
         Or remove `{API_KEY_ENV}` to use the free tier (3 recommendations/day)."
    )
}

fn cost_line(input: Option<f64>, output: Option<f64>) -> Option<String> {
    match (input, output) {
        (None, None) => None,
        (input, output) => Some(format!(
            "${}/1M input, ${}/1M output",
            input.map(price).unwrap_or_else(|| "?".into()),
            output.map(price).unwrap_or_else(|| "?".into()),
        )),
    }
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(out, "\n**{heading}:**\n");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

fn push_usage(out: &mut String, usage: Option<&UsageInfo>) {
    if let Some(UsageInfo {
        remaining: Some(remaining),
        limit,
    }) = usage
    {
        match limit {
            Some(limit) => {
                let _ = write!(
                    out,
                    "*Free tier: {remaining} of {limit} recommendations left today.*\n\n"
                );
            }
            None => {
                let _ = write!(out, "*{remaining} recommendations left today.*\n\n");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(name: &str, reasoning: &str) -> ModelSuggestion {
        ModelSuggestion {
            name: name.into(),
            provider: Some("Anthropic".into()),
            model_id: Some("claude-sonnet-4".into()),
            input_price: Some(3.0),
            output_price: Some(15.0),
            context_window: Some(200_000),
            pros: vec!["Excellent reasoning".into()],
            cons: vec!["Higher cost".into()],
            reasoning: Some(reasoning.into()),
        }
    }

    #[test]
    fn test_ranked_top_pick_details() {
        let text = render_ranked(&[suggestion("Claude Sonnet 4", "Great at support")], None, None);
        assert!(text.contains("### 🏆 Top Pick: Claude Sonnet 4"));
        assert!(text.contains("- **Cost:** $3/1M input, $15/1M output"));
        assert!(text.contains("- **Context Window:** 200,000 tokens"));
        assert!(text.contains("- Excellent reasoning"));
        assert!(text.contains("- Higher cost"));
        assert!(text.contains("Great at support"));
        assert!(text.ends_with(&footer()));
    }

    #[test]
    fn test_ranked_shows_two_truncated_alternatives() {
        let long = "x".repeat(300);
        let recs = vec![
            suggestion("A", "top"),
            suggestion("B", &long),
            suggestion("C", "short"),
            suggestion("D", "never shown"),
        ];
        let text = render_ranked(&recs, None, None);
        assert!(text.contains("1. **B**"));
        assert!(text.contains("2. **C**"));
        assert!(!text.contains("**D**"));
        assert!(text.contains(&format!("{}...", "x".repeat(120))));
        assert!(!text.contains(&"x".repeat(121)));
    }

    #[test]
    fn test_ranked_empty_list() {
        let text = render_ranked(&[], Some("Summary"), None);
        assert!(text.contains("No models matched"));
        assert!(text.contains("Summary"));
    }

    #[test]
    fn test_usage_footer() {
        let usage = UsageInfo {
            remaining: Some(2),
            limit: Some(3),
        };
        let text = render_ranked(&[suggestion("A", "r")], None, Some(&usage));
        assert!(text.contains("Free tier: 2 of 3 recommendations left today."));
    }

    #[test]
    fn test_clarification_lists_questions() {
        let text = render_clarification(None, &["What volume?".to_string(), "Which languages?".to_string()]);
        assert!(text.contains("1. What volume?"));
        assert!(text.contains("2. Which languages?"));
        assert!(text.contains("get_ai_recommendation"));
    }

    #[test]
    fn test_single_layout() {
        let model = RecommendedModel {
            name: "GPT-4o".into(),
            provider: Some("OpenAI".into()),
            model_id: None,
            input_price: Some(2.5),
            output_price: Some(10.0),
            context_window: Some(128_000),
        };
        let alternatives = vec![Alternative {
            name: "Claude".into(),
            reason: None,
            description: Some("Strong writer".into()),
        }];
        let text = render_single(&model, Some("Balanced choice"), &alternatives);
        assert!(text.contains("### Recommended: GPT-4o"));
        assert!(text.contains("- **Model ID:** N/A"));
        assert!(text.contains("- **Pricing:** $2.5/1M input, $10/1M output"));
        assert!(text.contains("### Why This Model?\nBalanced choice"));
        assert!(text.contains("1. **Claude** - Strong writer"));
    }

    #[test]
    fn test_rate_limit_prefers_body_reset() {
        let body = RateLimitBody {
            message: None,
            reset_at: Some("2026-10-19T00:00:00Z".into()),
            limit: None,
        };
        let text = render_rate_limit(&body, Some("3600"), false);
        assert!(text.contains("**Quota resets:** 2026-10-19T00:00:00Z"));
        assert!(text.contains(PRICING_URL));
        assert!(text.contains("3 AI recommendations per day"));
    }

    #[test]
    fn test_rate_limit_falls_back_to_header() {
        let text = render_rate_limit(&RateLimitBody::default(), Some("3600"), true);
        assert!(text.contains("**Quota resets:** 3600"));
        assert!(!text.contains(PRICING_URL));
    }

    #[test]
    fn test_key_rejected_mentions_env_var() {
        let text = render_key_rejected(401);
        assert!(text.contains("ARCHITECTGBT_API_KEY"));
        assert!(text.contains("HTTP 401"));
    }

    #[test]
    fn test_auth_required_echoes_prompt() {
        let text = render_auth_required("invoice OCR");
        assert!(text.contains("For your query: \"invoice OCR\""));
    }
}
