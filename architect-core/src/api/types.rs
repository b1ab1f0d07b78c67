use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum::VariantArray;

use crate::api::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, VariantArray)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Low,
    Medium,
    High,
    Unlimited,
}

impl Budget {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Unlimited => "unlimited",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, VariantArray)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Cost,
    Speed,
    Quality,
    Balanced,
}

impl Priority {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cost => "cost",
            Self::Speed => "speed",
            Self::Quality => "quality",
            Self::Balanced => "balanced",
        }
    }
}

/// Body of the recommendation POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// Raw outcome of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: String,
    /// `x-ratelimit-reset` or `retry-after` header, when present
    pub reset_header: Option<String>,
}

impl ApiReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            reset_header: None,
        }
    }

    pub fn with_reset_header(mut self, value: impl Into<String>) -> Self {
        self.reset_header = Some(value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

// ---------------------------------------------------------------------------
// Recommendation responses
// ---------------------------------------------------------------------------

/// One ranked suggestion from the recommendation service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelSuggestion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, alias = "modelId")]
    pub model_id: Option<String>,
    /// USD per 1M input tokens
    #[serde(default, alias = "inputPrice", deserialize_with = "lenient_number")]
    pub input_price: Option<f64>,
    /// USD per 1M output tokens
    #[serde(default, alias = "outputPrice", deserialize_with = "lenient_number")]
    pub output_price: Option<f64>,
    #[serde(default, alias = "contextWindow", deserialize_with = "lenient_count")]
    pub context_window: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pros: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cons: Vec<String>,
    #[serde(default, alias = "reason")]
    pub reasoning: Option<String>,
}

/// Free-tier quota reported alongside a successful recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UsageInfo {
    #[serde(default, deserialize_with = "lenient_count")]
    pub remaining: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub limit: Option<u64>,
}

/// Model record of the single-recommendation layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecommendedModel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, alias = "modelId")]
    pub model_id: Option<String>,
    #[serde(default, alias = "inputPrice", deserialize_with = "lenient_number")]
    pub input_price: Option<f64>,
    #[serde(default, alias = "outputPrice", deserialize_with = "lenient_number")]
    pub output_price: Option<f64>,
    #[serde(default, alias = "contextWindow", deserialize_with = "lenient_count")]
    pub context_window: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Alternative {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Decoded body of a successful recommendation call.
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationReply {
    /// The service needs more detail before it can rank models
    Clarification {
        message: Option<String>,
        questions: Vec<String>,
    },
    Ranked {
        recommendations: Vec<ModelSuggestion>,
        summary: Option<String>,
        usage: Option<UsageInfo>,
    },
    Single {
        model: RecommendedModel,
        reasoning: Option<String>,
        alternatives: Vec<Alternative>,
    },
}

impl RecommendationReply {
    /// Decode a response body, failing on any layout this client does not know.
    pub fn decode(value: Value) -> Result<Self, ApiError> {
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Err(ApiError::UnexpectedShape(format!(
                    "Expected object but got {}. API might have changed.",
                    json_type_name(&other)
                )));
            }
        };

        // `{success: true, data: {...}}` wraps the real payload
        if is_true(obj.get("success")) && obj.get("data").is_some_and(Value::is_object) {
            if let Some(inner) = obj.remove("data") {
                return Self::decode(inner);
            }
        }

        if is_true(obj.get("needs_clarification"))
            || is_true(obj.get("needsClarification"))
            || obj.get("type").and_then(Value::as_str) == Some("clarification")
        {
            let message = first_string(
                &obj,
                &["message", "clarification_question", "clarificationQuestion", "question"],
            );
            let questions = match obj.remove("questions") {
                Some(v) => serde_json::from_value::<Vec<String>>(v)?,
                None => Vec::new(),
            };
            return Ok(Self::Clarification { message, questions });
        }

        if let Some(list) = obj.remove("recommendations") {
            if !list.is_array() {
                return Err(ApiError::UnexpectedShape(format!(
                    "Expected recommendations array but got {}. API might have changed.",
                    json_type_name(&list)
                )));
            }
            let recommendations: Vec<ModelSuggestion> = serde_json::from_value(list)?;
            let usage = match obj.remove("usage") {
                Some(v) if v.is_object() => Some(serde_json::from_value(v)?),
                _ => None,
            };
            let summary = first_string(&obj, &["summary", "reasoning"]);
            return Ok(Self::Ranked {
                recommendations,
                summary,
                usage,
            });
        }

        if obj.get("model").is_some_and(Value::is_object) {
            let model: RecommendedModel =
                serde_json::from_value(obj.remove("model").unwrap_or(Value::Null))?;
            let reasoning = first_string(&obj, &["reasoning"]);
            let alternatives = match obj.remove("alternatives") {
                Some(Value::Null) | None => Vec::new(),
                Some(v) => serde_json::from_value(v)?,
            };
            return Ok(Self::Single {
                model,
                reasoning,
                alternatives,
            });
        }

        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        Err(ApiError::UnexpectedShape(format!(
            "Unrecognized recommendation response (fields: {}). API might have changed.",
            if keys.is_empty() {
                "none".to_string()
            } else {
                keys.join(", ")
            }
        )))
    }
}

/// Body of a 429 response. Every field is optional, and the service has
/// used several spellings for each, sometimes more than one in a body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitBody {
    pub message: Option<String>,
    pub reset_at: Option<String>,
    pub limit: Option<u64>,
}

impl RateLimitBody {
    /// Lenient parse; a body that is not a JSON object yields empty fields.
    pub fn parse(body: &str) -> Self {
        let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) else {
            return Self::default();
        };

        let reset_at = ["reset_at", "resetAt", "reset_time", "resetTime"]
            .iter()
            .filter_map(|key| obj.get(*key))
            .find_map(|value| match value {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        Self {
            message: first_string(&obj, &["message", "error"]),
            reset_at,
            limit: obj.get("limit").and_then(count_value),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CatalogModel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub provider: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub input_cost_per_1k: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub output_cost_per_1k: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub context_window: Option<u64>,
}

/// The two accepted layouts of the catalog response.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEnvelope {
    Bare(Vec<CatalogModel>),
    Wrapped(Vec<CatalogModel>),
}

impl CatalogEnvelope {
    pub fn decode(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Array(_) => Ok(Self::Bare(serde_json::from_value(value)?)),
            Value::Object(mut obj)
                if is_true(obj.get("success")) && obj.get("data").is_some_and(Value::is_array) =>
            {
                let data = obj.remove("data").unwrap_or(Value::Null);
                Ok(Self::Wrapped(serde_json::from_value(data)?))
            }
            other => Err(ApiError::UnexpectedShape(format!(
                "Expected array but got {}. API might have changed.",
                json_type_name(&other)
            ))),
        }
    }

    pub fn into_models(self) -> Vec<CatalogModel> {
        match self {
            Self::Bare(models) | Self::Wrapped(models) => models,
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

/// `null` decodes as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Prices arrive as numbers or numeric strings; anything else is unknown.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(number_value))
}

/// Counts arrive as integers, floats (`200000.0`) or numeric strings.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(count_value))
}

fn number_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn count_value(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    number_value(value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u64)
}

fn is_true(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
