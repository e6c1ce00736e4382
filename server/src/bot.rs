//! Bot Framework activities for the messaging extension and task modules.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::EnumString;

use learnnow_core::model;

pub const COMPOSE_EXTENSION_QUERY: &str = "composeExtension/query";
pub const TASK_FETCH: &str = "task/fetch";
pub const MAX_QUERY_RESULTS: i64 = 25;
const SEARCH_TEXT_PARAMETER: &str = "searchText";
const HERO_CARD: &str = "application/vnd.microsoft.card.hero";
const THUMBNAIL_CARD: &str = "application/vnd.microsoft.card.thumbnail";
pub const APOLOGY: &str = "Sorry, it looks like something went wrong. Please try again.";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub name: Option<String>,
    #[serde(default)]
    pub value: Value,
    pub from: Option<ChannelAccount>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAccount {
    pub id: Option<String>,
    pub name: Option<String>,
    pub aad_object_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum SearchCommand {
    Resources,
    LearningModules,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct QueryParameter {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct QueryOptions {
    pub skip: Option<i64>,
    pub count: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessagingExtensionQuery {
    pub command_id: String,
    #[serde(default)]
    pub parameters: Vec<QueryParameter>,
    #[serde(default)]
    pub query_options: QueryOptions,
}

impl MessagingExtensionQuery {
    pub fn command(&self) -> eyre::Result<SearchCommand> {
        self.command_id
            .parse()
            .map_err(|_| eyre::eyre!("unknown messaging extension command '{}'", self.command_id))
    }

    /// None on the initial run, when Teams sends no text
    pub fn search_text(&self) -> Option<String> {
        self.parameters
            .iter()
            .find(|p| p.name == SEARCH_TEXT_PARAMETER)
            .and_then(|p| p.value.as_str())
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
    }

    /// (skip, count), count clamped to 1..=MAX_QUERY_RESULTS
    pub fn window(&self) -> (i64, i64) {
        let skip = self.query_options.skip.unwrap_or(0).max(0);
        let count = self
            .query_options
            .count
            .unwrap_or(MAX_QUERY_RESULTS)
            .clamp(1, MAX_QUERY_RESULTS);
        (skip, count)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewTarget {
    pub resource_id: Option<String>,
    pub learning_module_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TaskModuleRequest {
    #[serde(default)]
    pub data: PreviewTarget,
}

/// What a search hit shows on its card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContent {
    pub title: String,
    pub text: String,
    pub image_url: String,
    pub target: PreviewTarget,
}

impl CardContent {
    pub fn from_resource(resource: &model::Resource) -> CardContent {
        CardContent {
            title: resource.title.clone(),
            text: resource.description.clone(),
            image_url: resource.image_url.clone(),
            target: PreviewTarget {
                resource_id: Some(resource.id.0.as_hyphenated().to_string()),
                learning_module_id: None,
            },
        }
    }

    pub fn from_learning_module(learning_module: &model::LearningModule) -> CardContent {
        CardContent {
            title: learning_module.title.clone(),
            text: learning_module.description.clone(),
            image_url: learning_module.image_url.clone(),
            target: PreviewTarget {
                resource_id: None,
                learning_module_id: Some(learning_module.id.0.as_hyphenated().to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessagingExtensionAttachment {
    pub content_type: &'static str,
    pub content: Value,
    pub preview: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessagingExtensionResult {
    #[serde(rename = "type")]
    pub result_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_layout: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<MessagingExtensionAttachment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessagingExtensionResponse {
    pub compose_extension: MessagingExtensionResult,
}

fn target_value(target: &PreviewTarget) -> Value {
    let mut data = serde_json::Map::new();
    if let Some(id) = &target.resource_id {
        data.insert("resourceId".to_owned(), Value::String(id.clone()));
    }
    if let Some(id) = &target.learning_module_id {
        data.insert("learningModuleId".to_owned(), Value::String(id.clone()));
    }
    json!({ "type": TASK_FETCH, "data": data })
}

fn attachment(card: &CardContent) -> MessagingExtensionAttachment {
    let tap = json!({
        "type": "invoke",
        "value": target_value(&card.target),
    });
    MessagingExtensionAttachment {
        content_type: HERO_CARD,
        content: json!({
            "title": card.title,
            "text": card.text,
            "images": [{ "url": card.image_url }],
            "tap": tap,
        }),
        preview: json!({
            "contentType": THUMBNAIL_CARD,
            "content": {
                "title": card.title,
                "text": card.text,
                "images": [{ "url": card.image_url }],
                "tap": tap,
            },
        }),
    }
}

/// One hero card per hit, list layout
pub fn query_response(cards: &[CardContent]) -> MessagingExtensionResponse {
    MessagingExtensionResponse {
        compose_extension: MessagingExtensionResult {
            result_type: "result",
            attachment_layout: Some("list"),
            attachments: Some(cards.iter().map(attachment).collect()),
            text: None,
        },
    }
}

pub fn message_response(text: impl Into<String>) -> MessagingExtensionResponse {
    MessagingExtensionResponse {
        compose_extension: MessagingExtensionResult {
            result_type: "message",
            attachment_layout: None,
            attachments: None,
            text: Some(text.into()),
        },
    }
}

/// `{app_base_url}/previewcontent?...` for the task module
pub fn preview_url(app_base_url: &str, target: &PreviewTarget) -> eyre::Result<String> {
    match (&target.resource_id, &target.learning_module_id) {
        (Some(id), _) => Ok(format!(
            "{}/previewcontent?resourceId={}",
            app_base_url,
            parse_guid(id)?
        )),
        (None, Some(id)) => Ok(format!(
            "{}/previewcontent?learningModuleId={}",
            app_base_url,
            parse_guid(id)?
        )),
        (None, None) => Err(eyre::eyre!("task/fetch without resourceId or learningModuleId")),
    }
}

fn parse_guid(id: &str) -> eyre::Result<String> {
    let id = uuid::Uuid::parse_str(id).map_err(|_| eyre::eyre!("invalid id '{}'", id))?;
    Ok(id.as_hyphenated().to_string())
}

pub fn task_module_response(title: &str, url: &str) -> Value {
    json!({
        "task": {
            "type": "continue",
            "value": {
                "title": title,
                "url": url,
                "fallbackUrl": url,
                "height": "large",
                "width": "large",
            }
        }
    })
}
