use crate::{
    classify::SubmissionClassificationInput,
    codeforces::client::LookupError,
    contest::ContestId,
    options::Options,
    service::ContestService,
    store::StoreError,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

const MESSAGE_TYPES: [&str; 5] = [
    "getContestMetadata",
    "classifySubmission",
    "getOptions",
    "setOptions",
    "clearCache",
];

/// A command sent by a client, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    GetContestMetadata {
        #[serde(default, rename = "contestId")]
        contest_id: Option<ContestId>,
    },
    ClassifySubmission {
        #[serde(default)]
        payload: Option<SubmissionClassificationInput>,
    },
    GetOptions,
    SetOptions {
        #[serde(default)]
        options: Option<Options>,
    },
    ClearCache,
}

/// Why a command failed. The `Display` form is the `error` field of the response.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("invalid-message")]
    InvalidMessage,
    #[error("unknown-type")]
    UnknownType,
    #[error("{0}")]
    LookupError(#[from] LookupError),
    #[error("{0}")]
    StoreError(#[from] StoreError),
}

impl Message {
    /// Read a command out of a raw JSON message.
    pub fn parse(value: Value) -> Result<Self, MessageError> {
        let known = match value.get("type").and_then(Value::as_str) {
            Some(kind) if !kind.is_empty() => MESSAGE_TYPES.contains(&kind),
            _ => return Err(MessageError::InvalidMessage),
        };
        if !known {
            return Err(MessageError::UnknownType);
        }

        serde_json::from_value(value).map_err(|e| {
            tracing::warn!("malformed message: {}", e);
            MessageError::InvalidMessage
        })
    }
}

async fn handle(service: &ContestService, message: Message) -> Result<Value, MessageError> {
    match message {
        Message::GetContestMetadata { contest_id } => {
            let contest_id = contest_id.ok_or(LookupError::NoContestId)?;
            let record = service.get_contest_metadata(&contest_id).await?;
            let mut response = json!({ "ok": true });
            if let (Value::Object(response), Ok(Value::Object(record))) =
                (&mut response, serde_json::to_value(&record))
            {
                response.extend(record);
            }
            Ok(response)
        }
        Message::ClassifySubmission { payload } => {
            let payload = payload.unwrap_or_default();
            let label = service.classify_submission(&payload).await;
            Ok(json!({ "ok": true, "label": label }))
        }
        Message::GetOptions => {
            let options = service.get_options().await;
            Ok(json!({ "ok": true, "options": options }))
        }
        Message::SetOptions { options } => {
            service.set_options(&options.unwrap_or_default()).await?;
            Ok(json!({ "ok": true }))
        }
        Message::ClearCache => {
            service.clear_cache().await?;
            Ok(json!({ "ok": true }))
        }
    }
}

/// Answer one raw message with `{"ok": true, ..}` or `{"ok": false, "error": ..}`.
pub async fn dispatch(service: &ContestService, message: Value) -> Value {
    let result = match Message::parse(message) {
        Ok(message) => handle(service, message).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("message failed: {:?}", e);
            json!({ "ok": false, "error": e.to_string() })
        }
    }
}
