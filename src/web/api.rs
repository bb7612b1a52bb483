//! JSON endpoints, for callers that aren't the HTML form.

use axum::extract::rejection::JsonRejection;
use axum::response::Response;

use super::prelude::*;
use crate::catalog::{self, LabelGroup};
use crate::generation::ClientStatus;
use crate::outcome::GenerationResult;
use crate::prompt::Selection;

#[derive(Serialize, Debug)]
pub(crate) struct LabelEntry {
    id: &'static str,
    phrase: &'static str,
}

#[derive(Serialize, Debug)]
pub(crate) struct GroupEntry {
    group: LabelGroup,
    title: &'static str,
    labels: Vec<LabelEntry>,
}

/// handles the /api/labels GET
pub(crate) async fn labels_handler() -> Json<Vec<GroupEntry>> {
    Json(
        catalog::groups()
            .into_iter()
            .map(|(group, labels)| GroupEntry {
                group,
                title: group.title(),
                labels: labels
                    .into_iter()
                    .map(|label| LabelEntry {
                        id: label.id,
                        phrase: label.phrase,
                    })
                    .collect(),
            })
            .collect(),
    )
}

#[derive(Deserialize, Debug)]
pub(crate) struct GenerateRequest {
    labels: Vec<String>,
}

#[derive(Serialize, Debug)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(crate) enum GenerateResponse {
    Image {
        prompt: String,
        mime_type: &'static str,
        width: u32,
        height: u32,
        image_base64: String,
    },
    Rejected {
        message: String,
    },
    Filtered {
        message: String,
    },
    Error {
        message: String,
    },
}

impl From<GenerationResult> for GenerateResponse {
    fn from(result: GenerationResult) -> Self {
        match result {
            GenerationResult::Image(image) => GenerateResponse::Image {
                mime_type: image.mime_type(),
                width: image.width,
                height: image.height,
                image_base64: image.to_base64(),
                prompt: image.prompt,
            },
            GenerationResult::Rejected(message) => GenerateResponse::Rejected { message },
            GenerationResult::Filtered(message) => GenerateResponse::Filtered { message },
            GenerationResult::Failed(message) => GenerateResponse::Error { message },
        }
    }
}

/// handles the /api/generate POST
pub(crate) async fn generate_api_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let selection = Selection::new(request.labels);
    info!("API generate requested with {} labels", selection.len());

    let result = state.pipeline.run(&selection).await;
    let status = match &result {
        GenerationResult::Image(_) | GenerationResult::Filtered(_) => StatusCode::OK,
        GenerationResult::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GenerationResult::Failed(_) => match state.pipeline.status() {
            ClientStatus::Ready { .. } => StatusCode::BAD_GATEWAY,
            ClientStatus::Disabled { .. } => StatusCode::SERVICE_UNAVAILABLE,
        },
    };
    Ok((status, Json(GenerateResponse::from(result))).into_response())
}
