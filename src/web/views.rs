use super::prelude::*;
use crate::catalog;
use crate::generation::ClientStatus;
use crate::outcome::GenerationResult;
use crate::prompt::Choices;

#[derive(Clone, Debug)]
pub(crate) struct LabelView {
    pub(crate) number: String,
    pub(crate) id: &'static str,
    pub(crate) phrase: &'static str,
    pub(crate) checked: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct GroupView {
    pub(crate) title: &'static str,
    pub(crate) labels: Vec<LabelView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub(crate) struct IndexTemplate {
    pub(crate) groups: Vec<GroupView>,
    pub(crate) api_ready: bool,
    pub(crate) api_reason: String,
    pub(crate) has_result: bool,
    pub(crate) result_kind: String,
    pub(crate) result_message: String,
    pub(crate) has_image: bool,
    pub(crate) image_uri: String,
    pub(crate) image_prompt: String,
}

impl IndexTemplate {
    pub(crate) fn new(state: &AppState, choices: &Choices, result: Option<GenerationResult>) -> Self {
        let mut number = 0;
        let groups = catalog::groups()
            .into_iter()
            .map(|(group, labels)| GroupView {
                title: group.title(),
                labels: labels
                    .into_iter()
                    .map(|label| {
                        number += 1;
                        LabelView {
                            number: format!("{number:02}"),
                            id: label.id,
                            phrase: label.phrase,
                            checked: choices.is_chosen(label.id),
                        }
                    })
                    .collect(),
            })
            .collect();

        let (api_ready, api_reason) = match state.pipeline.status() {
            ClientStatus::Ready { .. } => (true, String::new()),
            ClientStatus::Disabled { reason } => (false, reason),
        };

        let image = result.as_ref().and_then(GenerationResult::image);
        Self {
            groups,
            api_ready,
            api_reason,
            has_result: result.is_some(),
            result_kind: result
                .as_ref()
                .map(|result| result.kind().to_string())
                .unwrap_or_default(),
            result_message: result
                .as_ref()
                .and_then(|result| result.message())
                .unwrap_or_default()
                .to_string(),
            has_image: image.is_some(),
            image_uri: image.map(|image| image.data_uri()).unwrap_or_default(),
            image_prompt: image.map(|image| image.prompt.clone()).unwrap_or_default(),
        }
    }
}

/// handles the / GET
pub(crate) async fn index_handler(State(state): State<AppState>) -> IndexTemplate {
    IndexTemplate::new(&state, &Choices::new(), None)
}

/// Ticked checkboxes arrive as `<label>=on`, anything else is ignored.
pub(crate) fn choices_from_form(pairs: &[(String, String)]) -> Choices {
    let mut choices = Choices::new();
    for (key, value) in pairs {
        let ticked = matches!(value.as_str(), "on" | "true" | "1");
        choices.set(key, ticked);
    }
    choices
}

/// handles the /generate POST
pub(crate) async fn generate_form_handler(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> IndexTemplate {
    let choices = choices_from_form(&pairs);
    info!("Generate requested with {} labels", choices.chosen_count());
    let result = state.pipeline.run_choices(&choices).await;
    IndexTemplate::new(&state, &choices, Some(result))
}
