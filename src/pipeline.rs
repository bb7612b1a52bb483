//! Validate, build prompt, generate, interpret.

use tracing::info;

use crate::generation::{ClientStatus, GenerationClient};
use crate::outcome::{GenerationResult, interpret};
use crate::prompt::{Choices, Selection, build_prompt, validate};

/// The whole request path, holding the shared client.
#[derive(Debug)]
pub struct Pipeline {
    client: GenerationClient,
}

impl Pipeline {
    /// Wraps an already-constructed client.
    pub fn new(client: GenerationClient) -> Self {
        Self { client }
    }

    /// Status of the underlying client.
    pub fn status(&self) -> ClientStatus {
        self.client.status()
    }

    /// Runs a generation for a list of labels.
    pub async fn run(&self, selection: &Selection) -> GenerationResult {
        if let Err(err) = validate(selection) {
            info!("Rejected selection: {}", err);
            return err.into();
        }

        let prompt = build_prompt(selection);
        info!("Generated prompt: {}", prompt);

        match self.client.generate(&prompt).await {
            Ok(outcome) => interpret(outcome),
            Err(err) => err.into(),
        }
    }

    /// Runs a generation from a label to ticked map.
    ///
    /// Counts the ticked labels itself, and rejects with the count if it's off.
    pub async fn run_choices(&self, choices: &Choices) -> GenerationResult {
        self.run(&choices.selection()).await
    }
}
