//! Turning a user's chosen labels into an English prompt.

use std::collections::HashMap;

use tracing::debug;

use crate::catalog;
use crate::constants::{PROMPT_SEPARATOR, PROMPT_SUFFIX, REQUIRED_SELECTIONS};

/// Labels chosen for a single generation attempt, in the order they were given.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Selection(Vec<String>);

impl Selection {
    /// Builds a selection from anything yielding label identifiers.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    /// Number of labels in the selection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The labels, in order.
    pub fn labels(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Which catalog labels are ticked.
///
/// Keyed by label identifier, so the order widgets were rendered in doesn't matter.
#[derive(Clone, Debug, Default)]
pub struct Choices {
    chosen: HashMap<&'static str, bool>,
}

impl Choices {
    /// No labels chosen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as chosen or not. Returns false (and does nothing) for unknown labels.
    pub fn set(&mut self, id: &str, chosen: bool) -> bool {
        match catalog::find(id) {
            Some(label) => {
                self.chosen.insert(label.id, chosen);
                true
            }
            None => {
                debug!("Ignoring unknown label {id:?}");
                false
            }
        }
    }

    /// Builder-style version of [`Choices::set`] with `chosen = true`.
    pub fn with(mut self, id: &str) -> Self {
        self.set(id, true);
        self
    }

    /// Whether `id` is currently chosen.
    pub fn is_chosen(&self, id: &str) -> bool {
        self.chosen.get(id).copied().unwrap_or(false)
    }

    /// How many labels are chosen.
    pub fn chosen_count(&self) -> usize {
        self.chosen.values().filter(|chosen| **chosen).count()
    }

    /// Chosen labels in catalog order.
    pub fn selection(&self) -> Selection {
        catalog::labels()
            .iter()
            .filter(|label| self.is_chosen(label.id))
            .map(|label| label.id)
            .collect()
    }
}

impl<'a> FromIterator<&'a str> for Choices {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut choices = Self::new();
        for id in iter {
            choices.set(id, true);
        }
        choices
    }
}

/// The text sent to the image service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Prompt(String);

impl Prompt {
    /// The prompt text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Prompt> for String {
    fn from(prompt: Prompt) -> Self {
        prompt.0
    }
}

/// Why a selection can't be used.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Wrong number of labels
    #[error("Please select exactly {required} options (currently selected: {selected})")]
    WrongCount {
        /// How many labels were selected.
        selected: usize,
        /// How many are needed.
        required: usize,
    },
    /// Not a catalog label
    #[error("Unknown option: {0}")]
    UnknownLabel(String),
    /// Same label given twice
    #[error("Option selected more than once: {0}")]
    Duplicate(String),
}

/// Checks the selection has exactly [`REQUIRED_SELECTIONS`] distinct catalog labels.
///
/// The count is checked first, so its message wins when several things are wrong.
pub fn validate(selection: &Selection) -> Result<(), ValidationError> {
    if selection.len() != REQUIRED_SELECTIONS {
        return Err(ValidationError::WrongCount {
            selected: selection.len(),
            required: REQUIRED_SELECTIONS,
        });
    }
    for (index, label) in selection.labels().iter().enumerate() {
        if !catalog::contains(label) {
            return Err(ValidationError::UnknownLabel(label.clone()));
        }
        if selection.labels()[..index].contains(label) {
            return Err(ValidationError::Duplicate(label.clone()));
        }
    }
    Ok(())
}

/// Translates and joins the selected labels, then appends the quality suffix.
///
/// Doesn't check the count, call [`validate`] first. Order is preserved.
pub fn build_prompt(selection: &Selection) -> Prompt {
    let terms: Vec<&str> = selection
        .labels()
        .iter()
        .map(|label| catalog::translate(label))
        .collect();
    Prompt(format!("{}{}", terms.join(PROMPT_SEPARATOR), PROMPT_SUFFIX))
}
