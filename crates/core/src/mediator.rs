//! Glue between prompt selection, variable collection and insertion
//!
//! ```text
//! Idle --select(no variables)--> insert --> Idle
//! Idle --select(variables)-----> AwaitingValues
//! AwaitingValues --submit------> substitute --> insert --> Idle
//! AwaitingValues --cancel------> Idle
//! ```
//!
//! Nothing here writes to storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, warn};

use crate::adapter::{InputAdapter, InsertOutcome, PanelHandle};
use crate::errors::{DockError, Result};
use crate::store::{Prompt, PromptStorage};
use crate::variables::{extract_variables, replace_variables};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SelectionState {
    #[default]
    Idle,
    AwaitingValues { prompt: Prompt, variables: Vec<String> },
}

/// What happened after [`Mediator::select`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The prompt had no variables and went straight to the adapter
    Inserted(InsertOutcome),
    /// The UI must collect these values and call [`Mediator::submit`]
    NeedsValues(Vec<String>),
}

pub struct Mediator {
    storage: Arc<PromptStorage>,
    adapter: InputAdapter,
    panel:   Arc<dyn PanelHandle>,
    state:   Mutex<SelectionState>,
}

impl Mediator {
    pub fn new(storage: Arc<PromptStorage>, adapter: InputAdapter, panel: Arc<dyn PanelHandle>) -> Self {
        Self {
            storage,
            adapter,
            panel,
            state: Mutex::new(SelectionState::Idle),
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state.lock().unwrap().clone()
    }

    pub fn adapter(&self) -> &InputAdapter {
        &self.adapter
    }

    /// A prompt was picked in the widget
    pub async fn select(&self, uuid: &str) -> Result<SelectOutcome> {
        let prompt = self
            .storage
            .get_prompt(uuid)
            .await
            .ok_or_else(|| DockError::PromptNotFound(uuid.to_string()))?;

        let variables = extract_variables(&prompt.content);
        if variables.is_empty() {
            self.set_state(SelectionState::Idle);
            return Ok(SelectOutcome::Inserted(self.deliver(&prompt.content).await?));
        }

        debug!(uuid = %uuid, ?variables, "awaiting variable values");
        self.set_state(SelectionState::AwaitingValues {
            prompt,
            variables: variables.clone(),
        });
        Ok(SelectOutcome::NeedsValues(variables))
    }

    /// Values collected for the awaiting prompt
    pub async fn submit(&self, values: HashMap<String, String>) -> Result<InsertOutcome> {
        let previous = std::mem::take(&mut *self.state.lock().unwrap());
        let SelectionState::AwaitingValues { prompt, variables } = previous else {
            return Err(DockError::ValidationError(
                "No prompt is waiting for variable values".to_string(),
            ));
        };

        let missing: Vec<&String> = variables.iter().filter(|v| !values.contains_key(*v)).collect();
        if !missing.is_empty() {
            warn!(?missing, "submitting without every variable");
        }

        let text = replace_variables(&prompt.content, &values);
        self.deliver(&text).await
    }

    /// Back out of value collection; nothing is persisted
    pub fn cancel(&self) {
        self.set_state(SelectionState::Idle);
    }

    fn set_state(&self, next: SelectionState) {
        *self.state.lock().unwrap() = next;
    }

    async fn deliver(&self, text: &str) -> Result<InsertOutcome> {
        let input = self.adapter.wait_default().await?;
        Ok(self
            .adapter
            .insert_prompt(Some(&input), text, Some(self.panel.as_ref()))
            .await)
    }
}
