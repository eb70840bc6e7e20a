//! Admin editor state machine.
//!
//! The editor holds the last catalog the server accepted and at most one open
//! form. Every change is computed locally through the mutation engine and
//! sent as a whole-catalog replace; the local copy only moves forward when the
//! server confirms the save.
//!
//! ```text
//! Loading ──► LoadFailed ──(retry)──► Loading
//!    │
//!    ▼
//!  Idle ◄──► Editing (one open form)
//!    │  ▲        │
//!    ▼  │        ▼
//!   Saving ──(failure)──► state before the save
//! ```

use std::fmt;

use denial_catalog::{CatalogMutation, MutationError};
use denial_core::Catalog;

use crate::client::{CatalogApi, ClientError};

/// Coarse editor phase, used for transition checks and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorPhase {
    /// Initial fetch in progress.
    Loading,
    /// Initial fetch failed; blocking until retried.
    LoadFailed,
    /// Catalog loaded, no form open.
    Idle,
    /// One add or edit form is open.
    Editing,
    /// A replace request is outstanding.
    Saving,
}

impl EditorPhase {
    /// Returns true once a catalog has been loaded.
    #[must_use]
    pub const fn is_loaded(self) -> bool {
        matches!(self, Self::Idle | Self::Editing | Self::Saving)
    }

    /// Returns true if the transition from self to target is valid.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        match self {
            Self::Loading => matches!(target, Self::Idle | Self::LoadFailed),
            Self::LoadFailed => matches!(target, Self::Loading),
            Self::Idle => matches!(target, Self::Editing | Self::Saving),
            Self::Editing => matches!(target, Self::Idle | Self::Editing | Self::Saving),
            // A failed save restores its resume state directly in `finish_save`.
            Self::Saving => matches!(target, Self::Idle),
        }
    }
}

impl fmt::Display for EditorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "LOADING"),
            Self::LoadFailed => write!(f, "LOAD_FAILED"),
            Self::Idle => write!(f, "IDLE"),
            Self::Editing => write!(f, "EDITING"),
            Self::Saving => write!(f, "SAVING"),
        }
    }
}

/// Label and template buffers of a keyword form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordDraft {
    /// Label buffer.
    pub label: String,
    /// Template buffer.
    pub template: String,
}

/// Full editor state, including the buffers of the open form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    /// Initial fetch in progress.
    Loading,
    /// Initial fetch failed.
    LoadFailed {
        /// Error shown to the operator.
        message: String,
    },
    /// No form open.
    Idle,
    /// New category form.
    AddingCategory {
        /// Label buffer.
        label: String,
    },
    /// New keyword form under a category.
    AddingKeyword {
        /// Target category.
        category_id: String,
        /// Form buffers.
        draft: KeywordDraft,
    },
    /// Rename form for a category.
    EditingCategory {
        /// Category being renamed.
        category_id: String,
        /// Label buffer.
        label: String,
    },
    /// Edit form for a keyword.
    EditingKeyword {
        /// Category holding the keyword.
        category_id: String,
        /// Keyword being edited.
        keyword_id: String,
        /// Form buffers.
        draft: KeywordDraft,
    },
    /// A replace request is outstanding.
    Saving {
        /// Operation being saved.
        mutation: CatalogMutation,
        /// Catalog sent to the server.
        candidate: Catalog,
        /// State restored if the save fails.
        resume: Box<EditorState>,
    },
}

impl EditorState {
    /// Returns the coarse phase of this state.
    #[must_use]
    pub const fn phase(&self) -> EditorPhase {
        match self {
            Self::Loading => EditorPhase::Loading,
            Self::LoadFailed { .. } => EditorPhase::LoadFailed,
            Self::Idle => EditorPhase::Idle,
            Self::AddingCategory { .. }
            | Self::AddingKeyword { .. }
            | Self::EditingCategory { .. }
            | Self::EditingKeyword { .. } => EditorPhase::Editing,
            Self::Saving { .. } => EditorPhase::Saving,
        }
    }

    /// Returns true when a form is open.
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        matches!(self.phase(), EditorPhase::Editing)
    }

    /// The mutation the open form would submit, if a form is open.
    #[must_use]
    pub fn pending_mutation(&self) -> Option<CatalogMutation> {
        match self {
            Self::AddingCategory { label } => Some(CatalogMutation::AddCategory {
                label: label.clone(),
            }),
            Self::AddingKeyword { category_id, draft } => Some(CatalogMutation::AddKeyword {
                category_id: category_id.clone(),
                label: draft.label.clone(),
                template: draft.template.clone(),
            }),
            Self::EditingCategory { category_id, label } => {
                Some(CatalogMutation::UpdateCategoryLabel {
                    category_id: category_id.clone(),
                    label: label.clone(),
                })
            }
            Self::EditingKeyword {
                category_id,
                keyword_id,
                draft,
            } => Some(CatalogMutation::UpdateKeyword {
                category_id: category_id.clone(),
                keyword_id: keyword_id.clone(),
                label: draft.label.clone(),
                template: draft.template.clone(),
            }),
            Self::Loading | Self::LoadFailed { .. } | Self::Idle | Self::Saving { .. } => None,
        }
    }
}

impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.phase().fmt(f)
    }
}

/// Reasons an editor operation is refused or fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// The catalog has not been loaded yet.
    #[error("catalog is not loaded")]
    NotLoaded,

    /// A save is already outstanding.
    #[error("a save is already in progress")]
    SaveInFlight,

    /// The operation needs an open form.
    #[error("no form is open")]
    NoOpenForm,

    /// The open form has no template field.
    #[error("the open form has no template")]
    NoTemplateField,

    /// The addressed category does not exist in the loaded catalog.
    #[error("category not found: {0}")]
    UnknownCategory(String),

    /// The addressed keyword does not exist in the category.
    #[error("keyword not found: {keyword_id}")]
    UnknownKeyword {
        /// Category that was searched.
        category_id: String,
        /// The id that was looked up.
        keyword_id: String,
    },

    /// The transition is not allowed from the current phase.
    #[error("invalid editor transition from {from} to {to}")]
    InvalidTransition {
        /// Current phase.
        from: EditorPhase,
        /// Attempted phase.
        to: EditorPhase,
    },

    /// The mutation engine refused the change; nothing was sent.
    #[error(transparent)]
    Rejected(#[from] MutationError),

    /// The initial fetch failed.
    #[error("{0}")]
    LoadFailed(String),

    /// The server refused or failed the replace.
    #[error("{0}")]
    SaveFailed(String),
}

/// Single-operator catalog editor.
#[derive(Debug, Clone)]
pub struct AdminEditor {
    catalog: Catalog,
    state: EditorState,
    error: Option<String>,
}

impl Default for AdminEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminEditor {
    /// Creates an editor waiting for its initial fetch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: Catalog::default(),
            state: EditorState::Loading,
            error: None,
        }
    }

    /// Last catalog confirmed by the server.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> EditorPhase {
        self.state.phase()
    }

    /// Message from the last rejected or failed operation.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetches the catalog and applies the result.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LoadFailed`] if the fetch fails, or an
    /// [`EditorError::InvalidTransition`] if the editor is not loading.
    pub async fn load(&mut self, api: &dyn CatalogApi) -> Result<(), EditorError> {
        self.ensure_loading()?;
        let result = api.fetch().await;
        self.finish_load(result)
    }

    /// Applies the outcome of the initial fetch.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::LoadFailed`] carrying the fetch error, or an
    /// [`EditorError::InvalidTransition`] if the editor is not loading.
    pub fn finish_load(&mut self, result: Result<Catalog, ClientError>) -> Result<(), EditorError> {
        self.ensure_loading()?;
        match result {
            Ok(catalog) => {
                tracing::debug!(categories = catalog.categories.len(), "catalog loaded");
                self.catalog = catalog;
                self.state = EditorState::Idle;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(error = %message, "catalog load failed");
                self.state = EditorState::LoadFailed {
                    message: message.clone(),
                };
                self.error = Some(message.clone());
                Err(EditorError::LoadFailed(message))
            }
        }
    }

    /// Returns to [`EditorState::Loading`] after a failed load.
    ///
    /// # Errors
    ///
    /// Returns an error unless the editor is in [`EditorState::LoadFailed`].
    pub fn retry(&mut self) -> Result<(), EditorError> {
        self.ensure(EditorPhase::Loading)?;
        self.state = EditorState::Loading;
        self.error = None;
        Ok(())
    }

    /// Opens an empty new-category form.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is not loaded or a save is in flight.
    pub fn begin_add_category(&mut self) -> Result<(), EditorError> {
        self.open_form(EditorState::AddingCategory {
            label: String::new(),
        })
    }

    /// Opens an empty new-keyword form under `category_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the category does not exist, the catalog is not
    /// loaded, or a save is in flight.
    pub fn begin_add_keyword(&mut self, category_id: &str) -> Result<(), EditorError> {
        self.ensure(EditorPhase::Editing)?;
        if !self.catalog.has_category(category_id) {
            return Err(EditorError::UnknownCategory(category_id.to_string()));
        }
        self.open_form(EditorState::AddingKeyword {
            category_id: category_id.to_string(),
            draft: KeywordDraft::default(),
        })
    }

    /// Opens a rename form pre-filled with the category's label.
    ///
    /// # Errors
    ///
    /// Returns an error if the category does not exist, the catalog is not
    /// loaded, or a save is in flight.
    pub fn begin_edit_category(&mut self, category_id: &str) -> Result<(), EditorError> {
        self.ensure(EditorPhase::Editing)?;
        let category = self
            .catalog
            .category(category_id)
            .ok_or_else(|| EditorError::UnknownCategory(category_id.to_string()))?;
        let label = category.label.clone();
        self.open_form(EditorState::EditingCategory {
            category_id: category_id.to_string(),
            label,
        })
    }

    /// Opens an edit form pre-filled with the keyword's label and template.
    ///
    /// # Errors
    ///
    /// Returns an error if the category or keyword does not exist, the
    /// catalog is not loaded, or a save is in flight.
    pub fn begin_edit_keyword(
        &mut self,
        category_id: &str,
        keyword_id: &str,
    ) -> Result<(), EditorError> {
        self.ensure(EditorPhase::Editing)?;
        let category = self
            .catalog
            .category(category_id)
            .ok_or_else(|| EditorError::UnknownCategory(category_id.to_string()))?;
        let keyword = category
            .keyword(keyword_id)
            .ok_or_else(|| EditorError::UnknownKeyword {
                category_id: category_id.to_string(),
                keyword_id: keyword_id.to_string(),
            })?;
        let draft = KeywordDraft {
            label: keyword.label.clone(),
            template: keyword.template.clone(),
        };
        self.open_form(EditorState::EditingKeyword {
            category_id: category_id.to_string(),
            keyword_id: keyword_id.to_string(),
            draft,
        })
    }

    /// Replaces the label buffer of the open form.
    ///
    /// # Errors
    ///
    /// Returns an error if no form is open.
    pub fn set_label(&mut self, value: impl Into<String>) -> Result<(), EditorError> {
        let value = value.into();
        let no_form = self.no_form_error();
        match &mut self.state {
            EditorState::AddingCategory { label } | EditorState::EditingCategory { label, .. } => {
                *label = value;
                Ok(())
            }
            EditorState::AddingKeyword { draft, .. } | EditorState::EditingKeyword { draft, .. } => {
                draft.label = value;
                Ok(())
            }
            _ => Err(no_form),
        }
    }

    /// Replaces the template buffer of the open keyword form.
    ///
    /// # Errors
    ///
    /// Returns an error if no form is open or the form is a category form.
    pub fn set_template(&mut self, value: impl Into<String>) -> Result<(), EditorError> {
        let value = value.into();
        let no_form = self.no_form_error();
        match &mut self.state {
            EditorState::AddingKeyword { draft, .. } | EditorState::EditingKeyword { draft, .. } => {
                draft.template = value;
                Ok(())
            }
            EditorState::AddingCategory { .. } | EditorState::EditingCategory { .. } => {
                Err(EditorError::NoTemplateField)
            }
            _ => Err(no_form),
        }
    }

    /// Closes the open form and clears the error.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is not loaded or a save is in flight.
    pub fn cancel(&mut self) -> Result<(), EditorError> {
        match self.phase() {
            EditorPhase::Idle => {}
            EditorPhase::Editing => self.ensure(EditorPhase::Idle)?,
            _ => return Err(self.no_form_error()),
        }
        self.state = EditorState::Idle;
        self.error = None;
        Ok(())
    }

    /// Computes the open form's candidate catalog and enters `Saving`.
    ///
    /// On a mutation-engine rejection the editor keeps its state, records the
    /// message, and no request must be sent.
    ///
    /// # Errors
    ///
    /// Returns an error if no form is open, a save is in flight, or the
    /// mutation engine rejects the change.
    pub fn prepare_submit(&mut self) -> Result<Catalog, EditorError> {
        let mutation = self
            .state
            .pending_mutation()
            .ok_or_else(|| self.no_form_error())?;
        self.begin_save(mutation)
    }

    /// Computes the catalog without `category_id` and enters `Saving`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is not loaded or a save is in flight.
    pub fn prepare_delete_category(&mut self, category_id: &str) -> Result<Catalog, EditorError> {
        self.begin_save(CatalogMutation::DeleteCategory {
            category_id: category_id.to_string(),
        })
    }

    /// Computes the catalog without the keyword and enters `Saving`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is not loaded or a save is in flight.
    pub fn prepare_delete_keyword(
        &mut self,
        category_id: &str,
        keyword_id: &str,
    ) -> Result<Catalog, EditorError> {
        self.begin_save(CatalogMutation::DeleteKeyword {
            category_id: category_id.to_string(),
            keyword_id: keyword_id.to_string(),
        })
    }

    /// Applies the outcome of the outstanding save.
    ///
    /// Success makes the candidate authoritative and returns to `Idle`.
    /// Failure restores the state held before the save, buffers included.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::SaveFailed`] carrying the server's message, or
    /// an [`EditorError::InvalidTransition`] if no save is outstanding.
    pub fn finish_save(&mut self, result: Result<(), ClientError>) -> Result<(), EditorError> {
        match std::mem::replace(&mut self.state, EditorState::Idle) {
            EditorState::Saving {
                mutation,
                candidate,
                resume,
            } => match result {
                Ok(()) => {
                    tracing::info!(operation = mutation.name(), "catalog saved");
                    self.catalog = candidate;
                    self.error = None;
                    Ok(())
                }
                Err(err) => {
                    let message = err.to_string();
                    tracing::warn!(operation = mutation.name(), error = %message, "catalog save failed");
                    self.state = *resume;
                    self.error = Some(message.clone());
                    Err(EditorError::SaveFailed(message))
                }
            },
            other => {
                let from = other.phase();
                self.state = other;
                Err(EditorError::InvalidTransition {
                    from,
                    to: EditorPhase::Idle,
                })
            }
        }
    }

    /// Saves the open form through `api`.
    ///
    /// # Errors
    ///
    /// See [`Self::prepare_submit`] and [`Self::finish_save`].
    pub async fn submit(&mut self, api: &dyn CatalogApi) -> Result<(), EditorError> {
        let candidate = self.prepare_submit()?;
        let result = api.replace(&candidate).await;
        self.finish_save(result)
    }

    /// Deletes a category through `api`.
    ///
    /// # Errors
    ///
    /// See [`Self::prepare_delete_category`] and [`Self::finish_save`].
    pub async fn delete_category(
        &mut self,
        api: &dyn CatalogApi,
        category_id: &str,
    ) -> Result<(), EditorError> {
        let candidate = self.prepare_delete_category(category_id)?;
        let result = api.replace(&candidate).await;
        self.finish_save(result)
    }

    /// Deletes a keyword through `api`.
    ///
    /// # Errors
    ///
    /// See [`Self::prepare_delete_keyword`] and [`Self::finish_save`].
    pub async fn delete_keyword(
        &mut self,
        api: &dyn CatalogApi,
        category_id: &str,
        keyword_id: &str,
    ) -> Result<(), EditorError> {
        let candidate = self.prepare_delete_keyword(category_id, keyword_id)?;
        let result = api.replace(&candidate).await;
        self.finish_save(result)
    }

    fn open_form(&mut self, form: EditorState) -> Result<(), EditorError> {
        self.ensure(EditorPhase::Editing)?;
        self.state = form;
        self.error = None;
        Ok(())
    }

    fn begin_save(&mut self, mutation: CatalogMutation) -> Result<Catalog, EditorError> {
        self.ensure(EditorPhase::Saving)?;

        let candidate = match mutation.apply(&self.catalog) {
            Ok(candidate) => candidate,
            Err(err) => {
                tracing::debug!(operation = mutation.name(), error = %err, "mutation rejected");
                self.error = Some(err.to_string());
                return Err(err.into());
            }
        };

        let resume = std::mem::replace(&mut self.state, EditorState::Idle);
        self.state = EditorState::Saving {
            mutation,
            candidate: candidate.clone(),
            resume: Box::new(resume),
        };
        Ok(candidate)
    }

    fn ensure_loading(&self) -> Result<(), EditorError> {
        match self.phase() {
            EditorPhase::Loading => Ok(()),
            from => Err(EditorError::InvalidTransition {
                from,
                to: EditorPhase::Idle,
            }),
        }
    }

    fn ensure(&self, target: EditorPhase) -> Result<(), EditorError> {
        let from = self.phase();
        if from.can_transition_to(target) {
            return Ok(());
        }
        Err(match from {
            EditorPhase::Saving => EditorError::SaveInFlight,
            EditorPhase::Loading | EditorPhase::LoadFailed if target.is_loaded() => {
                EditorError::NotLoaded
            }
            _ => EditorError::InvalidTransition { from, to: target },
        })
    }

    fn no_form_error(&self) -> EditorError {
        match self.phase() {
            EditorPhase::Saving => EditorError::SaveInFlight,
            EditorPhase::Loading | EditorPhase::LoadFailed => EditorError::NotLoaded,
            EditorPhase::Idle | EditorPhase::Editing => EditorError::NoOpenForm,
        }
    }
}
