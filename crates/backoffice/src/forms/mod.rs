//! Entity form controllers.
//!
//! Every back-office form has the same shape: a cached list of records from
//! one remote table, a grid bound to all or a searched subset of that cache,
//! and a set of input fields. [`FormController`] implements that shape once;
//! each entity plugs in through [`FormEntity`].
//!
//! # Modes
//!
//! ```text
//! Browsing --add()--> Create --save()--> Browsing
//! Browsing --edit()-> Edit   --save()--> Browsing
//! any      --reset()/confirm_delete()--> Browsing
//! ```
//!
//! A failed operation leaves cache, mode and inputs as they were.

pub mod brand;
pub mod customer;
pub mod inventory;
pub mod sale;
pub mod staff;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use sneakershop_core::Money;

use crate::components::data_table::{GridRecord, GridView};
use crate::error::{AppError, AppResult, ValidationError};
use crate::remote::{Filter, Record, RemoteStore};
use crate::scope::ViewScope;

pub use brand::{BrandForm, BrandInput};
pub use customer::{CustomerForm, CustomerInput};
pub use inventory::{InventoryForm, SneakerInput};
pub use sale::{SaleForm, SaleInput};
pub use staff::{StaffForm, StaffInput};

/// An entity that can be managed through a [`FormController`].
pub trait FormEntity: Record + GridRecord {
    /// Input fields bound to the form.
    type Input: Default + Clone + PartialEq + std::fmt::Debug + Send + Sync;

    /// Lowercase name used in messages ("brand").
    const NOUN: &'static str;

    /// Capitalized name used in notices ("Brand").
    const TITLE: &'static str;

    /// Lowercase plural used in messages ("brands").
    const PLURAL: &'static str;

    /// Filter used to load the whole list.
    fn list_filter() -> Filter {
        Filter::all()
    }

    /// Fill freshly cleared inputs when entering create mode.
    fn prepare_create(_input: &mut Self::Input) {}

    /// Copy this record into input fields.
    fn to_input(&self) -> Self::Input;

    /// Text fields matched by search.
    fn search_fields(&self) -> Vec<String>;

    /// Name shown in the delete confirmation.
    fn display_name(&self) -> String;

    /// Validate `input` and build the record to write.
    ///
    /// `original` is the record being edited, if any; `cache` is the full
    /// cached list.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming the first offending field.
    fn build(
        input: &Self::Input,
        original: Option<&Self>,
        cache: &[Self],
    ) -> Result<Self, ValidationError>;
}

/// Current form mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormMode<E> {
    /// No record being created or edited.
    #[default]
    Browsing,
    /// Inputs describe a new record.
    Create,
    /// Inputs describe changes to the held original record.
    Edit(E),
}

impl<E> FormMode<E> {
    /// Label of the save button in this mode.
    #[must_use]
    pub const fn save_label(&self) -> &'static str {
        match self {
            Self::Edit(_) => "Update",
            Self::Browsing | Self::Create => "Save",
        }
    }
}

/// A pending delete awaiting the user's answer.
///
/// Dropping it declines the delete.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "pass to confirm_delete() or drop to decline"]
pub struct DeleteConfirmation<E> {
    record: E,
    prompt: String,
}

impl<E: FormEntity> DeleteConfirmation<E> {
    fn new(record: E) -> Self {
        let prompt = format!("Are you sure you want to delete {}?", record.display_name());
        Self { record, prompt }
    }

    /// Question to show the user.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Record that will be deleted.
    #[must_use]
    pub const fn record(&self) -> &E {
        &self.record
    }
}

/// Headless controller for one entity form.
pub struct FormController<E: FormEntity, S: RemoteStore> {
    store: S,
    scope: ViewScope,
    cache: Vec<E>,
    /// Indices into `cache` currently bound to the grid.
    bound: Vec<usize>,
    /// Index into `bound`.
    selected: Option<usize>,
    search_term: String,
    inputs: E::Input,
    mode: FormMode<E>,
    notice: Option<String>,
}

impl<E: FormEntity, S: RemoteStore> std::fmt::Debug for FormController<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("table", &E::TABLE)
            .field("cached", &self.cache.len())
            .field("bound", &self.bound.len())
            .field("selected", &self.selected)
            .field("search_term", &self.search_term)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

impl<E: FormEntity, S: RemoteStore> Drop for FormController<E, S> {
    fn drop(&mut self) {
        self.scope.close();
    }
}

impl<E: FormEntity, S: RemoteStore> FormController<E, S> {
    /// Create an empty controller. Call [`load`](Self::load) to fill it.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            scope: ViewScope::new(),
            cache: Vec::new(),
            bound: Vec::new(),
            selected: None,
            search_term: String::new(),
            inputs: E::Input::default(),
            mode: FormMode::Browsing,
            notice: None,
        }
    }

    // =========================================================================
    // Remote operations
    // =========================================================================

    /// Fetch the full list, replace the cache and bind the grid to all of it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` or `AppError::Cancelled`; the cache is kept.
    #[instrument(skip(self), fields(table = E::TABLE))]
    pub async fn load(&mut self) -> AppResult<()> {
        let rows = self.fetch_all().await?;
        debug!(rows = rows.len(), "Loaded {}", E::PLURAL);

        self.cache = rows;
        self.search_term.clear();
        self.bind_all();
        Ok(())
    }

    /// Validate the inputs and insert or update the record, then reload.
    ///
    /// Inserts in browsing and create mode, updates the original record by
    /// key in edit mode.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` without sending anything when the inputs
    /// are invalid; `AppError::Remote` or `AppError::Cancelled` when the write
    /// fails.
    #[instrument(skip(self), fields(table = E::TABLE))]
    pub async fn save(&mut self) -> AppResult<()> {
        let original = match &self.mode {
            FormMode::Edit(original) => Some(original),
            FormMode::Browsing | FormMode::Create => None,
        };

        let record = E::build(&self.inputs, original, &self.cache).map_err(|err| {
            debug!(field = err.field, message = %err.message, "Validation failed");
            AppError::Validation(err)
        })?;

        let notice = if let Some(original) = original {
            let filter = original.key_filter();
            self.scope
                .run(self.store.update(&record, &filter))
                .await?
                .map_err(|err| AppError::remote(format!("Error saving {}", E::NOUN), err))?;
            format!("{} updated successfully!", E::TITLE)
        } else {
            self.scope
                .run(self.store.insert(&record))
                .await?
                .map_err(|err| AppError::remote(format!("Error saving {}", E::NOUN), err))?;
            format!("{} added successfully!", E::TITLE)
        };

        info!(key = %record.key(), "{notice}");
        self.notice = Some(notice);
        self.reset();
        self.load().await
    }

    /// Ask to delete the selected record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NoSelection` when no row is selected.
    pub fn request_delete(&self) -> AppResult<DeleteConfirmation<E>> {
        let record = self.current().ok_or(AppError::NoSelection(E::NOUN))?;
        Ok(DeleteConfirmation::new(record.clone()))
    }

    /// Delete the confirmed record, drop it from the cache and reload.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` or `AppError::Cancelled`; nothing is removed
    /// locally in that case.
    #[instrument(skip(self, confirmation), fields(table = E::TABLE, key = %confirmation.record.key()))]
    pub async fn confirm_delete(&mut self, confirmation: DeleteConfirmation<E>) -> AppResult<()> {
        let record = confirmation.record;
        self.scope
            .run(self.store.delete::<E>(&record.key_filter()))
            .await?
            .map_err(|err| AppError::remote(format!("Error deleting {}", E::NOUN), err))?;

        let key = record.key();
        self.cache.retain(|cached| cached.key() != key);
        self.bind_all();

        let notice = format!("{} deleted successfully!", E::TITLE);
        info!("{notice}");
        self.notice = Some(notice);
        self.reset();
        self.load().await
    }

    /// Clear the search term, reset the inputs and reload.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` or `AppError::Cancelled` if the reload fails.
    pub async fn refresh(&mut self) -> AppResult<()> {
        self.search_term.clear();
        self.reset();
        self.load().await
    }

    // =========================================================================
    // Local operations
    // =========================================================================

    /// Enter create mode with cleared inputs.
    pub fn add(&mut self) {
        let mut inputs = E::Input::default();
        E::prepare_create(&mut inputs);
        self.inputs = inputs;
        self.mode = FormMode::Create;
        self.selected = None;
    }

    /// Enter edit mode for the selected record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NoSelection` when no row is selected.
    pub fn edit(&mut self) -> AppResult<()> {
        let record = self
            .selected_record()
            .ok_or(AppError::NoSelection(E::NOUN))?
            .clone();
        self.inputs = record.to_input();
        self.mode = FormMode::Edit(record);
        Ok(())
    }

    /// Select a row of the bound grid.
    ///
    /// Inputs follow the selection only while browsing; in create or edit
    /// mode they keep what the user typed. Returns `None` (and clears the
    /// selection) when `index` is past the end of the grid.
    pub fn select_row(&mut self, index: usize) -> Option<&E> {
        if index >= self.bound.len() {
            self.selected = None;
            return None;
        }

        self.selected = Some(index);
        let record = self.bound.get(index).and_then(|&i| self.cache.get(i))?;
        if matches!(self.mode, FormMode::Browsing) {
            self.inputs = record.to_input();
        }
        Some(record)
    }

    /// Filter the grid to records whose searchable fields contain `term`,
    /// ignoring case. An empty term binds the whole cache.
    ///
    /// Returns the number of bound rows.
    pub fn search(&mut self, term: &str) -> usize {
        let needle = term.trim().to_lowercase();
        self.search_term = term.trim().to_string();
        self.selected = None;

        if needle.is_empty() {
            self.bind_all();
        } else {
            self.bound = self
                .cache
                .iter()
                .enumerate()
                .filter(|(_, record)| {
                    record
                        .search_fields()
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
                })
                .map(|(i, _)| i)
                .collect();
        }

        debug!(term = %self.search_term, matches = self.bound.len(), "Searched {}", E::PLURAL);
        self.bound.len()
    }

    /// Clear inputs and selection and return to browsing.
    pub fn reset(&mut self) {
        self.inputs = E::Input::default();
        self.mode = FormMode::Browsing;
        self.selected = None;
    }

    /// Close the form, cancelling any call still in flight.
    pub fn close(&self) {
        self.scope.close();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Grid projection of the bound rows.
    #[must_use]
    pub fn grid(&self) -> GridView {
        GridView::project(self.bound_records())
    }

    /// Records currently bound to the grid.
    pub fn bound_records(&self) -> impl Iterator<Item = &E> {
        self.bound.iter().filter_map(|&i| self.cache.get(i))
    }

    /// Every cached record.
    #[must_use]
    pub fn records(&self) -> &[E] {
        &self.cache
    }

    /// Selected record, if any.
    #[must_use]
    pub fn selected_record(&self) -> Option<&E> {
        self.selected
            .and_then(|row| self.bound.get(row))
            .and_then(|&i| self.cache.get(i))
    }

    /// Selected record, falling back to the record being edited.
    fn current(&self) -> Option<&E> {
        self.selected_record().or(match &self.mode {
            FormMode::Edit(original) => Some(original),
            FormMode::Browsing | FormMode::Create => None,
        })
    }

    /// Input fields.
    #[must_use]
    pub const fn inputs(&self) -> &E::Input {
        &self.inputs
    }

    /// Input fields, for the UI to write into.
    pub const fn inputs_mut(&mut self) -> &mut E::Input {
        &mut self.inputs
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> &FormMode<E> {
        &self.mode
    }

    /// Current (trimmed) search term.
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Take the notice left by the last successful mutation.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Lifetime of this form; clone it to close the form from elsewhere.
    #[must_use]
    pub const fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Remote store this form writes to.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn bind_all(&mut self) {
        self.bound = (0..self.cache.len()).collect();
        self.selected = None;
    }

    async fn fetch_all(&self) -> AppResult<Vec<E>> {
        self.scope
            .run(self.store.select::<E>(&E::list_filter()))
            .await?
            .map_err(|err| AppError::remote(format!("Error loading {}", E::PLURAL), err))
    }
}

/// Trimmed text of a required field.
pub(crate) fn required_text(
    value: &str,
    field: &'static str,
    label: &str,
) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field, label));
    }
    Ok(value.to_string())
}

/// Parse a non-negative amount typed as `1234.5`, `$1,234.50` or similar.
pub(crate) fn parse_money(
    value: &str,
    field: &'static str,
    label: &str,
) -> Result<Money, ValidationError> {
    let cleaned: String = value
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    match cleaned.parse::<Decimal>() {
        Ok(amount) if amount >= Decimal::ZERO => Ok(Money::new(amount)),
        _ => Err(ValidationError::new(
            field,
            format!("Please enter a valid {label}."),
        )),
    }
}

/// Parse a non-negative whole number.
pub(crate) fn parse_count(
    value: &str,
    field: &'static str,
    label: &str,
) -> Result<i32, ValidationError> {
    match value.trim().parse::<i32>() {
        Ok(count) if count >= 0 => Ok(count),
        _ => Err(ValidationError::new(
            field,
            format!("Please enter a valid {label}."),
        )),
    }
}

/// Timestamp format used in grid cells.
pub(crate) const GRID_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";
