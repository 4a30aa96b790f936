//! The parameter registry.
//!
//! The registry owns every parameter definition and every current value, and
//! composes validation, allowed-value normalisation, conflict resolution and
//! merging into the engine's public operations.
//!
//! # Key Features
//!
//! - **Registration**: definitions are immutable once accepted; defaults are
//!   validated and normalised eagerly
//! - **Assignment**: `set` replaces, `join` accumulates, both under the same
//!   validation, immutability and switch-group rules
//! - **Batch mode**: a scoped acquisition that forces switch groups to
//!   reject conflicts while command-line tokens are applied
//! - **Persistence**: parameters marked `persisted` are loaded from the
//!   settings store at startup and written back when they change
//!
//! The registry is single-threaded by design: parameter resolution is a
//! pre-execution setup phase. Embedders calling from multiple threads must
//! serialise access externally.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use log::{debug, warn};

use crate::definitions::ParameterDefinition;
use crate::error::{Error, Result};
use crate::file_handling::SettingsStore;
use crate::merge;
use crate::prompt::PromptHistory;
use crate::switch::{self, ConflictContext, Eviction};
use crate::validate;
use crate::value::Value;

/// A currently stored value for one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredValue {
    pub value: Value,
    /// Distinguishes "explicitly assigned" from "holds the default".
    pub is_set: bool,
    /// Set while the value was assigned during a batch (command-line) pass.
    pub from_cli: bool,
}

impl StoredValue {
    #[must_use]
    pub fn explicit(value: Value) -> Self {
        Self {
            value,
            is_set: true,
            from_cli: false,
        }
    }

    #[must_use]
    pub fn held_default(value: Value) -> Self {
        Self {
            value,
            is_set: false,
            from_cli: false,
        }
    }
}

enum AssignMode {
    Replace,
    Join,
}

/// The parameter engine. Construct one per process with the collaborators it
/// should use; tests construct fresh instances instead of resetting globals.
#[derive(Default)]
pub struct Registry {
    definitions: IndexMap<String, ParameterDefinition>,
    values: HashMap<String, StoredValue>,
    pub(crate) prompt_history: PromptHistory,
    batch_depth: u32,
    store: Option<Box<dyn SettingsStore>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a settings store for `persisted` parameters.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn SettingsStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Register a parameter definition.
    ///
    /// The declared default, if any, is validated and normalised now and
    /// seeded as the initial value. Switch-group checks are suppressed for
    /// this call: defaults never conflict at registration.
    ///
    /// # Errors
    ///
    /// Fails with `DuplicateName` if the name or storage key is taken, and
    /// with `InvalidDefault` if the default fails type or allowed-value
    /// validation.
    pub fn register(&mut self, mut definition: ParameterDefinition) -> Result<()> {
        if self.definition_for(&definition.name).is_some() {
            return Err(Error::DuplicateName(definition.name));
        }

        let key = definition.storage_key().to_string();
        if self
            .definitions
            .values()
            .any(|existing| existing.storage_key() == key)
        {
            return Err(Error::DuplicateName(definition.name));
        }

        validate::check_allowed_list(&definition)?;

        if let Some(default) = definition.default.take() {
            let normalised =
                validate::check(&definition, default).map_err(|e| Error::InvalidDefault {
                    name: definition.name.clone(),
                    reason: e.to_string(),
                })?;
            definition.default = Some(normalised.clone());
            self.values.insert(key, StoredValue::held_default(normalised));
        }

        debug!("Registered parameter `{}`", definition.name);
        self.definitions
            .insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Look up a definition by name or storage key.
    #[must_use]
    pub fn definition_for(&self, name_or_bind: &str) -> Option<&ParameterDefinition> {
        self.definitions.get(name_or_bind).or_else(|| {
            self.definitions
                .values()
                .find(|definition| definition.storage_key() == name_or_bind)
        })
    }

    fn resolve(&self, name_or_bind: &str) -> Result<&ParameterDefinition> {
        self.definition_for(name_or_bind)
            .ok_or_else(|| Error::UnknownParameter(name_or_bind.to_string()))
    }

    /// All definitions, in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.definitions.values()
    }

    /// The current value: the stored one, or the declared default when the
    /// parameter is unset.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownParameter` when nothing matches the name.
    pub fn get(&self, name_or_bind: &str) -> Result<Option<Value>> {
        let definition = self.resolve(name_or_bind)?;
        let stored = self.values.get(definition.storage_key());
        Ok(stored
            .map(|stored| stored.value.clone())
            .or_else(|| definition.default.clone()))
    }

    /// Like [`get`](Self::get), but with a caller-supplied fallback for
    /// unset parameters.
    pub fn get_or(&self, name_or_bind: &str, fallback: Value) -> Result<Value> {
        Ok(self.get(name_or_bind)?.unwrap_or(fallback))
    }

    /// Whether the parameter holds an explicitly assigned value.
    pub fn is_set(&self, name_or_bind: &str) -> Result<bool> {
        let definition = self.resolve(name_or_bind)?;
        Ok(self
            .values
            .get(definition.storage_key())
            .is_some_and(|stored| stored.is_set))
    }

    /// Whether the current value arrived from a command-line (batch) pass.
    pub fn is_set_from_cli(&self, name_or_bind: &str) -> Result<bool> {
        let definition = self.resolve(name_or_bind)?;
        Ok(self
            .values
            .get(definition.storage_key())
            .is_some_and(|stored| stored.is_set && stored.from_cli))
    }

    /// Replace the parameter's value.
    pub fn set(&mut self, name_or_bind: &str, value: Value) -> Result<()> {
        let context = self.current_context();
        self.apply(name_or_bind, value, AssignMode::Replace, context)
    }

    /// Accumulate onto the parameter's value.
    ///
    /// # Errors
    ///
    /// Fails with `UnsupportedJoin` for number and toggle parameters.
    pub fn join(&mut self, name_or_bind: &str, value: Value) -> Result<()> {
        let context = self.current_context();
        self.apply(name_or_bind, value, AssignMode::Join, context)
    }

    /// Replace the parameter's value from raw input fragments.
    ///
    /// Each fragment is filtered, parsed and validated; several fragments in
    /// one call are merged pairwise, left to right, before storage.
    pub fn set_input(&mut self, name_or_bind: &str, raws: &[String]) -> Result<()> {
        let merged = self.parse_fragments(name_or_bind, raws)?;
        let context = self.current_context();
        self.apply(name_or_bind, merged, AssignMode::Replace, context)
    }

    /// Accumulate raw input fragments onto the parameter's value.
    pub fn join_input(&mut self, name_or_bind: &str, raws: &[String]) -> Result<()> {
        let merged = self.parse_fragments(name_or_bind, raws)?;
        let context = self.current_context();
        self.apply(name_or_bind, merged, AssignMode::Join, context)
    }

    fn parse_fragments(&self, name_or_bind: &str, raws: &[String]) -> Result<Value> {
        let definition = self.resolve(name_or_bind)?;

        let mut parsed = Vec::with_capacity(raws.len());
        for raw in raws {
            parsed.push(validate::parse_input(definition, raw)?);
        }

        merge::join_fragments(definition, parsed)
    }

    /// Remove the stored value entirely.
    ///
    /// # Errors
    ///
    /// Fails with `ImmutableParameter` if the parameter is immutable and
    /// already explicitly set.
    pub fn unset(&mut self, name_or_bind: &str) -> Result<()> {
        let definition = self.resolve(name_or_bind)?;
        let key = definition.storage_key().to_string();
        let persisted = definition.persisted;
        self.guard_immutable(name_or_bind)?;

        self.values.remove(&key);
        if persisted {
            self.save_persisted()?;
        }
        Ok(())
    }

    /// Restore the declared default, or behave as `unset` without one.
    pub fn reset(&mut self, name_or_bind: &str) -> Result<()> {
        let definition = self.resolve(name_or_bind)?;
        let key = definition.storage_key().to_string();
        let persisted = definition.persisted;
        let default = definition.default.clone();
        self.guard_immutable(name_or_bind)?;

        match default {
            Some(default) => {
                self.values.insert(key, StoredValue::held_default(default));
            }
            None => {
                self.values.remove(&key);
            }
        }

        if persisted {
            self.save_persisted()?;
        }
        Ok(())
    }

    fn guard_immutable(&self, name_or_bind: &str) -> Result<()> {
        let definition = self.resolve(name_or_bind)?;
        let already_set = self
            .values
            .get(definition.storage_key())
            .is_some_and(|stored| stored.is_set);

        if definition.immutable && already_set {
            return Err(Error::ImmutableParameter(definition.name.clone()));
        }
        Ok(())
    }

    fn current_context(&self) -> ConflictContext {
        ConflictContext {
            registration: false,
            batch: self.batch_depth > 0,
        }
    }

    fn apply(
        &mut self,
        name_or_bind: &str,
        value: Value,
        mode: AssignMode,
        context: ConflictContext,
    ) -> Result<()> {
        let definition = self.resolve(name_or_bind)?.clone();
        let key = definition.storage_key().to_string();

        if matches!(mode, AssignMode::Join) && !definition.kind.supports_join() {
            return Err(Error::UnsupportedJoin {
                name: definition.name,
                kind: definition.kind,
            });
        }

        let value = validate::check(&definition, value)?;

        let already_set = self.values.get(&key).is_some_and(|stored| stored.is_set);
        if definition.immutable && already_set {
            return Err(Error::ImmutableParameter(definition.name));
        }

        // Compute the final value before mutating anything, so a failure
        // leaves the registry untouched
        let merged = match mode {
            AssignMode::Replace => value,
            AssignMode::Join => {
                let current = self
                    .values
                    .get(&key)
                    .filter(|stored| stored.is_set)
                    .map(|stored| stored.value.clone());
                merge::join(&definition, current, value)?
            }
        };

        let evictions =
            switch::resolve(&definition, &self.definitions, &self.values, context)?;

        // Evictability is checked up front: an immutable conflicting member
        // must fail the whole operation before any member is touched
        for eviction in &evictions {
            let (Eviction::Unset(member) | Eviction::Reset(member)) = eviction;
            self.guard_immutable(member)?;
        }

        for eviction in evictions {
            match eviction {
                Eviction::Unset(member) => self.unset(&member)?,
                Eviction::Reset(member) => self.reset(&member)?,
            }
        }

        debug!("Storing `{}` = {}", definition.name, merged);
        self.values.insert(
            key,
            StoredValue {
                value: merged,
                is_set: true,
                from_cli: context.batch,
            },
        );

        if definition.persisted && !context.registration {
            self.save_persisted()?;
        }
        Ok(())
    }

    /// Load values for `persisted` parameters from the settings store.
    ///
    /// Conflict checks are suppressed, as at registration; type validation
    /// and allowed-value canonicalisation always re-apply.
    pub fn load_persisted(&mut self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let mut saved = store.load()?;

        let persisted: Vec<(String, String)> = self
            .definitions
            .values()
            .filter(|definition| definition.persisted)
            .map(|definition| {
                (
                    definition.name.clone(),
                    definition.storage_key().to_string(),
                )
            })
            .collect();

        for (name, key) in persisted {
            if let Some(value) = saved.shift_remove(&key) {
                self.apply(
                    &name,
                    value,
                    AssignMode::Replace,
                    ConflictContext {
                        registration: true,
                        batch: false,
                    },
                )?;
            }
        }

        for leftover in saved.keys() {
            debug!("Ignoring settings entry `{leftover}` with no persisted parameter");
        }
        Ok(())
    }

    fn save_persisted(&mut self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };

        let mut snapshot: IndexMap<String, Value> = IndexMap::new();
        for definition in self.definitions.values() {
            if !definition.persisted {
                continue;
            }
            let key = definition.storage_key();
            if let Some(stored) = self.values.get(key) {
                if stored.is_set {
                    snapshot.insert(key.to_string(), stored.value.clone());
                }
            }
        }

        debug!("Saving {} persisted parameter(s)", snapshot.len());
        store.save(&snapshot)
    }

    /// Required parameters that still have no value from any source.
    #[must_use]
    pub fn missing_required(&self) -> Vec<String> {
        self.definitions
            .values()
            .filter(|definition| {
                definition.required
                    && definition.default.is_none()
                    && !self.values.contains_key(definition.storage_key())
            })
            .map(|definition| definition.name.clone())
            .collect()
    }

    /// Force switch-group policy to reject until the matching exit call.
    /// Acquisitions nest.
    pub fn enter_batch_mode(&mut self) {
        self.batch_depth += 1;
    }

    pub fn exit_batch_mode(&mut self) {
        if self.batch_depth == 0 {
            warn!("exit_batch_mode called without a matching enter");
            return;
        }
        self.batch_depth -= 1;
    }

    /// Whether a batch (command-line parse) pass is active.
    #[must_use]
    pub fn in_batch_mode(&self) -> bool {
        self.batch_depth > 0
    }

    /// Enter batch mode for the lifetime of the returned guard. The guard
    /// dereferences to the registry, and restores the previous policy on
    /// drop — including early returns and panics in the parse pass.
    pub fn batch_guard(&mut self) -> BatchModeGuard<'_> {
        self.enter_batch_mode();
        BatchModeGuard { registry: self }
    }

    /// Forget which parameters have been solicited, starting a new prompt
    /// session.
    pub fn reset_prompt_history(&mut self) {
        self.prompt_history.clear();
    }
}

/// Scoped batch-mode acquisition. See [`Registry::batch_guard`].
pub struct BatchModeGuard<'registry> {
    registry: &'registry mut Registry,
}

impl Deref for BatchModeGuard<'_> {
    type Target = Registry;

    fn deref(&self) -> &Registry {
        self.registry
    }
}

impl DerefMut for BatchModeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Registry {
        self.registry
    }
}

impl Drop for BatchModeGuard<'_> {
    fn drop(&mut self) {
        self.registry.exit_batch_mode();
    }
}
