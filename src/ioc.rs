//! Dependency container built beside the item store.
//!
//! Aliases map to factory descriptors; [`Container::fetch`] resolves a
//! descriptor to an instance, recursively resolving declared arguments
//! that name other aliases, then runs the alias's setup pipeline over
//! the result. Shared aliases cache the piped instance and hand the
//! identical `Arc` to every caller. Dependency state lives in dedicated
//! fields on the container, so no item path can collide with it.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::{Item, ItemStore};

/// A resolved dependency instance, type-erased and shareable.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Factory closure: receives the container and the resolved arguments.
pub type FactoryFn =
    Arc<dyn Fn(&mut Container, &[Dependency]) -> Result<Instance> + Send + Sync>;

/// Constructor backing a class-name descriptor: receives the resolved
/// arguments only.
pub type CtorFn = Arc<dyn Fn(&[Dependency]) -> Result<Instance> + Send + Sync>;

/// Setup step: receives the current instance and the container, returns
/// the instance to feed to the next step.
pub type SetupFn =
    Arc<dyn Fn(Instance, &mut Container) -> Result<Instance> + Send + Sync>;

/// Default label for the manifest section of a diagnostic export.
const DEFAULT_MANIFEST_KEY: &str = "_diManifest";


/// One resolved constructor argument.
///
/// A declared argument equal to a registered alias resolves to an
/// instance; every other declared value passes through verbatim.
#[derive(Clone)]
pub enum Dependency {
    /// A recursively fetched instance of another alias.
    Instance(Instance),
    /// A verbatim declared value.
    Value(Item),
}

impl Dependency {
    /// The instance, if this argument resolved through the container.
    pub fn instance(&self) -> Option<&Instance> {
        match self {
            Dependency::Instance(instance) => Some(instance),
            Dependency::Value(_) => None,
        }
    }

    /// The verbatim value, if this argument passed through unresolved.
    pub fn value(&self) -> Option<&Item> {
        match self {
            Dependency::Instance(_) => None,
            Dependency::Value(value) => Some(value),
        }
    }

    /// Downcast a resolved instance to a concrete type.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        match self {
            Dependency::Instance(instance) => instance.clone().downcast::<T>().ok(),
            Dependency::Value(_) => None,
        }
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Instance(_) => f.write_str("Dependency::Instance(..)"),
            Dependency::Value(value) => write!(f, "Dependency::Value({})", value),
        }
    }
}


/// Tagged descriptor for producing a dependency instance.
#[derive(Clone)]
pub enum Factory {
    /// Name of a constructor registered via [`Container::register_class`];
    /// instantiated fresh with resolved arguments on each resolution.
    Class(String),
    /// Closure invoked with the container and the resolved arguments;
    /// its return value is the instance.
    Closure(FactoryFn),
    /// Already-constructed value handed back as-is; declared arguments
    /// are ignored.
    Instance(Instance),
}

impl Factory {
    /// Descriptor naming a registered constructor.
    pub fn class(name: impl Into<String>) -> Self {
        Factory::Class(name.into())
    }

    /// Descriptor from a factory closure.
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&mut Container, &[Dependency]) -> Result<Instance> + Send + Sync + 'static,
    {
        Factory::Closure(Arc::new(f))
    }

    /// Descriptor from an existing value.
    pub fn instance<T: Send + Sync + 'static>(value: T) -> Self {
        Factory::Instance(Arc::new(value))
    }

    /// Short tag for diagnostics and exports.
    fn tag(&self) -> String {
        match self {
            Factory::Class(name) => format!("class:{}", name),
            Factory::Closure(_) => "closure".to_string(),
            Factory::Instance(_) => "instance".to_string(),
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factory::Class(name) => write!(f, "Factory::Class({:?})", name),
            Factory::Closure(_) => f.write_str("Factory::Closure(..)"),
            Factory::Instance(_) => f.write_str("Factory::Instance(..)"),
        }
    }
}


/// One manifest entry: a descriptor plus its declared arguments.
#[derive(Clone, Debug)]
pub struct Registration {
    factory: Factory,
    args: Vec<Item>,
}

impl Registration {
    /// Couple a descriptor with declared constructor arguments.
    pub fn new(factory: Factory, args: Vec<Item>) -> Self {
        Registration { factory, args }
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn args(&self) -> &[Item] {
        &self.args
    }
}


/// Dependency container wrapping a general-purpose [`ItemStore`].
///
/// General data lives in the wrapped store; the manifest, constructor
/// registry, share flags, pipelines, and instance cache are fields of
/// their own and never appear as items.
pub struct Container {
    items: ItemStore,
    manifest: HashMap<String, Registration>,
    classes: HashMap<String, CtorFn>,
    pipelines: HashMap<String, Vec<SetupFn>>,
    shared: HashSet<String>,
    cache: HashMap<String, Instance>,
    manifest_key: String,
}

impl Container {
    /// Create an empty container.
    pub fn new() -> Self {
        Container {
            items: ItemStore::new(),
            manifest: HashMap::new(),
            classes: HashMap::new(),
            pipelines: HashMap::new(),
            shared: HashSet::new(),
            cache: HashMap::new(),
            manifest_key: DEFAULT_MANIFEST_KEY.to_string(),
        }
    }

    /// Create a container whose general data store is seeded from a tree.
    pub fn with_items(tree: Item) -> Result<Self> {
        let mut container = Container::new();
        container.items = ItemStore::from_tree(tree)?;
        Ok(container)
    }

    // -------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------

    /// Replace all per-alias dependency state with the given descriptors.
    ///
    /// Old registrations are dropped wholesale, along with their
    /// pipelines, share flags, and cached instances. The constructor
    /// registry and the general item tree are untouched.
    pub fn init<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = (String, Factory)>,
    {
        self.manifest = descriptors
            .into_iter()
            .map(|(alias, factory)| (alias, Registration::new(factory, Vec::new())))
            .collect();
        self.pipelines.clear();
        self.shared.clear();
        self.cache.clear();
        debug!(aliases = self.manifest.len(), "initialized manifest");
    }

    /// Register or overwrite one alias.
    pub fn register(&mut self, alias: impl Into<String>, factory: Factory) {
        self.register_with(alias, factory, Vec::new());
    }

    /// Register or overwrite one alias with declared constructor
    /// arguments.
    ///
    /// At fetch time, an argument equal to a registered alias resolves
    /// recursively; any other value is passed in verbatim. Overwriting
    /// evicts the alias's cached instance but keeps its share flag and
    /// pipeline.
    pub fn register_with(
        &mut self,
        alias: impl Into<String>,
        factory: Factory,
        args: Vec<Item>,
    ) {
        let alias = alias.into();
        debug!(alias = %alias, factory = %factory.tag(), "registered dependency");
        self.cache.remove(&alias);
        self.manifest.insert(alias, Registration::new(factory, args));
    }

    /// Register a constructor under a class name, backing
    /// [`Factory::Class`] descriptors carrying the same name.
    pub fn register_class<F>(&mut self, name: impl Into<String>, ctor: F)
    where
        F: Fn(&[Dependency]) -> Result<Instance> + Send + Sync + 'static,
    {
        self.classes.insert(name.into(), Arc::new(ctor));
    }

    /// Mark an alias as shared.
    ///
    /// A flag flip only: resolution and caching stay lazy until the
    /// next [`Container::fetch`].
    pub fn share(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        debug!(alias = %alias, "marked shared");
        self.shared.insert(alias);
    }

    /// Append one step to an alias's setup pipeline.
    ///
    /// Never triggers resolution. Steps run in registration order, each
    /// step's output feeding the next. For a shared alias the pipeline
    /// runs exactly once, before caching.
    pub fn setup<F>(&mut self, alias: impl Into<String>, step: F)
    where
        F: Fn(Instance, &mut Container) -> Result<Instance> + Send + Sync + 'static,
    {
        self.pipelines
            .entry(alias.into())
            .or_default()
            .push(Arc::new(step));
    }

    // -------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------

    /// Resolve an alias to an instance.
    ///
    /// A shared alias returns its cached instance when present.
    /// Otherwise the descriptor is looked up, declared arguments are
    /// resolved, the descriptor produces an instance, and the setup
    /// pipeline runs over it. The piped instance is cached first when
    /// the alias is shared, then returned. Faults from user factories
    /// and steps propagate unchanged.
    pub fn fetch(&mut self, alias: &str) -> Result<Instance> {
        if self.shared.contains(alias) {
            if let Some(cached) = self.cache.get(alias) {
                return Ok(cached.clone());
            }
        }

        let registration = match self.manifest.get(alias) {
            Some(registration) => registration.clone(),
            None => {
                return Err(StoreError::ItemNotFound {
                    path: alias.to_string(),
                })
            }
        };

        let mut resolved = Vec::with_capacity(registration.args().len());
        for arg in registration.args() {
            resolved.push(self.resolve_argument(arg)?);
        }

        let instance = match registration.factory() {
            Factory::Class(name) => {
                let ctor =
                    self.classes
                        .get(name)
                        .cloned()
                        .ok_or_else(|| StoreError::InvalidFactory {
                            alias: alias.to_string(),
                            reason: format!("no constructor registered for class '{}'", name),
                        })?;
                ctor(&resolved)?
            }
            Factory::Closure(factory) => factory(self, &resolved)?,
            Factory::Instance(instance) => instance.clone(),
        };

        let instance = self.run_pipeline(alias, instance)?;

        if self.shared.contains(alias) && !self.cache.contains_key(alias) {
            self.cache.insert(alias.to_string(), instance.clone());
        }

        debug!(alias = %alias, "resolved dependency");
        Ok(instance)
    }

    /// Resolve an alias, falling back to `default` when the alias has
    /// no registration. Faults during an actual resolution still fail.
    pub fn fetch_or(&mut self, alias: &str, default: Instance) -> Result<Instance> {
        if !self.is_registered(alias) {
            return Ok(default);
        }
        self.fetch(alias)
    }

    /// Resolve an alias and downcast the instance to a concrete type.
    pub fn fetch_as<T: Send + Sync + 'static>(&mut self, alias: &str) -> Result<Arc<T>> {
        let instance = self.fetch(alias)?;
        instance
            .downcast::<T>()
            .map_err(|_| StoreError::WrongInstanceType {
                alias: alias.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    // -------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------

    /// The full manifest; empty if nothing was ever registered.
    pub fn manifest(&self) -> &HashMap<String, Registration> {
        &self.manifest
    }

    /// True if the alias has a registration.
    pub fn is_registered(&self, alias: &str) -> bool {
        self.manifest.contains_key(alias)
    }

    /// Label under which the manifest appears in [`Container::export`].
    pub fn manifest_key(&self) -> &str {
        &self.manifest_key
    }

    /// Rename the export label.
    ///
    /// Registrations live on the container itself, so renaming never
    /// migrates or orphans anything.
    pub fn set_manifest_key(&mut self, name: impl Into<String>) {
        self.manifest_key = name.into();
    }

    /// The wrapped general-purpose item store.
    pub fn items(&self) -> &ItemStore {
        &self.items
    }

    /// Mutable access to the wrapped item store.
    pub fn items_mut(&mut self) -> &mut ItemStore {
        &mut self.items
    }

    /// Diagnostic tree: the item tree plus a manifest section under the
    /// manifest key.
    ///
    /// Descriptors render as tags since closures and erased instances
    /// have no JSON form. In the export, the manifest section shadows
    /// any user item stored under the same name.
    pub fn export(&self) -> Item {
        let mut manifest = serde_json::Map::new();
        for (alias, registration) in &self.manifest {
            manifest.insert(
                alias.clone(),
                json!({
                    "factory": registration.factory().tag(),
                    "args": registration.args(),
                    "shared": self.shared.contains(alias),
                    "setup_steps": self.pipelines.get(alias).map_or(0, Vec::len),
                }),
            );
        }
        let mut tree = self.items.export();
        if let Value::Object(root) = &mut tree {
            root.insert(self.manifest_key.clone(), Value::Object(manifest));
        }
        tree
    }

    // -------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------

    /// A declared argument equal to a registered alias fetches through
    /// the container; anything else passes through verbatim.
    fn resolve_argument(&mut self, arg: &Item) -> Result<Dependency> {
        if let Value::String(name) = arg {
            if self.manifest.contains_key(name) {
                let name = name.clone();
                return self.fetch(&name).map(Dependency::Instance);
            }
        }
        Ok(Dependency::Value(arg.clone()))
    }

    /// Feed the instance through the alias's pipeline, in step order.
    fn run_pipeline(&mut self, alias: &str, instance: Instance) -> Result<Instance> {
        let steps = match self.pipelines.get(alias) {
            Some(steps) => steps.clone(),
            None => return Ok(instance),
        };
        let mut current = instance;
        for step in steps {
            current = step(current, self)?;
        }
        Ok(current)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.export())
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
