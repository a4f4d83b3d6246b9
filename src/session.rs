//! Session orchestration.
//!
//! A [`Session`] owns the state store, the external collaborators and the
//! current display order. Every command follows the same shape:
//!
//! ```text
//! snapshot ──► edit private copy ──► commit
//!                    │
//!                    └── error ──► nothing committed
//! ```

use std::path::Path;

use ng_layout::LayoutRequest;
use ng_space::{
    AffineApplier, AffineConvention, AffineLoader, AffineTransform, AxisAliases, DescribeError,
    DescriptionProvider, MatrixInput, NeuroAxes, NeuroTransforms, NoDescriptions, Orienter,
    TransformTable,
};
use ng_types::{
    DisplayDimensions, Layer, LayerKind, LayoutNode, Source, SourceDescription, SourceMetadata,
    ViewerState, DEFAULT_BASE_URL,
};
use tracing::{debug, info, warn};

use crate::affine_file::TextAffineLoader;
use crate::error::{SessionError, SessionResult};
use crate::shader::{ShaderCatalog, ShaderLibrary};
use crate::store::StateStore;

/// Arguments of a `load` command.
#[derive(Debug, Clone, Default)]
pub struct LoadRequest {
    pub locators: Vec<String>,
    /// Layer name; only valid with a single locator.
    pub name: Option<String>,
    pub kind: LayerKind,
    /// Affine applied to the new layers after loading.
    pub transform: Option<MatrixInput>,
}

impl LoadRequest {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locators: vec![locator.into()],
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Where `load_state` reads a state from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateSource {
    File(std::path::PathBuf),
    Url(String),
    Json(String),
}

impl StateSource {
    /// Existing paths are files, text containing `://` is a URL, anything
    /// else is JSON.
    pub fn detect(text: &str) -> Self {
        let path = Path::new(text);
        if path.is_file() {
            StateSource::File(path.to_path_buf())
        } else if text.contains("://") {
            StateSource::Url(text.to_string())
        } else {
            StateSource::Json(text.to_string())
        }
    }
}

/// One controller session over a state store.
pub struct Session<S: StateStore> {
    store: S,
    provider: Box<dyn DescriptionProvider>,
    table: Box<dyn TransformTable>,
    aliases: Box<dyn AxisAliases>,
    shaders: Box<dyn ShaderCatalog>,
    loader: Box<dyn AffineLoader>,
    convention: AffineConvention,
    display: DisplayDimensions,
    base_url: String,
}

impl<S: StateStore> Session<S> {
    /// Session with the built-in tables and no description provider.
    pub fn new(store: S) -> Self {
        let display = store.snapshot().display_dimensions;
        Self {
            store,
            provider: Box::new(NoDescriptions),
            table: Box::new(NeuroTransforms),
            aliases: Box::new(NeuroAxes),
            shaders: Box::new(ShaderLibrary::builtin()),
            loader: Box::new(TextAffineLoader),
            convention: AffineConvention::ras(),
            display,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_provider(mut self, provider: Box<dyn DescriptionProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_table(mut self, table: Box<dyn TransformTable>) -> Self {
        self.table = table;
        self
    }

    pub fn with_aliases(mut self, aliases: Box<dyn AxisAliases>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_shaders(mut self, shaders: Box<dyn ShaderCatalog>) -> Self {
        self.shaders = shaders;
        self
    }

    pub fn with_loader(mut self, loader: Box<dyn AffineLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_convention(mut self, convention: AffineConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Current display order.
    pub fn display_dimensions(&self) -> &DisplayDimensions {
        &self.display
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `edit` on a snapshot and commit it only on success.
    fn transact<T>(
        &mut self,
        edit: impl FnOnce(&Self, &mut ViewerState) -> SessionResult<T>,
    ) -> SessionResult<T> {
        let mut state = self.store.snapshot();
        let out = edit(self, &mut state)?;
        self.store.commit(state);
        Ok(out)
    }

    fn orienter(&self) -> Orienter<'_> {
        Orienter::new(&*self.provider, &*self.table, &*self.aliases)
    }

    /// Change the display order and reorient image sources to it.
    ///
    /// No tokens re-applies the current order.
    pub fn display<T: AsRef<str>>(&mut self, tokens: &[T]) -> SessionResult<DisplayDimensions> {
        let current = self.display.clone();
        let order = self.transact(|session, state| {
            Ok(session.orienter().set_display(state, &current, tokens)?)
        })?;
        info!(display = ?order.names(), "display updated");
        self.display = order.clone();
        Ok(order)
    }

    /// Compose an affine onto image layers (all when `layers` is empty).
    ///
    /// Returns the number of sources transformed.
    pub fn transform(
        &mut self,
        matrix: &MatrixInput,
        layers: &[String],
        invert: bool,
    ) -> SessionResult<usize> {
        let affine = AffineTransform::from_input(matrix, invert, &self.convention)?;
        let current = self.display.clone();
        let applied = self.transact(|session, state| {
            check_layers(state, layers)?;
            let orienter = session.orienter();
            let applier = AffineApplier::new(&orienter, session.convention.clone());
            Ok(applier.apply(state, &current, &affine, layers)?)
        })?;
        info!(applied, invert, "affine applied");
        Ok(applied)
    }

    /// Read an affine with the configured loader.
    pub fn read_affine(
        &self,
        path: &Path,
        moving: Option<&Path>,
        fixed: Option<&Path>,
    ) -> SessionResult<MatrixInput> {
        Ok(self.loader.load(path, moving, fixed)?)
    }

    /// Read an affine with the configured loader, then apply it.
    pub fn transform_file(
        &mut self,
        path: &Path,
        moving: Option<&Path>,
        fixed: Option<&Path>,
        layers: &[String],
        invert: bool,
    ) -> SessionResult<usize> {
        let matrix = self.read_affine(path, moving, fixed)?;
        self.transform(&matrix, layers, invert)
    }

    /// Edit or query the layout. Returns the layout now in effect.
    pub fn layout(&mut self, request: &LayoutRequest) -> SessionResult<LayoutNode> {
        self.transact(|_, state| {
            let layout = ng_layout::apply(&state.layout, request, &state.layer_names())?;
            state.layout = layout.clone();
            Ok(layout)
        })
    }

    /// Add one image layer per locator. Returns the new layer names.
    pub fn load(&mut self, request: &LoadRequest) -> SessionResult<Vec<String>> {
        if request.locators.is_empty() {
            return Err(SessionError::NothingToLoad);
        }
        if request.name.is_some() && request.locators.len() > 1 {
            return Err(SessionError::NameForMany);
        }
        let affine = request
            .transform
            .as_ref()
            .map(|matrix| AffineTransform::from_input(matrix, false, &self.convention))
            .transpose()?;
        let current = self.display.clone();

        let names = self.transact(|session, state| {
            let mut names = Vec::with_capacity(request.locators.len());
            for locator in &request.locators {
                let name = request
                    .name
                    .clone()
                    .unwrap_or_else(|| default_layer_name(locator));
                if state.contains_layer(&name) {
                    return Err(SessionError::DuplicateLayer(name));
                }
                let layer = session.describe_layer(locator, &name, request.kind.clone());
                state.layers.push(layer);
                names.push(name);
            }

            let orienter = session.orienter();
            if let Some(affine) = &affine {
                AffineApplier::new(&orienter, session.convention.clone())
                    .apply(state, &current, affine, &names)?;
            }
            orienter.orient_to(state, &current);
            Ok(names)
        })?;
        info!(layers = ?names, "layers loaded");
        Ok(names)
    }

    /// Build a layer from whatever the provider knows about `locator`.
    fn describe_layer(&self, locator: &str, name: &str, kind: LayerKind) -> Layer {
        let mut source = Source::new(locator);
        let description = if source.is_local() {
            SourceDescription::default()
        } else {
            match self.provider.describe(locator) {
                Ok(description) => description,
                Err(DescribeError::NotFound(_)) => SourceDescription::default(),
                Err(err) => {
                    warn!(locator, error = %err, "description provider failed");
                    SourceDescription::default()
                }
            }
        };
        source.transform = description.transform.clone();

        let mut layer = Layer::new(name, kind, vec![source]);
        layer.shader_controls = description.quantiles.as_ref().map(|q| q.shader_controls());
        debug!(name, has_transform = description.has_transform(), "layer described");
        layer
    }

    /// Remove layers by name; no names removes every layer.
    ///
    /// An unknown name fails the whole command and removes nothing.
    pub fn unload(&mut self, names: &[String]) -> SessionResult<Vec<String>> {
        let removed = self.transact(|_, state| {
            let names = if names.is_empty() {
                state.layer_names()
            } else {
                check_layers(state, names)?;
                names.to_vec()
            };
            for name in &names {
                state.remove_layer(name);
            }
            Ok(names)
        })?;
        info!(layers = ?removed, "layers unloaded");
        Ok(removed)
    }

    /// Set the shader of the named layers (all when `layers` is empty).
    pub fn shader(&mut self, shader: &str, layers: &[String]) -> SessionResult<usize> {
        let code = self.shaders.resolve(shader);
        self.transact(|_, state| {
            check_layers(state, layers)?;
            let mut changed = 0;
            for layer in state
                .layers
                .iter_mut()
                .filter(|layer| layers.is_empty() || layers.contains(&layer.name))
            {
                layer.shader = Some(code.clone());
                changed += 1;
            }
            Ok(changed)
        })
    }

    pub fn state(&self) -> ViewerState {
        self.store.snapshot()
    }

    pub fn state_json(&self) -> SessionResult<String> {
        Ok(self.state().to_json_pretty()?)
    }

    pub fn state_url(&self) -> SessionResult<String> {
        Ok(self.state().to_url(&self.base_url)?)
    }

    pub fn save_state(&self, path: &Path) -> SessionResult<()> {
        let json = self.state_json()?;
        std::fs::write(path, json).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "state saved");
        Ok(())
    }

    /// Replace the whole state. Its display order becomes the session's.
    pub fn load_state(&mut self, source: &StateSource) -> SessionResult<()> {
        let state = match source {
            StateSource::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
                    path: path.clone(),
                    source,
                })?;
                ViewerState::from_json_str(&text)?
            }
            StateSource::Url(url) => ViewerState::from_url(url)?,
            StateSource::Json(json) => ViewerState::from_json_str(json)?,
        };
        let display = state.display_dimensions.clone();
        self.transact(move |_, current| {
            *current = state;
            Ok(())
        })?;
        self.display = display;
        info!(layers = self.state().layers.len(), "state loaded");
        Ok(())
    }
}

/// Fail on the first name that is not a layer.
fn check_layers(state: &ViewerState, names: &[String]) -> SessionResult<()> {
    match names.iter().find(|name| !state.contains_layer(name)) {
        Some(missing) => Err(SessionError::UnknownLayer(missing.clone())),
        None => Ok(()),
    }
}

/// Last path segment of a locator.
pub fn default_layer_name(locator: &str) -> String {
    locator
        .trim_end_matches('/')
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(locator)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use ng_space::DescriptionCatalog;
    use ng_types::{CoordinateSpace, IntensityQuantiles};

    fn session() -> Session<MemoryStore> {
        let mut catalog = DescriptionCatalog::new();
        catalog.insert(
            "zarr://host/brain.zarr",
            SourceDescription {
                dimensions: Some(CoordinateSpace::uniform(["x", "y", "z"], "mm", 1.0).unwrap()),
                quantiles: Some(IntensityQuantiles {
                    min: 0.0,
                    low: 5.0,
                    high: 95.0,
                    max: 100.0,
                }),
                ..Default::default()
            },
        );
        Session::new(MemoryStore::default()).with_provider(Box::new(catalog))
    }

    #[test]
    fn default_names_use_last_segment() {
        assert_eq!(default_layer_name("nifti://http://host/dir/brain.nii.gz"), "brain.nii.gz");
        assert_eq!(default_layer_name("zarr://host/brain.zarr/"), "brain.zarr");
        assert_eq!(default_layer_name("plain"), "plain");
    }

    #[test]
    fn load_adds_controls_from_quantiles() {
        let mut session = session();
        let names = session.load(&LoadRequest::new("zarr://host/brain.zarr")).unwrap();
        assert_eq!(names, vec!["brain.zarr".to_string()]);

        let state = session.state();
        let controls = state.layers[0].shader_controls.as_ref().unwrap();
        assert_eq!(controls["normalized"]["range"], serde_json::json!([5.0, 95.0]));
    }

    #[test]
    fn duplicate_layer_name_is_rejected() {
        let mut session = session();
        session.load(&LoadRequest::new("zarr://host/brain.zarr")).unwrap();
        let err = session
            .load(&LoadRequest::new("zarr://other/brain.zarr"))
            .unwrap_err();
        assert!(matches!(err, SessionError::DuplicateLayer(name) if name == "brain.zarr"));
        assert_eq!(session.state().layers.len(), 1);
    }

    #[test]
    fn one_name_for_many_locators_is_rejected() {
        let mut session = session();
        let request = LoadRequest {
            locators: vec!["zarr://a".into(), "zarr://b".into()],
            name: Some("both".into()),
            ..Default::default()
        };
        assert!(matches!(session.load(&request), Err(SessionError::NameForMany)));
    }

    #[test]
    fn failed_command_commits_nothing() {
        let mut session = session();
        session.load(&LoadRequest::new("zarr://host/brain.zarr")).unwrap();
        let commits = session.store().commits();

        assert!(session.display(&["x", "y"]).is_err());
        assert!(session.shader("jet", &["missing".to_string()]).is_err());
        assert_eq!(session.store().commits(), commits);
    }

    #[test]
    fn state_source_detection() {
        assert_eq!(
            StateSource::detect("https://host/#!{}"),
            StateSource::Url("https://host/#!{}".into())
        );
        assert_eq!(StateSource::detect("{}"), StateSource::Json("{}".into()));
    }
}
