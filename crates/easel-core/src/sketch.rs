//! # Sketch
//!
//! Loads a drawing script and runs it against a fresh [`Bot`].
//!
//! ## Responsibilities
//! - **Loading**: From a file (whose directory becomes the asset and module base) or a code string.
//! - **Running**: Top level, then the optional `setup()` and `draw()` hooks.
//! - **Frames**: Multi-frame rendering with `FRAME` advancing between frames.
//! - **Variables**: Values carry over between runs of the same sketch.

use crate::bot::{Bot, SharedBot};
use crate::errors::{EaselError, Result};
use crate::scripting::register_rhai_api;
use crate::systems::assets::AssetManager;
use crate::variables::{VarValue, Variable, VariableRegistry};
use crate::{AssetLoader, DefaultAssetLoader};
use rhai::module_resolvers::FileModuleResolver;
use rhai::{CallFnOptions, Dynamic, Engine, Scope, AST};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, MutexGuard};
use tracing::{debug, info, instrument};

/// Run options for library callers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchOptions {
    /// Letterboxes every output into this many pixels.
    pub fit: Option<(u32, u32)>,
    /// Turns `snapshot()` into a no-op for vector targets.
    pub disable_snapshots: bool,
}

/// The result of a run: the bot holding the final display list and variables.
pub struct RunOutcome {
    pub bot: Bot,
}

impl RunOutcome {
    /// Renders the display list to `target`.
    pub fn finish(&self, target: impl AsRef<Path>) -> Result<()> {
        self.bot.finish(target)
    }

    pub fn variables(&self) -> &[Variable] {
        self.bot.variables.variables()
    }
}

/// Everything needed to re-run the script for a vector snapshot.
#[derive(Clone)]
pub struct SnapshotSource {
    source: String,
    path: Option<PathBuf>,
    loader: Arc<dyn AssetLoader>,
    options: SketchOptions,
}

impl SnapshotSource {
    /// Re-runs the script headless with `values` and writes `target`.
    pub fn render(&self, values: Vec<(String, VarValue)>, target: &Path) -> Result<()> {
        let mut sketch = Sketch {
            source: self.source.clone(),
            path: self.path.clone(),
            loader: self.loader.clone(),
            options: SketchOptions {
                disable_snapshots: true,
                ..self.options.clone()
            },
            variables: VariableRegistry::new(),
        };
        for (name, value) in values {
            sketch.set_variable(&name, value);
        }
        sketch.render(target)?;
        info!(path = %target.display(), "Snapshot written");
        Ok(())
    }
}

/// A loaded script.
pub struct Sketch {
    source: String,
    path: Option<PathBuf>,
    loader: Arc<dyn AssetLoader>,
    options: SketchOptions,
    variables: VariableRegistry,
}

/// A compiled script with the state of its current run.
struct Session {
    engine: Engine,
    ast: AST,
    scope: Scope<'static>,
    bot: SharedBot,
}

fn script_error(e: impl std::fmt::Display) -> EaselError {
    EaselError::Script(e.to_string())
}

fn lock(bot: &SharedBot) -> Result<MutexGuard<'_, Bot>> {
    bot.lock()
        .map_err(|_| EaselError::Script("drawing state is unavailable (poisoned lock)".into()))
}

/// `out/anim.png`, frame 3 → `out/anim_0003.png`.
pub fn frame_path(target: &Path, frame: u32) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match target.extension() {
        Some(ext) => format!("{}_{:04}.{}", stem, frame, ext.to_string_lossy()),
        None => format!("{}_{:04}", stem, frame),
    };
    target.with_file_name(name)
}

impl Sketch {
    /// Treats `input` as a file path if such a file exists, otherwise as code.
    pub fn load(input: &str) -> Result<Self> {
        if Path::new(input).is_file() {
            Self::from_file(input)
        } else {
            Ok(Self::from_source(input))
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let mut sketch = Self::from_source(source);
        sketch.path = Some(path.to_path_buf());
        Ok(sketch)
    }

    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            path: None,
            loader: Arc::new(DefaultAssetLoader),
            options: SketchOptions::default(),
            variables: VariableRegistry::new(),
        }
    }

    pub fn with_loader(mut self, loader: Arc<dyn AssetLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_options(mut self, options: SketchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_variable(mut self, name: &str, value: VarValue) -> Self {
        self.set_variable(name, value);
        self
    }

    pub fn with_variables(mut self, values: impl IntoIterator<Item = (String, VarValue)>) -> Self {
        for (name, value) in values {
            self.set_variable(&name, value);
        }
        self
    }

    /// Overrides a variable for the next run.
    pub fn set_variable(&mut self, name: &str, value: VarValue) {
        self.variables.set(name, value);
    }

    /// Variables declared by the last run.
    pub fn variables(&self) -> &[Variable] {
        self.variables.variables()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Re-reads the script file, keeping variable values.
    pub fn reload(&mut self) -> Result<()> {
        if let Some(path) = &self.path {
            self.source = std::fs::read_to_string(path)?;
            debug!(path = %path.display(), "Script reloaded");
        }
        Ok(())
    }

    fn base_dir(&self) -> Option<PathBuf> {
        self.path
            .as_ref()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    fn snapshot_source(&self) -> Option<SnapshotSource> {
        if self.options.disable_snapshots {
            return None;
        }
        Some(SnapshotSource {
            source: self.source.clone(),
            path: self.path.clone(),
            loader: self.loader.clone(),
            options: self.options.clone(),
        })
    }

    /// Compiles the script and runs its top level at `frame`.
    fn start(&self, frame: u64) -> Result<Session> {
        let base_dir = self.base_dir();
        let mut bot = Bot::with_assets(
            AssetManager::new(self.loader.clone()).with_base_dir(base_dir.clone()),
        );
        bot.variables = self.variables.clone();
        bot.variables.begin_run();
        bot.set_fit(self.options.fit);
        bot.set_frame(frame);
        bot.set_snapshot_source(self.snapshot_source());
        let bot = bot.into_shared();

        let mut engine = Engine::new();
        if let Some(dir) = base_dir {
            engine.set_module_resolver(FileModuleResolver::new_with_path(dir));
        }
        register_rhai_api(&mut engine, bot.clone());

        let ast = engine.compile(&self.source).map_err(script_error)?;
        let mut scope = Scope::new();
        engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(script_error)?;

        Ok(Session {
            engine,
            ast,
            scope,
            bot,
        })
    }

    /// Calls a zero-argument hook if the script defines one.
    fn call_hook(session: &mut Session, name: &str) -> Result<bool> {
        let defined = session
            .ast
            .iter_functions()
            .any(|f| f.name == name && f.params.is_empty());
        if !defined {
            return Ok(false);
        }
        debug!(hook = name, "Calling hook");
        let options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
        session
            .engine
            .call_fn_with_options::<Dynamic>(options, &mut session.scope, &session.ast, name, ())
            .map_err(script_error)?;
        Ok(true)
    }

    /// Keeps the run's variables for the next run and hands the bot out.
    fn conclude(&mut self, session: Session) -> Result<RunOutcome> {
        let bot = std::mem::take(&mut *lock(&session.bot)?);
        self.variables = bot.variables.clone();
        Ok(RunOutcome { bot })
    }

    /// Runs the script once: top level, `setup()`, `draw()`.
    #[instrument(level = "debug", skip(self), fields(path = ?self.path))]
    pub fn run(&mut self) -> Result<RunOutcome> {
        let mut session = self.start(0)?;
        Self::call_hook(&mut session, "setup")?;
        Self::call_hook(&mut session, "draw")?;
        let outcome = self.conclude(session)?;
        debug!(grobs = outcome.bot.canvas.len(), "Run complete");
        Ok(outcome)
    }

    /// Runs the script and writes the result to `target`.
    pub fn render(&mut self, target: impl AsRef<Path>) -> Result<RunOutcome> {
        let outcome = self.run()?;
        outcome.finish(target)?;
        Ok(outcome)
    }

    /// Renders `frames` frames to numbered files next to `target`.
    ///
    /// `setup()` runs once. Before every frame after the first the canvas is
    /// cleared and the transform reset. `FRAME` counts from 1.
    #[instrument(level = "debug", skip(self, target), fields(path = ?self.path))]
    pub fn render_frames(&mut self, frames: u32, target: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let target = target.as_ref();
        let mut session = self.start(1)?;
        Self::call_hook(&mut session, "setup")?;

        let mut written = Vec::with_capacity(frames as usize);
        for frame in 1..=frames {
            if frame > 1 {
                let mut bot = lock(&session.bot)?;
                bot.canvas.clear();
                bot.reset();
                bot.set_frame(frame as u64);
            }
            Self::call_hook(&mut session, "draw")?;
            let path = frame_path(target, frame);
            lock(&session.bot)?.finish(&path)?;
            written.push(path);
        }

        self.conclude(session)?;
        info!(frames, "Frames written");
        Ok(written)
    }
}
