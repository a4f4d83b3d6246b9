//! Interactive command shell.
//!
//! Each input line is split shell-style and parsed with clap, then routed to
//! the matching [`Session`] command.
//!
//! ```text
//! ng> load zarr://host/brain.zarr --name brain
//! ng> display RAS
//! ng> transform 1 0 0 10  0 1 0 0  0 0 1 0 --layer brain
//! ng> layout xy 3d --stack row
//! ng> state --url
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use ng_layout::{EditFlags, LayoutRequest};
use ng_space::MatrixInput;
use ng_types::{LayerKind, StackDirection, ViewKind};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::session::{LoadRequest, Session, StateSource};
use crate::store::StateStore;

const PROMPT: &str = "ng> ";

// =============================================================================
// LINE GRAMMAR
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "ng", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Image,
    Segmentation,
    Annotation,
    Mesh,
}

impl From<KindArg> for LayerKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Image => LayerKind::Image,
            KindArg::Segmentation => LayerKind::Segmentation,
            KindArg::Annotation => LayerKind::Annotation,
            KindArg::Mesh => LayerKind::Mesh,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load one layer per locator
    Load {
        #[arg(required = true)]
        locators: Vec<String>,

        /// Layer name (single locator only)
        #[arg(long, short)]
        name: Option<String>,

        #[arg(long, short, value_enum, default_value = "image")]
        kind: KindArg,

        /// Affine applied after loading: numbers or a file
        #[arg(long, short, num_args = 1.., allow_negative_numbers = true)]
        transform: Option<Vec<String>>,
    },

    /// Remove layers (all when none are named)
    Unload { names: Vec<String> },

    /// Apply an affine to image layers
    Transform {
        /// Numbers, a JSON array, or a single file path
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<String>,

        #[arg(long = "layer", short)]
        layers: Vec<String>,

        /// Apply the inverse
        #[arg(long)]
        inv: bool,

        /// Moving image of a registration
        #[arg(long)]
        mov: Option<PathBuf>,

        /// Fixed image of a registration
        #[arg(long)]
        fix: Option<PathBuf>,
    },

    /// Set the shader of layers (all when none are named)
    Shader {
        /// Built-in name or shader code
        shader: String,

        #[arg(long = "layer", short)]
        layers: Vec<String>,
    },

    /// Change the display axes, e.g. `RAS`, `x y z`
    Display { dimensions: Vec<String> },

    /// Show or edit the panel layout
    Layout {
        views: Vec<ViewKind>,

        #[arg(long, short)]
        stack: Option<StackDirection>,

        #[arg(long = "layer", short)]
        layers: Vec<String>,

        #[arg(long, default_value_t = 1.0)]
        flex: f64,

        /// Append to the stack at this path (root when empty)
        #[arg(long, num_args = 0..)]
        append: Option<Vec<usize>>,

        /// Insert at this path
        #[arg(long, num_args = 1..)]
        insert: Option<Vec<usize>>,

        /// Remove the node at this path
        #[arg(long, num_args = 1..)]
        remove: Option<Vec<usize>>,
    },

    /// Print, save or load the viewer state
    State {
        /// Do not print the state
        #[arg(long)]
        no_print: bool,

        #[arg(long)]
        save: Option<PathBuf>,

        /// File, URL or JSON text
        #[arg(long)]
        load: Option<String>,

        /// Print as a viewer URL
        #[arg(long)]
        url: bool,
    },

    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

/// Result of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(Option<String>),
    Exit,
}

// =============================================================================
// TOKENIZER
// =============================================================================

/// Split a line on whitespace, honouring quotes and backslash escapes.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') | (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_token = true;
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(anyhow!("Unterminated quote"));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// A single non-numeric token names an affine file.
fn affine_file(values: &[String]) -> Option<&Path> {
    match values {
        [single] if single.parse::<f64>().is_err() && !single.trim_start().starts_with('[') => {
            Some(Path::new(single))
        }
        _ => None,
    }
}

// =============================================================================
// REPL
// =============================================================================

pub struct Repl<S: StateStore> {
    session: Session<S>,
    history: Option<PathBuf>,
}

impl<S: StateStore> Repl<S> {
    pub fn new(session: Session<S>) -> Self {
        Self {
            session,
            history: None,
        }
    }

    pub fn with_history(mut self, history: Option<PathBuf>) -> Self {
        self.history = history;
        self
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Run one line. Blank lines do nothing.
    pub fn execute_line(&mut self, line: &str) -> Result<Outcome> {
        let tokens = tokenize(line)?;
        if tokens.is_empty() {
            return Ok(Outcome::Continue(None));
        }

        let parsed = match Line::try_parse_from(&tokens) {
            Ok(parsed) => parsed,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp) => {
                return Ok(Outcome::Continue(Some(err.to_string())));
            }
            Err(err) => return Err(err.into()),
        };
        debug!(command = ?parsed.command, "executing");
        self.execute(parsed.command)
    }

    fn execute(&mut self, command: Command) -> Result<Outcome> {
        let output = match command {
            Command::Exit => return Ok(Outcome::Exit),
            Command::Load {
                locators,
                name,
                kind,
                transform,
            } => {
                let transform = match transform {
                    Some(values) => Some(self.matrix(&values, None, None)?),
                    None => None,
                };
                let request = LoadRequest {
                    locators,
                    name,
                    kind: kind.into(),
                    transform,
                };
                self.session.load(&request)?;
                None
            }
            Command::Unload { names } => {
                self.session.unload(&names)?;
                None
            }
            Command::Transform {
                values,
                layers,
                inv,
                mov,
                fix,
            } => {
                let matrix = self.matrix(&values, mov.as_deref(), fix.as_deref())?;
                self.session.transform(&matrix, &layers, inv)?;
                None
            }
            Command::Shader { shader, layers } => {
                self.session.shader(&shader, &layers)?;
                None
            }
            Command::Display { dimensions } => {
                self.session.display(&dimensions)?;
                None
            }
            Command::Layout {
                views,
                stack,
                layers,
                flex,
                append,
                insert,
                remove,
            } => {
                let query = views.is_empty() && remove.is_none();
                let mut request = LayoutRequest::views(views)
                    .with_layers(layers)
                    .with_edit(EditFlags {
                        append,
                        insert,
                        remove,
                    });
                request.stack = stack;
                request.flex = flex;
                let layout = self.session.layout(&request)?;
                if query {
                    Some(serde_json::to_string_pretty(&layout)?)
                } else {
                    None
                }
            }
            Command::State {
                no_print,
                save,
                load,
                url,
            } => {
                if let Some(source) = load {
                    self.session.load_state(&StateSource::detect(&source))?;
                }
                if let Some(path) = save {
                    self.session.save_state(&path)?;
                }
                match (no_print, url) {
                    (true, _) => None,
                    (false, true) => Some(self.session.state_url()?),
                    (false, false) => Some(self.session.state_json()?),
                }
            }
        };
        Ok(Outcome::Continue(output))
    }

    fn matrix(
        &self,
        values: &[String],
        moving: Option<&Path>,
        fixed: Option<&Path>,
    ) -> Result<MatrixInput> {
        match affine_file(values) {
            Some(path) => Ok(self.session.read_affine(path, moving, fixed)?),
            None if moving.is_some() || fixed.is_some() => {
                Err(anyhow!("--mov and --fix need an affine file"))
            }
            None => Ok(MatrixInput::parse_tokens(values).map_err(SessionError::from)?),
        }
    }

    /// Read lines until `exit`, end of input or interrupt.
    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = &self.history {
            if editor.load_history(path).is_err() {
                debug!(path = %path.display(), "no previous history");
            }
        }

        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(err) = editor.add_history_entry(line.as_str()) {
                            debug!(error = %err, "history entry not recorded");
                        }
                    }
                    match self.execute_line(&line) {
                        Ok(Outcome::Exit) => break,
                        Ok(Outcome::Continue(Some(output))) => println!("{output}"),
                        Ok(Outcome::Continue(None)) => {}
                        Err(err) => report(&err),
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(path) = &self.history {
            if let Err(err) = editor.save_history(path) {
                warn!(path = %path.display(), error = %err, "could not save history");
            }
        }
        Ok(())
    }
}

/// Print an error the way the shell shows it.
pub fn report(err: &anyhow::Error) {
    match err.downcast_ref::<SessionError>() {
        Some(session) => eprintln!("{} [{}]: {}", "error".red().bold(), session.code(), session),
        None => eprintln!("{}: {}", "error".red().bold(), err),
    }
}
