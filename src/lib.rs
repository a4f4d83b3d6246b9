//! ngtools - command controller for a volumetric image viewer.
//!
//! Drives a viewer's JSON state: which layers are loaded, how their sources
//! map into the display's coordinate axes, and how the screen is split into
//! panels.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  bin/ngtools  ─►  repl (line parser)          │
//! └──────────────────────┬───────────────────────┘
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │  Session<S: StateStore>                       │
//! │   display · transform · layout · load ·       │
//! │   unload · shader · state                     │
//! └───────┬──────────────────┬───────────────────┘
//!         ▼                  ▼
//!     ng-space           ng-layout          (both over ng-types)
//! ```
//!
//! Every command snapshots the state, edits the copy and commits it only when
//! the whole command succeeded.
//!
//! ```
//! use ngtools::{MemoryStore, Session};
//!
//! let mut session = Session::new(MemoryStore::default());
//! session.display(&["RAS"]).unwrap();
//! assert_eq!(
//!     session.state().display_dimensions.names(),
//!     &["right", "anterior", "superior"]
//! );
//! ```

pub mod affine_file;
pub mod config;
pub mod error;
pub mod logging;
#[cfg(feature = "cli")]
pub mod repl;
pub mod session;
pub mod shader;
pub mod store;

pub use affine_file::TextAffineLoader;
pub use config::Config;
pub use error::{SessionError, SessionResult};
pub use session::{default_layer_name, LoadRequest, Session, StateSource};
pub use shader::{ShaderCatalog, ShaderLibrary};
pub use store::{MemoryStore, StateStore};

pub use ng_layout as layout;
pub use ng_space as space;
pub use ng_types as types;
