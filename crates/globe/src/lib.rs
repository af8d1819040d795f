//! Interactive conflict globe: the per-frame loop tying data, overlays,
//! animation and pointer input together.

pub mod animation;
pub mod config;
pub mod error;
pub mod events;
pub mod interaction;
pub mod state;
pub mod timeline;
pub mod viewer;

pub use animation::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use interaction::*;
pub use state::*;
pub use timeline::*;
pub use viewer::*;
