pub mod backend;
pub mod context;
pub mod material;
pub mod mesh;
pub mod pool;
pub mod shared;

pub use backend::*;
pub use context::*;
pub use material::*;
pub use mesh::*;
pub use pool::*;
pub use shared::*;
