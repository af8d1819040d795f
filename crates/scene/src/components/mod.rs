pub mod drawable;
pub mod layer;
pub mod pick;
pub mod transform;

pub use drawable::*;
pub use layer::*;
pub use pick::*;
pub use transform::*;
