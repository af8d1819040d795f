pub mod cache;
pub mod pipeline;
pub mod queue;
pub mod request;

pub use cache::*;
pub use pipeline::*;
pub use queue::*;
pub use request::*;
