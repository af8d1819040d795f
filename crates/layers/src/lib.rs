pub mod borders;
pub mod frontlines;
pub mod globe;
pub mod markers;
pub mod symbology;
pub mod triangulate;

pub use borders::*;
pub use frontlines::*;
pub use globe::*;
pub use markers::*;
pub use symbology::*;
pub use triangulate::*;
