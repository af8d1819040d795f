pub mod borders;
pub mod features;
pub mod records;
pub mod topology;

pub use borders::*;
pub use features::*;
pub use records::*;
pub use topology::*;
