pub mod analysis;
pub mod certificate;
pub mod coverage;
pub mod enums;
pub mod exclusion;
pub mod project;
pub mod requirement;

pub use analysis::*;
pub use certificate::*;
pub use coverage::*;
pub use enums::*;
pub use exclusion::*;
pub use project::*;
pub use requirement::*;
