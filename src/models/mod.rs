pub mod skill;
pub mod analysis;

pub use skill::*;
pub use analysis::*;
