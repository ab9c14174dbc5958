mod create;
mod show;

pub use create::*;
pub use show::*;
