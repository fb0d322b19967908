pub mod generated;
pub mod openai;
pub mod selection;

pub use generated::*;
pub use openai::*;
pub use selection::*;
