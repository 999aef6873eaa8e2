pub mod entity;
pub mod error;
pub mod path;
pub mod result;

pub use entity::*;
pub use error::*;
pub use path::*;
pub use result::*;
