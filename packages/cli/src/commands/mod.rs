pub mod draft;
pub mod init;
pub mod replay;
mod script;

pub use draft::{draft, DraftArgs};
pub use init::{init, InitArgs};
pub use replay::{replay, ReplayArgs};
