pub mod error;
pub mod filesystem;

pub use error::{ErrorKind, VffError};
pub use filesystem::{FileKind, FileStat};
