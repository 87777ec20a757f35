pub mod constants;
pub mod loader;
pub mod runtime;

pub use self::loader::{load_program, LoadError};
pub use self::runtime::{ExecutionError, Machine};
