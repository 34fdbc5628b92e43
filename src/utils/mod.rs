pub mod logger;
pub mod path;

pub use path::trim_path;
