mod bookmark;
mod file;
mod filter;
pub mod id_types;
mod learning_module;
pub mod resource;
mod tab_configuration;
mod taxonomy;
pub use bookmark::*;
pub use file::*;
pub use filter::*;
pub use id_types::*;
pub use learning_module::*;
pub use resource::*;
pub use tab_configuration::*;
pub use taxonomy::*;
