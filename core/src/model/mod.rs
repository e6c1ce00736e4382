pub mod repository;

mod audit;
mod id_types;
mod learning_module;
mod resource;
mod tab_configuration;
mod taxonomy;
mod user_setting;
pub use audit::*;
pub use id_types::*;
pub use learning_module::*;
pub use resource::*;
pub use tab_configuration::*;
pub use taxonomy::*;
pub use user_setting::*;

pub mod util;
