pub mod bundle;
pub mod common;
pub mod flags;
pub mod patch;
pub mod plugin_key;
pub mod resource;
pub mod template;

pub use crate::domain::DomainError;
pub use bundle::Bundle;
pub use plugin_key::{PluginKey, PluginRequest};
pub use resource::Resource;
pub use template::Template;
