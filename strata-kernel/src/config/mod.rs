mod document;
mod merge;
mod scope;

pub use document::{ConfigDocument, ProfileRecord};
pub use merge::EffectiveConfig;
pub use scope::Scope;
