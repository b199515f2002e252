pub use strata_kernel::config::*;
pub use strata_kernel::params::*;

mod context;
mod profiles;
mod resolver;
mod selector;
mod store;

pub use context::ConfigContext;
pub use profiles::{
    ProfileAccessor, ScopedProfile, create_profile, delete_profile, edit_profile,
    set_default_profile,
};
pub use resolver::{PROFILE_PARAM, ParameterResolver};
pub use selector::{LOCAL_DIR_NAME, ScopeSelection, find_local_config, select};
pub use store::{ScopedDocumentStore, base_config_dir, global_config_path};
