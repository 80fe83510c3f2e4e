//! CLI command implementations.

pub mod deploy;
pub mod generate;
pub mod init;
pub mod list;
pub mod serve;

pub use deploy::deploy_site;
pub use generate::{generate_site, GenerateOptions};
pub use init::init_site;
pub use list::list_content;
pub use serve::{serve_site, DEFAULT_PORT};
