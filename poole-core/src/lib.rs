//! # poole-core
//!
//! Core library for the poole static site generator.
//!
//! This crate holds the configuration, the content model, the build steps
//! and the post-process cache. Layout rendering is plugged in through
//! [`render::LayoutEngine`].

pub mod builder;
pub mod cache;
pub mod config;
pub mod converter;
pub mod fetch;
pub mod frontmatter;
pub mod hooks;
pub mod loader;
pub mod models;
pub mod optimize;
pub mod pipeline;
pub mod render;
pub mod site;
pub mod slug;
pub mod step;

pub use builder::{BuildError, Builder};
pub use config::{Config, ConfigError};
pub use hooks::{AfterStep, BeforeStep, HookRegistry};
pub use models::{Collection, FrontMatter, MenuEntry, Menus, Page, Taxonomies, Variable};
pub use render::{LayoutEngine, RenderError};
pub use site::Site;
pub use slug::slugify;
pub use step::{BuildOptions, BuildReport, StepPayload, StepReport};
