pub mod config;
pub mod error;
pub mod logger;
pub mod poller;
pub mod post;
pub mod post_list;
pub mod render;
pub mod render_tree;
pub mod server;
pub mod site;
mod text_utils;
mod view;
pub mod writer;

pub use error::{Error, Result};
