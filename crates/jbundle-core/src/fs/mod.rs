//! Filesystem primitives shared across features.

pub mod replace;
pub mod tree_hash;

pub use replace::{create_dir_symlink, remove_path, replace_path};
pub use tree_hash::hash_tree;
