//! Safe file operations behind the memory tool.
//!
//! Callers resolve virtual paths with [`memoria_core::Roots`] first; everything
//! here works on the resolved location and reports errors against the virtual
//! path the model supplied.
//!
//! - `listing`: sorted, hidden-filtered directory view
//! - `viewer`: line-numbered file view with optional range
//! - `mutate`: create / delete / insert / rename / unique replace / clear
//! - `atomic`: temp-file + rename rewrites

pub mod atomic;
pub mod listing;
pub mod mutate;
pub mod viewer;

pub use listing::{list_directory, Listing};
pub use mutate::{
    clear_directory, create_file, delete_file, ensure_writable, insert_line, rename_path,
    replace_unique,
};
pub use viewer::{number_lines, split_lines, view_file, ViewRange};
