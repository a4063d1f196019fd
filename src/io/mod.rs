//! Input and output adapters
//!
//! Thin adapters between the filesystem and the linkage core: the roster
//! file, the letter tree, the NLP export, the directory listing cache and
//! the run artifacts.

pub mod cache;
pub mod directory;
pub mod output;
pub mod records;
pub mod roster;

pub use cache::DirectoryCache;
pub use directory::list_directory_tree;
pub use output::{write_id_list, write_matrix, write_summary};
pub use records::{load_all_records, parse_records};
pub use roster::{load_roster, parse_roster};
