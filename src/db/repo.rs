mod account;
mod account_db;
mod account_file;
mod item;
mod item_db;
mod item_flat;
mod item_fs;
mod item_tree;

pub use account_db::AccountRepository;
pub use account_file::AccountFileStore;
pub use item_db::ItemRepository;
pub use item_flat::ItemFlatStore;
pub use item_tree::{ItemTreeStore, MAX_DEPTH};

pub use account::AccountRepo;
pub use item::{ItemRepo, ItemScan, LoadedRecord, Skipped};
