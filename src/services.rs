mod account;
mod item;

pub use account::AccountService;
pub use item::ItemService;
