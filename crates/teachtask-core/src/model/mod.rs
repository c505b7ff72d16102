//! Item model shared by the task and todo collections.

pub mod item;

pub use item::{
    Item, ParseEnumError, Priority, Status, StatusFilter, Variant, next_item_id, title_from_text,
};
