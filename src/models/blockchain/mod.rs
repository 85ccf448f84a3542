//! Chain data models consumed by the listener.
//!
//! - `block`: blocks and their transactions
//! - `event`: log events
//! - `specifier`: block heights and named tags

mod block;
mod event;
mod specifier;

pub use block::{Block, Transaction};
pub use event::Event;
pub use specifier::{parse_block_specifier, specifier_serde, BlockId, BlockTag};
