//! The window node container and split-pair bookkeeping.

pub mod node_container;
pub mod window_pair;


pub use node_container::{WindowNodeContainer, WindowUpdateReason};
pub use window_pair::{WindowPairInfo, WindowPairs};
