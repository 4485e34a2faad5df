mod chainmap;
mod error;
mod llrb;
mod tally;

pub use crate::chainmap::{ChainMap, ChainStats, Entry};
pub use crate::error::{ChainMapError, LlrbError};
pub use crate::llrb::{Llrb, Node, Stats};
pub use crate::tally::Tally;
