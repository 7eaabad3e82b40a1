mod ctx;
pub(crate) mod roller;
mod stringify;
mod tree;

pub use ctx::{DefaultRoller, RollContext};
pub use roller::Roller;
pub use stringify::{
    str_comparison, str_distribution, str_stats, SimpleStringifier, Stringify, VerboseStringifier,
};
pub use tree::{Die, Provenance, RawRoll, RollResult};
