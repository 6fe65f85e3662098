pub mod mcp;
pub mod smiles;

pub use smiles::{CompoundSmiles, ReactionSmiles, SmilesError, REACTION_ARROW};
