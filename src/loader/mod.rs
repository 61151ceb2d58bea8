// Loader module: tabular inputs, the chunked archive scan and the map token.

pub mod archive;
pub mod tables;
pub mod token;

pub use archive::ArchiveChunks;
pub use tables::{load_observations, load_taxonomy};
pub use token::read_token;
