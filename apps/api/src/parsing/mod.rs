pub mod decode;
pub mod heuristic;
pub mod normalize;
pub mod parser;
pub mod prompts;
