//! Gathering and analysis of what a city is saying about a news topic.

pub mod pipeline;
pub mod ranker;
pub mod retriever;

pub use pipeline::{CityDiscourse, DiscoursePipeline};
pub use ranker::rank;
pub use retriever::{Retriever, RetrieverOptions};
