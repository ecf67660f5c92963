pub mod search;

pub use search::SearchConfig;
