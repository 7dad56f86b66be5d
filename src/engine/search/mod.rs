pub mod limits;
pub mod ordering;
pub mod results;
pub mod searcher;
