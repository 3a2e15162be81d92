pub mod beds;
pub mod bucket;
pub mod geometry;
pub mod table;
pub mod tourism;
pub mod weather;
