pub mod day;
pub mod recommendation;
pub mod route;
pub mod weather;
