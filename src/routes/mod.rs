pub mod analysis_route;
pub mod description_route;
pub mod page_route;
