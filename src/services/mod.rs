pub mod catalog_service;
pub mod film_service;
pub mod ranking;
pub mod review_service;
pub mod user_service;

#[cfg(test)]
mod fixtures;

pub use catalog_service::CatalogService;
pub use film_service::FilmService;
pub use review_service::ReviewService;
pub use user_service::UserService;
