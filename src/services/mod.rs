pub mod catalog_service;
pub mod chart_service;
pub mod output_service;
pub mod price_service;
pub mod refresh_service;
