pub mod handle_catalog;
pub mod handle_health;
pub mod handle_manifest;
pub mod handle_meta;
pub mod handle_providers;

pub use handle_catalog::catalog_handler;
pub use handle_health::health_handler;
pub use handle_manifest::manifest_handler;
pub use handle_meta::meta_handler;
pub use handle_providers::providers_handler;
