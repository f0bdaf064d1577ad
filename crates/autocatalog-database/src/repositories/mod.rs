//! Entity-specific repositories.

pub mod brand;

pub use brand::BrandRepository;
