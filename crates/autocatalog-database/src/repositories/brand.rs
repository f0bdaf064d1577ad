//! Brand repository.

use autocatalog_core::result::AppResult;
use autocatalog_entity::Brand;

use crate::repository::Repository;

/// Repository for the `MarcasAutos` table.
pub type BrandRepository = Repository<Brand>;

impl Repository<Brand> {
    /// Every brand, fully materialized, in key order.
    pub async fn get_all_brands(&self) -> AppResult<Vec<Brand>> {
        self.get_all().order_by_key().fetch_all().await
    }
}
