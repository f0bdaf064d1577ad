//! Brand catalog commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use validator::Validate;

use autocatalog_core::config::AppConfig;
use autocatalog_core::error::AppError;
use autocatalog_core::types::PageRequest;
use autocatalog_database::UnitOfWork;
use autocatalog_entity::Brand;

use crate::output::{self, OutputFormat};

/// Arguments for brand commands
#[derive(Debug, Args)]
pub struct BrandArgs {
    /// Brand subcommand
    #[command(subcommand)]
    pub command: BrandCommand,
}

/// Brand subcommands
#[derive(Debug, Subcommand)]
pub enum BrandCommand {
    /// List brands, newest first when paged
    List {
        /// Page number (1-based)
        #[arg(long)]
        page: Option<i64>,
        /// Page size
        #[arg(long, default_value = "20")]
        page_size: i64,
    },
    /// Add a brand
    Add {
        /// Brand name
        description: String,
    },
    /// Remove a brand by id
    Remove {
        /// Brand id
        id: i32,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct BrandRow {
    #[tabled(rename = "Id")]
    id: i32,
    #[tabled(rename = "Descripcion")]
    #[serde(rename = "descripcion")]
    description: String,
    #[tabled(rename = "FIngreso")]
    #[serde(rename = "fIngreso")]
    created_at: String,
}

impl From<Brand> for BrandRow {
    fn from(brand: Brand) -> Self {
        Self {
            id: brand.id(),
            created_at: brand.base.created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            description: brand.description,
        }
    }
}

/// Execute brand commands
pub async fn execute(
    args: &BrandArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::connect_store(&config).await?;
    let uow = UnitOfWork::begin(&store);

    match &args.command {
        BrandCommand::List { page, page_size } => {
            let brands = match page {
                Some(page) => {
                    let window = PageRequest::new(*page, *page_size)?;
                    uow.brands()
                        .get_all()
                        .order_by_key_desc()
                        .page(window)
                        .fetch_all()
                        .await?
                }
                None => uow.brands().get_all_brands().await?,
            };
            let rows: Vec<BrandRow> = brands.into_iter().map(BrandRow::from).collect();
            output::rows(&rows, "The catalog has no brands.", format);
        }
        BrandCommand::Add { description } => {
            let brand = Brand::new(description.as_str());
            brand
                .validate()
                .map_err(|e| AppError::validation(e.to_string()))?;
            let tracked = uow.brands().add(brand)?;
            uow.save().await?;
            output::success(&format!("Brand '{description}' added with id {}", tracked.key()));
        }
        BrandCommand::Remove { id } => {
            if uow.brands().remove_by_id(*id).await? {
                uow.save().await?;
                output::success(&format!("Brand {id} removed"));
            } else {
                output::warning(&format!("Brand {id} not found"));
            }
        }
    }

    Ok(())
}
