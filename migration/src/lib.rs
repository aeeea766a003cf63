pub use sea_orm_migration::prelude::*;

mod m20260201_000001_create_org;
mod m20260201_000002_create_pay_plans;
mod m20260201_000003_create_deals;
mod m20260201_000004_create_recruits;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260201_000001_create_org::Migration),
      Box::new(m20260201_000002_create_pay_plans::Migration),
      Box::new(m20260201_000003_create_deals::Migration),
      Box::new(m20260201_000004_create_recruits::Migration),
    ]
  }
}
