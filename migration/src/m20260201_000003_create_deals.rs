use sea_orm_migration::prelude::*;

use super::m20260201_000001_create_org::{Offices, People};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Deals::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Deals::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Deals::SetterId).integer().not_null())
          .col(ColumnDef::new(Deals::CloserId).integer().not_null())
          .col(
            ColumnDef::new(Deals::IsSelfGen)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(Deals::DealType).string().not_null())
          .col(ColumnDef::new(Deals::DealValue).decimal_len(14, 2).not_null())
          .col(
            ColumnDef::new(Deals::SystemSizeKw).decimal_len(10, 3).not_null(),
          )
          .col(ColumnDef::new(Deals::Ppw).decimal_len(10, 4).null())
          .col(ColumnDef::new(Deals::SaleDate).date().null())
          .col(ColumnDef::new(Deals::CloseDate).date().null())
          .col(ColumnDef::new(Deals::OfficeId).integer().null())
          .col(
            ColumnDef::new(Deals::Status).string().not_null().default("sold"),
          )
          .col(ColumnDef::new(Deals::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Deals::UpdatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_deals_setter")
              .from(Deals::Table, Deals::SetterId)
              .to(People::Table, People::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_deals_closer")
              .from(Deals::Table, Deals::CloserId)
              .to(People::Table, People::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_deals_office")
              .from(Deals::Table, Deals::OfficeId)
              .to(Offices::Table, Offices::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    for (name, col) in [
      ("idx_deals_setter", Deals::SetterId),
      ("idx_deals_closer", Deals::CloserId),
      ("idx_deals_office", Deals::OfficeId),
    ] {
      manager
        .create_index(
          Index::create().name(name).table(Deals::Table).col(col).to_owned(),
        )
        .await?;
    }

    manager
      .create_table(
        Table::create()
          .table(Commissions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Commissions::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Commissions::DealId).integer().not_null())
          .col(ColumnDef::new(Commissions::PersonId).integer().not_null())
          .col(ColumnDef::new(Commissions::RuleId).integer().null())
          .col(ColumnDef::new(Commissions::CommissionType).string().not_null())
          .col(
            ColumnDef::new(Commissions::Amount).decimal_len(14, 2).not_null(),
          )
          .col(
            ColumnDef::new(Commissions::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(Commissions::StatusReason).string().null())
          .col(ColumnDef::new(Commissions::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Commissions::UpdatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_commissions_deal")
              .from(Commissions::Table, Commissions::DealId)
              .to(Deals::Table, Deals::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_commissions_person")
              .from(Commissions::Table, Commissions::PersonId)
              .to(People::Table, People::Id),
          )
          .to_owned(),
      )
      .await?;

    for (name, col) in [
      ("idx_commissions_deal", Commissions::DealId),
      ("idx_commissions_person", Commissions::PersonId),
    ] {
      manager
        .create_index(
          Index::create()
            .name(name)
            .table(Commissions::Table)
            .col(col)
            .to_owned(),
        )
        .await?;
    }

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Commissions::Table).to_owned())
      .await?;

    manager.drop_table(Table::drop().table(Deals::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Deals {
  Table,
  Id,
  SetterId,
  CloserId,
  IsSelfGen,
  DealType,
  DealValue,
  SystemSizeKw,
  Ppw,
  SaleDate,
  CloseDate,
  OfficeId,
  Status,
  CreatedAt,
  UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Commissions {
  Table,
  Id,
  DealId,
  PersonId,
  RuleId,
  CommissionType,
  Amount,
  Status,
  StatusReason,
  CreatedAt,
  UpdatedAt,
}
