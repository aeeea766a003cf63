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
          .table(Recruits::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Recruits::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Recruits::FullName).string().not_null())
          .col(ColumnDef::new(Recruits::RecruiterId).integer().not_null())
          .col(ColumnDef::new(Recruits::TargetOfficeId).integer().null())
          .col(
            ColumnDef::new(Recruits::Status)
              .string()
              .not_null()
              .default("lead"),
          )
          .col(ColumnDef::new(Recruits::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_recruits_recruiter")
              .from(Recruits::Table, Recruits::RecruiterId)
              .to(People::Table, People::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_recruits_target_office")
              .from(Recruits::Table, Recruits::TargetOfficeId)
              .to(Offices::Table, Offices::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(Documents::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Documents::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Documents::Title).string().not_null())
          .col(ColumnDef::new(Documents::PersonId).integer().not_null())
          .col(ColumnDef::new(Documents::OfficeId).integer().null())
          .col(
            ColumnDef::new(Documents::Status)
              .string()
              .not_null()
              .default("draft"),
          )
          .col(ColumnDef::new(Documents::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_documents_person")
              .from(Documents::Table, Documents::PersonId)
              .to(People::Table, People::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Documents::Table).to_owned())
      .await?;

    manager.drop_table(Table::drop().table(Recruits::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Recruits {
  Table,
  Id,
  FullName,
  RecruiterId,
  TargetOfficeId,
  Status,
  CreatedAt,
}

#[derive(DeriveIden)]
pub enum Documents {
  Table,
  Id,
  Title,
  PersonId,
  OfficeId,
  Status,
  CreatedAt,
}
