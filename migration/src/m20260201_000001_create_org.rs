use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Roles::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Roles::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Roles::Name).string().not_null().unique_key())
          .col(ColumnDef::new(Roles::Level).integer().not_null().default(1))
          .col(
            ColumnDef::new(Roles::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(Roles::Permissions).json().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(Regions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Regions::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Regions::Name).string().not_null())
          .col(ColumnDef::new(Regions::ManagerId).integer().null())
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(Offices::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Offices::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Offices::Name).string().not_null())
          .col(ColumnDef::new(Offices::RegionId).integer().null())
          .col(ColumnDef::new(Offices::Division).string().null())
          .col(ColumnDef::new(Offices::LeaderId).integer().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_offices_region")
              .from(Offices::Table, Offices::RegionId)
              .to(Regions::Table, Regions::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_offices_region")
          .table(Offices::Table)
          .col(Offices::RegionId)
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(Teams::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Teams::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Teams::Name).string().not_null())
          .col(ColumnDef::new(Teams::OfficeId).integer().null())
          .col(ColumnDef::new(Teams::LeaderId).integer().null())
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(People::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(People::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(People::FirstName).string().not_null())
          .col(ColumnDef::new(People::LastName).string().not_null())
          .col(ColumnDef::new(People::RoleId).integer().null())
          .col(ColumnDef::new(People::OfficeId).integer().null())
          .col(ColumnDef::new(People::TeamId).integer().null())
          .col(ColumnDef::new(People::ReportsToId).integer().null())
          .col(ColumnDef::new(People::RecruitedById).integer().null())
          .col(
            ColumnDef::new(People::Status)
              .string()
              .not_null()
              .default("onboarding"),
          )
          .col(ColumnDef::new(People::SetterTier).string().null())
          .col(ColumnDef::new(People::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_people_role")
              .from(People::Table, People::RoleId)
              .to(Roles::Table, Roles::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_people_office")
              .from(People::Table, People::OfficeId)
              .to(Offices::Table, Offices::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_people_reports_to")
              .from(People::Table, People::ReportsToId)
              .to(People::Table, People::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_people_recruited_by")
              .from(People::Table, People::RecruitedById)
              .to(People::Table, People::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    for (name, col) in [
      ("idx_people_reports_to", People::ReportsToId),
      ("idx_people_recruited_by", People::RecruitedById),
      ("idx_people_office", People::OfficeId),
      ("idx_people_team", People::TeamId),
    ] {
      manager
        .create_index(
          Index::create().name(name).table(People::Table).col(col).to_owned(),
        )
        .await?;
    }

    Ok(())
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(People::Table).to_owned()).await?;
    manager.drop_table(Table::drop().table(Teams::Table).to_owned()).await?;
    manager.drop_table(Table::drop().table(Offices::Table).to_owned()).await?;
    manager.drop_table(Table::drop().table(Regions::Table).to_owned()).await?;
    manager.drop_table(Table::drop().table(Roles::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Roles {
  Table,
  Id,
  Name,
  Level,
  IsActive,
  Permissions,
}

#[derive(DeriveIden)]
pub enum Regions {
  Table,
  Id,
  Name,
  ManagerId,
}

#[derive(DeriveIden)]
pub enum Offices {
  Table,
  Id,
  Name,
  RegionId,
  Division,
  LeaderId,
}

#[derive(DeriveIden)]
pub enum Teams {
  Table,
  Id,
  Name,
  OfficeId,
  LeaderId,
}

#[derive(DeriveIden)]
pub enum People {
  Table,
  Id,
  FirstName,
  LastName,
  RoleId,
  OfficeId,
  TeamId,
  ReportsToId,
  RecruitedById,
  Status,
  SetterTier,
  CreatedAt,
}
