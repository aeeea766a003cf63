use sea_orm_migration::prelude::*;

use super::m20260201_000001_create_org::People;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PayPlans::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PayPlans::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(PayPlans::Name).string().not_null())
          .col(ColumnDef::new(PayPlans::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(PersonPayPlans::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PersonPayPlans::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(PersonPayPlans::PersonId).integer().not_null())
          .col(ColumnDef::new(PersonPayPlans::PayPlanId).integer().not_null())
          .col(ColumnDef::new(PersonPayPlans::EffectiveDate).date().not_null())
          .col(ColumnDef::new(PersonPayPlans::EndDate).date().null())
          .col(
            ColumnDef::new(PersonPayPlans::CreatedAt).date_time().not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_person_pay_plans_person")
              .from(PersonPayPlans::Table, PersonPayPlans::PersonId)
              .to(People::Table, People::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_person_pay_plans_plan")
              .from(PersonPayPlans::Table, PersonPayPlans::PayPlanId)
              .to(PayPlans::Table, PayPlans::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_person_pay_plans_person")
          .table(PersonPayPlans::Table)
          .col(PersonPayPlans::PersonId)
          .col(PersonPayPlans::EffectiveDate)
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(CommissionRules::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(CommissionRules::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(CommissionRules::PayPlanId).integer().not_null())
          .col(ColumnDef::new(CommissionRules::Name).string().not_null())
          .col(ColumnDef::new(CommissionRules::RuleType).string().not_null())
          .col(ColumnDef::new(CommissionRules::CalcMethod).string().not_null())
          .col(
            ColumnDef::new(CommissionRules::Amount)
              .decimal_len(14, 4)
              .not_null(),
          )
          .col(ColumnDef::new(CommissionRules::AppliesToRoleId).integer().null())
          .col(ColumnDef::new(CommissionRules::OverrideLevel).integer().null())
          .col(ColumnDef::new(CommissionRules::OverrideSource).string().null())
          .col(ColumnDef::new(CommissionRules::DealTypes).json().null())
          .col(ColumnDef::new(CommissionRules::Conditions).json().null())
          .col(
            ColumnDef::new(CommissionRules::SortOrder)
              .integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(CommissionRules::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(
            ColumnDef::new(CommissionRules::CreatedAt).date_time().not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_commission_rules_plan")
              .from(CommissionRules::Table, CommissionRules::PayPlanId)
              .to(PayPlans::Table, PayPlans::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_commission_rules_plan")
          .table(CommissionRules::Table)
          .col(CommissionRules::PayPlanId)
          .col(CommissionRules::SortOrder)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(CommissionRules::Table).to_owned())
      .await?;

    manager
      .drop_table(Table::drop().table(PersonPayPlans::Table).to_owned())
      .await?;

    manager.drop_table(Table::drop().table(PayPlans::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum PayPlans {
  Table,
  Id,
  Name,
  CreatedAt,
}

#[derive(DeriveIden)]
pub enum PersonPayPlans {
  Table,
  Id,
  PersonId,
  PayPlanId,
  EffectiveDate,
  EndDate,
  CreatedAt,
}

#[derive(DeriveIden)]
pub enum CommissionRules {
  Table,
  Id,
  PayPlanId,
  Name,
  RuleType,
  CalcMethod,
  Amount,
  AppliesToRoleId,
  OverrideLevel,
  OverrideSource,
  DealTypes,
  Conditions,
  SortOrder,
  IsActive,
  CreatedAt,
}
