use serde::Deserialize;

use crate::{
  entity::{RecruitStatus, recruit},
  prelude::*,
  sv::{
    graph::Graph,
    scope,
    visibility::{EntityKind, VisibilityScope},
  },
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecruit {
  pub full_name: String,
  pub recruiter_id: i32,
  #[serde(default)]
  pub target_office_id: Option<i32>,
}

pub struct Recruits<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Recruits<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(&self, new: NewRecruit) -> Result<recruit::Model> {
    if new.full_name.trim().is_empty() {
      return Err(Error::InvalidArgs("name is empty".into()));
    }
    let recruiter = Graph::new(self.db).person(new.recruiter_id).await?;

    Ok(
      recruit::ActiveModel {
        id: NotSet,
        full_name: Set(new.full_name),
        recruiter_id: Set(recruiter.id),
        target_office_id: Set(new.target_office_id.or(recruiter.office_id)),
        status: Set(RecruitStatus::Lead),
        created_at: Set(Utc::now().naive_utc()),
      }
      .insert(self.db)
      .await?,
    )
  }

  pub async fn list(
    &self,
    scope: &VisibilityScope,
    status: Option<RecruitStatus>,
  ) -> Result<Vec<recruit::Model>> {
    let mut query = recruit::Entity::find()
      .filter(scope::condition(scope, EntityKind::Recruit));

    if let Some(status) = status {
      query = query.filter(recruit::Column::Status.eq(status));
    }

    Ok(query.order_by_desc(recruit::Column::CreatedAt).all(self.db).await?)
  }
}
