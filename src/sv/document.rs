use serde::Deserialize;

use crate::{
  entity::document,
  prelude::*,
  sv::{
    graph::Graph,
    scope,
    visibility::{EntityKind, VisibilityScope},
  },
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
  pub title: String,
  pub person_id: i32,
  #[serde(default)]
  pub office_id: Option<i32>,
}

pub struct Documents<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Documents<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(&self, new: NewDocument) -> Result<document::Model> {
    let person = Graph::new(self.db).person(new.person_id).await?;

    Ok(
      document::ActiveModel {
        id: NotSet,
        title: Set(new.title),
        person_id: Set(person.id),
        office_id: Set(new.office_id.or(person.office_id)),
        status: Set("draft".into()),
        created_at: Set(Utc::now().naive_utc()),
      }
      .insert(self.db)
      .await?,
    )
  }

  pub async fn list(
    &self,
    scope: &VisibilityScope,
    status: Option<&str>,
  ) -> Result<Vec<document::Model>> {
    let mut query = document::Entity::find()
      .filter(scope::condition(scope, EntityKind::Document));

    if let Some(status) = status {
      query = query.filter(document::Column::Status.eq(status));
    }

    Ok(query.order_by_desc(document::Column::CreatedAt).all(self.db).await?)
  }
}
