//! Read-only accessor over the two parent pointers of `people` and the
//! chain walks built on them. Every walk carries a visited set and a depth
//! bound; the data is never assumed to be acyclic.

use sea_orm::QuerySelect;

use crate::{
  entity::{OverrideSource, person, person_pay_plan, role},
  prelude::*,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
  /// 1 is the direct parent of the start person.
  pub level: u32,
  pub person_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
  pub links: Vec<Link>,
  /// Set when the walk stopped on an already visited person.
  pub truncated: bool,
}

impl Chain {
  pub fn at(&self, level: u32) -> Option<i32> {
    self.links.iter().find(|link| link.level == level).map(|link| link.person_id)
  }

  pub fn person_ids(&self) -> impl Iterator<Item = i32> + '_ {
    self.links.iter().map(|link| link.person_id)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Downline {
  /// Everyone below the root, root excluded.
  pub person_ids: BTreeSet<i32>,
  /// Set when the depth bound cut the traversal short.
  pub truncated: bool,
}

pub struct Graph<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Graph<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn find(&self, person_id: i32) -> Result<Option<person::Model>> {
    Ok(person::Entity::find_by_id(person_id).one(self.db).await?)
  }

  pub async fn person(&self, person_id: i32) -> Result<person::Model> {
    self.find(person_id).await?.ok_or(Error::PersonNotFound)
  }

  pub async fn parent(
    &self,
    person_id: i32,
    source: OverrideSource,
  ) -> Result<Option<i32>> {
    let column = match source {
      OverrideSource::ReportsTo => person::Column::ReportsToId,
      OverrideSource::RecruitedBy => person::Column::RecruitedById,
    };

    let parent: Option<Option<i32>> = person::Entity::find_by_id(person_id)
      .select_only()
      .column(column)
      .into_tuple()
      .one(self.db)
      .await?;

    Ok(parent.flatten())
  }

  /// Walks up `source` from `start`, yielding at most `max_levels` ancestors.
  pub async fn walk(
    &self,
    start: i32,
    source: OverrideSource,
    max_levels: u32,
  ) -> Result<Chain> {
    let mut visited = HashSet::from([start]);
    let mut chain = Chain::default();
    let mut current = start;

    for level in 1..=max_levels {
      let Some(parent) = self.parent(current, source).await? else {
        break;
      };

      if !visited.insert(parent) {
        warn!(
          "Cycle in {} chain of person {} at person {}",
          source, start, parent
        );
        chain.truncated = true;
        break;
      }

      chain.links.push(Link { level, person_id: parent });
      current = parent;
    }

    Ok(chain)
  }

  /// Direct reports of `person_id`.
  pub async fn children(&self, person_id: i32) -> Result<Vec<i32>> {
    Ok(
      person::Entity::find()
        .select_only()
        .column(person::Column::Id)
        .filter(person::Column::ReportsToId.eq(person_id))
        .order_by_asc(person::Column::Id)
        .into_tuple()
        .all(self.db)
        .await?,
    )
  }

  /// People assigned to any of `office_ids`.
  pub async fn office_members(&self, office_ids: &[i32]) -> Result<Vec<i32>> {
    if office_ids.is_empty() {
      return Ok(Vec::new());
    }

    Ok(
      person::Entity::find()
        .select_only()
        .column(person::Column::Id)
        .filter(person::Column::OfficeId.is_in(office_ids.iter().copied()))
        .order_by_asc(person::Column::Id)
        .into_tuple()
        .all(self.db)
        .await?,
    )
  }

  /// Everyone reachable downward along `reports_to` from `root`.
  pub async fn downline(&self, root: i32, max_depth: usize) -> Result<Downline> {
    let mut visited = HashSet::from([root]);
    let mut downline = Downline::default();
    let mut frontier = vec![root];

    for _ in 0..max_depth {
      if frontier.is_empty() {
        break;
      }

      let children: Vec<i32> = person::Entity::find()
        .select_only()
        .column(person::Column::Id)
        .filter(person::Column::ReportsToId.is_in(frontier))
        .into_tuple()
        .all(self.db)
        .await?;

      frontier = children.into_iter().filter(|id| visited.insert(*id)).collect();
      downline.person_ids.extend(frontier.iter().copied());
    }

    if !frontier.is_empty() {
      warn!("Downline of person {} cut at depth {}", root, max_depth);
      downline.truncated = true;
    }

    Ok(downline)
  }

  pub async fn role(&self, person: &person::Model) -> Result<Option<role::Model>> {
    let Some(role_id) = person.role_id else {
      return Ok(None);
    };
    Ok(role::Entity::find_by_id(role_id).one(self.db).await?)
  }

  /// Pay plan in force for `person_id` on `as_of`: the latest assignment
  /// that has started and not yet ended.
  pub async fn current_pay_plan(
    &self,
    person_id: i32,
    as_of: Date,
  ) -> Result<Option<i32>> {
    let assignment = person_pay_plan::Entity::find()
      .filter(person_pay_plan::Column::PersonId.eq(person_id))
      .filter(person_pay_plan::Column::EffectiveDate.lte(as_of))
      .filter(
        Condition::any()
          .add(person_pay_plan::Column::EndDate.is_null())
          .add(person_pay_plan::Column::EndDate.gt(as_of)),
      )
      .order_by_desc(person_pay_plan::Column::EffectiveDate)
      .order_by_desc(person_pay_plan::Column::Id)
      .one(self.db)
      .await?;

    Ok(assignment.map(|assignment| assignment.pay_plan_id))
  }

  /// Whether making `parent` the `source` parent of `person_id` would close
  /// a loop.
  pub async fn would_cycle(
    &self,
    person_id: i32,
    parent: i32,
    source: OverrideSource,
  ) -> Result<bool> {
    if person_id == parent {
      return Ok(true);
    }

    let chain = self.walk(parent, source, u32::MAX).await?;
    Ok(chain.person_ids().any(|id| id == person_id))
  }
}
