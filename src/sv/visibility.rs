//! Who may see what: maps an actor's permissions and live org position to a
//! [`VisibilityScope`] per entity family. Scopes are recomputed per request.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  entity::{office, person, region, team},
  prelude::*,
  sv::{graph::Graph, scope},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
  Person,
  Deal,
  Commission,
  Recruit,
  Document,
}

impl EntityKind {
  pub const ALL: [EntityKind; 5] =
    [Self::Person, Self::Deal, Self::Commission, Self::Recruit, Self::Document];

  fn plural(&self) -> &'static str {
    match self {
      Self::Person => "people",
      Self::Deal => "deals",
      Self::Commission => "commissions",
      Self::Recruit => "recruits",
      Self::Document => "documents",
    }
  }
}

/// Breadth of visibility, widest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
  All,
  Region,
  Office,
  Team,
  SelfOnly,
}

impl Tier {
  fn name(&self) -> &'static str {
    match self {
      Self::All => "all",
      Self::Region => "region",
      Self::Office => "office",
      Self::Team => "team",
      Self::SelfOnly => "self",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
  /// Top-level management; implies every other permission.
  Admin,
  View(EntityKind, Tier),
  ManageDeals,
  ApproveCommissions,
}

impl FromStr for Permission {
  type Err = String;

  /// `admin`, `deals.manage`, `commissions.approve` or `<kind>.view.<tier>`.
  fn from_str(raw: &str) -> Result<Self, Self::Err> {
    match raw.trim() {
      "admin" => return Ok(Self::Admin),
      "deals.manage" => return Ok(Self::ManageDeals),
      "commissions.approve" => return Ok(Self::ApproveCommissions),
      _ => {}
    }

    let mut parts = raw.trim().split('.');
    let (Some(kind), Some("view"), Some(tier), None) =
      (parts.next(), parts.next(), parts.next(), parts.next())
    else {
      return Err(format!("unknown permission `{raw}`"));
    };

    let kind = EntityKind::ALL
      .into_iter()
      .find(|candidate| candidate.plural() == kind)
      .ok_or_else(|| format!("unknown entity in `{raw}`"))?;
    let tier = PRECEDENCE
      .into_iter()
      .chain([Tier::SelfOnly])
      .find(|candidate| candidate.name() == tier)
      .ok_or_else(|| format!("unknown tier in `{raw}`"))?;

    Ok(Self::View(kind, tier))
  }
}

impl fmt::Display for Permission {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Admin => f.write_str("admin"),
      Self::ManageDeals => f.write_str("deals.manage"),
      Self::ApproveCommissions => f.write_str("commissions.approve"),
      Self::View(kind, tier) => {
        write!(f, "{}.view.{}", kind.plural(), tier.name())
      }
    }
  }
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct Actor {
  pub person_id: i32,
  pub office_id: Option<i32>,
  pub role_name: String,
  pub role_level: i32,
  pub permissions: HashSet<Permission>,
}

impl Actor {
  pub fn has_permission(&self, permission: Permission) -> bool {
    self.permissions.contains(&Permission::Admin)
      || self.permissions.contains(&permission)
  }

  /// Loads the person and the permissions carried by their role. Unknown
  /// permission names are dropped.
  pub async fn load(db: &DatabaseConnection, person_id: i32) -> Result<Self> {
    let graph = Graph::new(db);
    let person = graph.person(person_id).await?;
    let role = graph.role(&person).await?.filter(|role| role.is_active);

    let (role_name, role_level, permissions) = match role {
      Some(role) => {
        let names: Vec<String> =
          json::from_value(role.permissions).unwrap_or_else(|err| {
            warn!("Role {} has malformed permissions: {}", role.id, err);
            Vec::new()
          });

        let permissions: HashSet<Permission> = names
          .iter()
          .filter_map(|name| match name.parse::<Permission>() {
            Ok(permission) => Some(permission),
            Err(err) => {
              warn!("Role {}: {}", role.id, err);
              None
            }
          })
          .collect();

        (role.name, role.level, permissions)
      }
      None => (String::new(), 0, HashSet::new()),
    };

    Ok(Self {
      person_id: person.id,
      office_id: person.office_id,
      role_name,
      role_level,
      permissions,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VisibilityScope {
  #[serde(rename = "self")]
  SelfOnly { person_id: i32 },
  Team { person_ids: BTreeSet<i32> },
  Offices { office_ids: BTreeSet<i32> },
  All,
}

impl VisibilityScope {
  /// `None` when unrestricted.
  pub fn restriction(&self) -> Option<&Self> {
    match self {
      Self::All => None,
      scope => Some(scope),
    }
  }
}

type Grant = fn(&Actor, EntityKind) -> bool;

/// Tiers in strict precedence; the first granted one wins.
const PRECEDENCE: [Tier; 4] = [Tier::All, Tier::Region, Tier::Office, Tier::Team];

const LADDER: [(Tier, Grant); 4] = [
  (Tier::All, grants_all),
  (Tier::Region, grants_region),
  (Tier::Office, grants_office),
  (Tier::Team, grants_team),
];

fn grants_all(actor: &Actor, kind: EntityKind) -> bool {
  actor.has_permission(Permission::View(kind, Tier::All))
}

fn grants_region(actor: &Actor, kind: EntityKind) -> bool {
  actor.permissions.contains(&Permission::View(kind, Tier::Region))
}

fn grants_office(actor: &Actor, kind: EntityKind) -> bool {
  actor.permissions.contains(&Permission::View(kind, Tier::Office))
}

fn grants_team(actor: &Actor, kind: EntityKind) -> bool {
  actor.permissions.contains(&Permission::View(kind, Tier::Team))
}

pub fn tier_for(actor: &Actor, kind: EntityKind) -> Tier {
  LADDER
    .iter()
    .find(|(_, grant)| grant(actor, kind))
    .map(|(tier, _)| *tier)
    .unwrap_or(Tier::SelfOnly)
}

pub struct Visibility<'a> {
  db: &'a DatabaseConnection,
  team_lead_level: i32,
  max_depth: usize,
}

impl<'a> Visibility<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db, team_lead_level: 2, max_depth: 64 }
  }

  pub fn with_limits(mut self, team_lead_level: i32, max_depth: usize) -> Self {
    self.team_lead_level = team_lead_level;
    self.max_depth = max_depth;
    self
  }

  pub async fn resolve(
    &self,
    actor: &Actor,
    kind: EntityKind,
  ) -> Result<VisibilityScope> {
    let tier = tier_for(actor, kind);
    debug!("Person {} sees {:?} at tier {:?}", actor.person_id, kind, tier);

    Ok(match tier {
      Tier::All => VisibilityScope::All,
      Tier::Region => {
        VisibilityScope::Offices { office_ids: self.region_offices(actor).await? }
      }
      Tier::Office => {
        VisibilityScope::Offices { office_ids: self.led_offices(actor).await? }
      }
      Tier::Team => {
        VisibilityScope::Team { person_ids: self.team(actor).await? }
      }
      Tier::SelfOnly => VisibilityScope::SelfOnly { person_id: actor.person_id },
    })
  }

  /// The actor's home office plus any office they lead.
  async fn led_offices(&self, actor: &Actor) -> Result<BTreeSet<i32>> {
    let mut offices: BTreeSet<i32> = office::Entity::find()
      .filter(office::Column::LeaderId.eq(actor.person_id))
      .all(self.db)
      .await?
      .into_iter()
      .map(|office| office.id)
      .collect();

    offices.extend(actor.office_id);
    Ok(offices)
  }

  /// Offices in the actor's own region plus any region they manage.
  async fn region_offices(&self, actor: &Actor) -> Result<BTreeSet<i32>> {
    let mut regions: BTreeSet<i32> = region::Entity::find()
      .filter(region::Column::ManagerId.eq(actor.person_id))
      .all(self.db)
      .await?
      .into_iter()
      .map(|region| region.id)
      .collect();

    if let Some(office_id) = actor.office_id
      && let Some(office) =
        office::Entity::find_by_id(office_id).one(self.db).await?
    {
      regions.extend(office.region_id);
    }

    if regions.is_empty() {
      return Ok(BTreeSet::new());
    }

    Ok(
      office::Entity::find()
        .filter(office::Column::RegionId.is_in(regions))
        .all(self.db)
        .await?
        .into_iter()
        .map(|office| office.id)
        .collect(),
    )
  }

  /// The actor, their reports (the whole downline from team-lead level up)
  /// and members of teams they lead.
  async fn team(&self, actor: &Actor) -> Result<BTreeSet<i32>> {
    let graph = Graph::new(self.db);
    let mut members = BTreeSet::from([actor.person_id]);

    if actor.role_level >= self.team_lead_level {
      let downline = graph.downline(actor.person_id, self.max_depth).await?;
      members.extend(downline.person_ids);
    } else {
      members.extend(graph.children(actor.person_id).await?);
    }

    let led: Vec<i32> = team::Entity::find()
      .filter(team::Column::LeaderId.eq(actor.person_id))
      .all(self.db)
      .await?
      .into_iter()
      .map(|team| team.id)
      .collect();

    if !led.is_empty() {
      let teammates = person::Entity::find()
        .filter(person::Column::TeamId.is_in(led))
        .all(self.db)
        .await?;
      members.extend(teammates.into_iter().map(|person| person.id));
    }

    Ok(members)
  }

  /// Point check for a single record, using the same restriction as lists.
  /// An unrestricted actor passes for any id, so a missing record surfaces
  /// as not-found only to them.
  pub async fn can_view(
    &self,
    actor: &Actor,
    kind: EntityKind,
    id: i32,
  ) -> Result<bool> {
    match self.resolve(actor, kind).await? {
      VisibilityScope::All => Ok(true),
      scope => scope::contains(self.db, &scope, kind, id).await,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::{PersonSeed, test_db};

  fn actor(person_id: i32, permissions: &[&str]) -> Actor {
    Actor {
      person_id,
      office_id: None,
      role_name: "test".into(),
      role_level: 1,
      permissions: permissions.iter().map(|raw| raw.parse().unwrap()).collect(),
    }
  }

  #[test]
  fn test_permission_round_trip_names() {
    for raw in ["admin", "deals.manage", "people.view.region", "recruits.view.self"]
    {
      let permission: Permission = raw.parse().unwrap();
      assert_eq!(permission.to_string(), raw);
    }
    assert!("deals.view.galaxy".parse::<Permission>().is_err());
    assert!("boats.view.all".parse::<Permission>().is_err());
    assert!("deals.edit.all".parse::<Permission>().is_err());
  }

  #[test]
  fn test_highest_tier_wins() {
    let both = actor(1, &["deals.view.team", "deals.view.office"]);
    assert_eq!(tier_for(&both, EntityKind::Deal), Tier::Office);

    let region = actor(1, &["deals.view.office", "deals.view.region"]);
    assert_eq!(tier_for(&region, EntityKind::Deal), Tier::Region);

    let admin = actor(1, &["admin"]);
    assert_eq!(tier_for(&admin, EntityKind::Document), Tier::All);
  }

  #[test]
  fn test_tiers_are_per_entity() {
    let actor = actor(1, &["deals.view.office", "people.view.team"]);
    assert_eq!(tier_for(&actor, EntityKind::Deal), Tier::Office);
    assert_eq!(tier_for(&actor, EntityKind::Person), Tier::Team);
    assert_eq!(tier_for(&actor, EntityKind::Commission), Tier::SelfOnly);
  }

  #[tokio::test]
  async fn test_actor_load_parses_role_permissions() {
    let db = test_db::setup().await;
    let role =
      test_db::role(&db, "Manager", 3, &["deals.view.office", "bogus"]).await;
    let person = PersonSeed::new("M").role(role.id).insert(&db).await;

    let actor = Actor::load(&db, person.id).await.unwrap();
    assert_eq!(actor.role_level, 3);
    assert_eq!(
      actor.permissions,
      HashSet::from([Permission::View(EntityKind::Deal, Tier::Office)])
    );

    assert!(matches!(Actor::load(&db, 9999).await, Err(Error::PersonNotFound)));
  }

  #[tokio::test]
  async fn test_region_scope_collects_region_offices() {
    let db = test_db::setup().await;
    let west = test_db::region(&db, "West", None).await;
    let east = test_db::region(&db, "East", None).await;
    let a = test_db::office(&db, "A", Some(west.id)).await;
    let b = test_db::office(&db, "B", Some(west.id)).await;
    let _c = test_db::office(&db, "C", Some(east.id)).await;

    let mut manager = actor(1, &["deals.view.region"]);
    manager.office_id = Some(a.id);

    let scope = Visibility::new(&db).resolve(&manager, EntityKind::Deal).await.unwrap();
    assert_eq!(
      scope,
      VisibilityScope::Offices { office_ids: BTreeSet::from([a.id, b.id]) }
    );
  }

  #[tokio::test]
  async fn test_office_scope_includes_led_offices() {
    let db = test_db::setup().await;
    let home = test_db::office(&db, "Home", None).await;
    let led = test_db::office(&db, "Led", None).await;
    let _other = test_db::office(&db, "Other", None).await;
    let person = PersonSeed::new("Lead").office(home.id).insert(&db).await;

    office::ActiveModel { leader_id: Set(Some(person.id)), ..led.clone().into() }
      .update(&db)
      .await
      .unwrap();

    let mut leader = actor(person.id, &["deals.view.office"]);
    leader.office_id = Some(home.id);

    let scope = Visibility::new(&db).resolve(&leader, EntityKind::Deal).await.unwrap();
    assert_eq!(
      scope,
      VisibilityScope::Offices { office_ids: BTreeSet::from([home.id, led.id]) }
    );

    let homeless = actor(9999, &["deals.view.office"]);
    let scope =
      Visibility::new(&db).resolve(&homeless, EntityKind::Deal).await.unwrap();
    assert_eq!(scope, VisibilityScope::Offices { office_ids: BTreeSet::new() });
  }

  #[tokio::test]
  async fn test_can_view_hides_missing_ids_from_restricted_actors() {
    let db = test_db::setup().await;
    let rep = PersonSeed::new("Rep").insert(&db).await;
    let visibility = Visibility::new(&db);

    let restricted = actor(rep.id, &[]);
    assert!(visibility.can_view(&restricted, EntityKind::Person, rep.id).await.unwrap());
    assert!(!visibility.can_view(&restricted, EntityKind::Person, 9999).await.unwrap());

    let admin = actor(rep.id, &["admin"]);
    assert!(visibility.can_view(&admin, EntityKind::Person, 9999).await.unwrap());
  }

  #[tokio::test]
  async fn test_region_without_offices_is_empty() {
    let db = test_db::setup().await;
    let person = PersonSeed::new("Rm").insert(&db).await;
    test_db::region(&db, "Empty", Some(person.id)).await;

    let manager = actor(person.id, &["deals.view.region"]);
    let scope = Visibility::new(&db).resolve(&manager, EntityKind::Deal).await.unwrap();

    assert_eq!(scope, VisibilityScope::Offices { office_ids: BTreeSet::new() });
  }

  #[tokio::test]
  async fn test_team_scope_depth_depends_on_level() {
    let db = test_db::setup().await;
    let lead = PersonSeed::new("Lead").insert(&db).await;
    let report = PersonSeed::new("Report").reports_to(lead.id).insert(&db).await;
    let deep = PersonSeed::new("Deep").reports_to(report.id).insert(&db).await;
    let team = test_db::team(&db, "Hawks", Some(lead.id)).await;
    let teammate = PersonSeed::new("Mate").team(team.id).insert(&db).await;

    let mut rep = actor(lead.id, &["people.view.team"]);
    let visibility = Visibility::new(&db).with_limits(2, 64);

    let scope = visibility.resolve(&rep, EntityKind::Person).await.unwrap();
    assert_eq!(
      scope,
      VisibilityScope::Team {
        person_ids: BTreeSet::from([lead.id, report.id, teammate.id])
      }
    );

    rep.role_level = 2;
    let scope = visibility.resolve(&rep, EntityKind::Person).await.unwrap();
    assert_eq!(
      scope,
      VisibilityScope::Team {
        person_ids: BTreeSet::from([lead.id, report.id, deep.id, teammate.id])
      }
    );
  }

  #[tokio::test]
  async fn test_self_and_all_scopes() {
    let db = test_db::setup().await;
    let visibility = Visibility::new(&db);

    let rep = actor(5, &[]);
    assert_eq!(
      visibility.resolve(&rep, EntityKind::Commission).await.unwrap(),
      VisibilityScope::SelfOnly { person_id: 5 }
    );

    let admin = actor(5, &["admin"]);
    let scope = visibility.resolve(&admin, EntityKind::Commission).await.unwrap();
    assert_eq!(scope, VisibilityScope::All);
    assert!(scope.restriction().is_none());
  }
}
