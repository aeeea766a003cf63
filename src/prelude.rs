pub use std::{
  collections::{BTreeSet, HashMap, HashSet},
  sync::Arc,
  time::Duration,
};

pub use chrono::{NaiveDate as Date, Utc};
pub use dashmap::DashMap;
pub use rust_decimal::Decimal;
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, Database,
  DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
  QueryOrder, Set, TransactionTrait,
};
pub use tracing::{debug, error, info, trace, warn};

pub use crate::error::{Error, Result};
