use std::collections::BTreeSet;

use crate::db::store::DumpStore;
use crate::{AppError, AppResult};

/// The party a dump is produced for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Option<String>,
    pub administrator: bool,
}

impl Actor {
    pub fn user(id: impl Into<String>) -> Self {
        Actor {
            user_id: Some(id.into()),
            administrator: false,
        }
    }

    pub fn admin() -> Self {
        Actor {
            user_id: None,
            administrator: true,
        }
    }

    pub fn anonymous() -> Self {
        Actor {
            user_id: None,
            administrator: false,
        }
    }
}

/// User ids whose rows may appear in a dump, sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    user_ids: Vec<String>,
}

impl Scope {
    pub fn user_ids(&self) -> &[String] {
        &self.user_ids
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.user_ids.len()
    }
}

pub async fn resolve_scope<S: DumpStore>(store: &S, actor: &Actor) -> AppResult<Scope> {
    if !actor.administrator {
        let user_id = actor
            .user_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                AppError::new(
                    AppError::UNAUTHORIZED_CODE,
                    "A user dump requires an authenticated user",
                )
                .with_context("actor", "anonymous")
            })?;
        return Ok(Scope {
            user_ids: vec![user_id.to_string()],
        });
    }

    let ids: BTreeSet<String> = store
        .user_ids()
        .await
        .map_err(|err| err.with_context("operation", "resolve_scope"))?
        .into_iter()
        .collect();
    Ok(Scope {
        user_ids: ids.into_iter().collect(),
    })
}
