//! Turns ranked user ids into display rows.
//!
//! Profiles are fetched in one batch. Relationship flags need two existence
//! checks per row; with a viewer they all run concurrently.

use futures::future::try_join_all;
use serde::Serialize;
use social_graph::{UserId, UserProfile};
use sources::{SocialStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// One row of the "Who to Follow" list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserListItem {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub verified: bool,
    pub follower_count: u32,
    pub following_count: u32,
    /// The viewer follows this user
    pub is_following: bool,
    /// This user follows the viewer
    pub is_followed: bool,
}

impl From<UserProfile> for UserListItem {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            username: profile.username,
            avatar_url: profile.avatar_url,
            verified: profile.verified,
            follower_count: profile.follower_count,
            following_count: profile.following_count,
            is_following: false,
            is_followed: false,
        }
    }
}

#[derive(Clone)]
pub struct ProfileHydrator {
    store: Arc<dyn SocialStore>,
}

impl ProfileHydrator {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Hydrate `ids` in order. Ids without a profile (unknown or deleted)
    /// are dropped, so the result may be shorter than the input.
    pub async fn hydrate(
        &self,
        ids: &[UserId],
        viewer: Option<UserId>,
    ) -> Result<Vec<UserListItem>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut profiles: HashMap<UserId, UserProfile> = self
            .store
            .profiles(ids)
            .await?
            .into_iter()
            .map(|profile| (profile.id, profile))
            .collect();

        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            match profiles.remove(id) {
                Some(profile) => items.push(UserListItem::from(profile)),
                None => warn!(user_id = *id, "Dropping recommendation without a profile"),
            }
        }

        let Some(viewer) = viewer else {
            return Ok(items);
        };

        let flags = try_join_all(items.iter().map(|item| {
            let store = &self.store;
            let id = item.id;
            async move {
                tokio::try_join!(store.is_following(viewer, id), store.is_followed(viewer, id))
            }
        }))
        .await?;

        for (item, (is_following, is_followed)) in items.iter_mut().zip(flags) {
            item.is_following = is_following;
            item.is_followed = is_followed;
        }
        Ok(items)
    }
}
