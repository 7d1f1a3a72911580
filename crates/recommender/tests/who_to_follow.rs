//! End-to-end tests for the recommendation engine over an in-memory graph.

use async_trait::async_trait;
use pipeline::RecommendationConfig;
use recommender::{EngineError, Origin, RecommendationEngine};
use social_graph::{
    Block, Follow, Interest, Like, SocialGraph, Tweet, User, UserId, UserProfile,
};
use sources::{Candidate, GraphStore, SocialStore, Source, StoreError, ViewerContext};
use std::collections::HashSet;
use std::sync::Arc;

// ============================================================================
// Test Fixtures
// ============================================================================

fn insert_user(graph: &mut SocialGraph, id: UserId, verified: bool, deleted: bool) {
    graph.insert_user(User {
        id,
        name: format!("User {}", id),
        username: format!("user{}", id),
        avatar_url: None,
        verified,
        deleted,
    });
}

fn insert_follows(graph: &mut SocialGraph, edges: &[(UserId, UserId)]) {
    for (at, &(follower_id, followee_id)) in edges.iter().enumerate() {
        graph.insert_follow(Follow {
            follower_id,
            followee_id,
            created_at: at as i64,
        });
    }
}

/// Requester 1 follows 2 and 3 and has blocked 6.
///
/// Personalized candidates for 1:
/// - friends of friends: 4 (2 mutuals), 5 and 7 (1 mutual each)
/// - interests: 8 (both categories)
/// - likes: 9
/// - replies: 10
/// - followers not followed: 7
///
/// 11 is verified, 12 is popular, 13 is deleted.
fn create_test_graph() -> SocialGraph {
    let mut graph = SocialGraph::new();
    for id in 1..=12 {
        insert_user(&mut graph, id, id == 11, false);
    }
    insert_user(&mut graph, 13, false, true);

    insert_follows(
        &mut graph,
        &[
            (1, 2),
            (1, 3),
            (2, 4),
            (2, 5),
            (2, 6),
            (2, 7),
            (2, 13),
            (3, 4),
            (7, 1),
            (4, 12),
            (5, 12),
            (4, 13),
            (5, 13),
        ],
    );
    graph.insert_block(Block {
        blocker_id: 1,
        blocked_id: 6,
    });

    for (user_id, category_id, score) in [
        (1, 10, 80.0),
        (1, 11, 60.0),
        (8, 10, 90.0),
        (8, 11, 70.0),
        (6, 10, 100.0),
    ] {
        graph.insert_interest(Interest {
            user_id,
            category_id,
            score,
        });
    }

    graph.insert_tweet(Tweet {
        id: 100,
        author_id: 9,
        in_reply_to: None,
        created_at: 10,
    });
    graph.insert_tweet(Tweet {
        id: 101,
        author_id: 10,
        in_reply_to: None,
        created_at: 20,
    });
    graph.insert_tweet(Tweet {
        id: 200,
        author_id: 1,
        in_reply_to: Some(101),
        created_at: 30,
    });
    graph.insert_like(Like {
        user_id: 1,
        tweet_id: 100,
        created_at: 40,
    });

    graph
}

fn create_test_engine() -> RecommendationEngine {
    engine_over(GraphStore::new(Arc::new(create_test_graph())))
}

fn engine_over(store: impl SocialStore + 'static) -> RecommendationEngine {
    RecommendationEngine::new(Arc::new(store), RecommendationConfig::default())
}

/// Delegates to a [`GraphStore`] but fails the chosen candidate queries
struct FailingStore {
    inner: GraphStore,
    failing: HashSet<Source>,
    error: StoreError,
}

impl FailingStore {
    fn new(failing: impl IntoIterator<Item = Source>, error: StoreError) -> Self {
        Self {
            inner: GraphStore::new(Arc::new(create_test_graph())),
            failing: failing.into_iter().collect(),
            error,
        }
    }
}

#[async_trait]
impl SocialStore for FailingStore {
    async fn fetch_candidates(
        &self,
        source: Source,
        requester: UserId,
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError> {
        if self.failing.contains(&source) {
            return Err(self.error.clone());
        }
        self.inner.fetch_candidates(source, requester, limit).await
    }

    async fn popular_users(&self, limit: usize) -> Result<Vec<UserId>, StoreError> {
        self.inner.popular_users(limit).await
    }

    async fn viewer_context(&self, requester: UserId) -> Result<ViewerContext, StoreError> {
        self.inner.viewer_context(requester).await
    }

    async fn profiles(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, StoreError> {
        self.inner.profiles(ids).await
    }

    async fn is_following(&self, follower: UserId, followee: UserId) -> Result<bool, StoreError> {
        self.inner.is_following(follower, followee).await
    }

    async fn is_followed(&self, user: UserId, by: UserId) -> Result<bool, StoreError> {
        self.inner.is_followed(user, by).await
    }
}

/// Panics inside the friends-of-friends query
struct PanickingStore(GraphStore);

#[async_trait]
impl SocialStore for PanickingStore {
    async fn fetch_candidates(
        &self,
        source: Source,
        requester: UserId,
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError> {
        if source == Source::FriendsOfFriends {
            panic!("friends-of-friends query blew up");
        }
        self.0.fetch_candidates(source, requester, limit).await
    }

    async fn popular_users(&self, limit: usize) -> Result<Vec<UserId>, StoreError> {
        self.0.popular_users(limit).await
    }

    async fn viewer_context(&self, requester: UserId) -> Result<ViewerContext, StoreError> {
        self.0.viewer_context(requester).await
    }

    async fn profiles(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, StoreError> {
        self.0.profiles(ids).await
    }

    async fn is_following(&self, follower: UserId, followee: UserId) -> Result<bool, StoreError> {
        self.0.is_following(follower, followee).await
    }

    async fn is_followed(&self, user: UserId, by: UserId) -> Result<bool, StoreError> {
        self.0.is_followed(user, by).await
    }
}

/// Every query fails as if the connection were down
struct UnreachableStore;

fn connection_refused() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl SocialStore for UnreachableStore {
    async fn fetch_candidates(
        &self,
        _source: Source,
        _requester: UserId,
        _limit: usize,
    ) -> Result<Vec<Candidate>, StoreError> {
        Err(connection_refused())
    }

    async fn popular_users(&self, _limit: usize) -> Result<Vec<UserId>, StoreError> {
        Err(connection_refused())
    }

    async fn viewer_context(&self, _requester: UserId) -> Result<ViewerContext, StoreError> {
        Err(connection_refused())
    }

    async fn profiles(&self, _ids: &[UserId]) -> Result<Vec<UserProfile>, StoreError> {
        Err(connection_refused())
    }

    async fn is_following(&self, _follower: UserId, _followee: UserId) -> Result<bool, StoreError> {
        Err(connection_refused())
    }

    async fn is_followed(&self, _user: UserId, _by: UserId) -> Result<bool, StoreError> {
        Err(connection_refused())
    }
}

// ============================================================================
// Personalized requests
// ============================================================================

#[tokio::test]
async fn test_personalized_then_popular() {
    let engine = create_test_engine();
    let set = engine.recommend(Some(1), 10).await.unwrap();

    assert_eq!(set.user_ids(), vec![8, 4, 5, 7, 9, 10, 11, 12]);
    assert_eq!(set.backfilled(), 2);
    assert_eq!(set.entries[0].origin, Origin::Personalized(Source::Interests));
    assert_eq!(set.entries[0].score, Some(92.0));
    assert_eq!(set.entries[6].origin, Origin::Popular);
    assert_eq!(set.entries[6].score, None);
}

#[tokio::test]
async fn test_never_recommends_self_followed_blocked_or_deleted() {
    let engine = create_test_engine();

    for limit in [1, 3, 5, 10, 50] {
        let ids = engine.recommend(Some(1), limit).await.unwrap().user_ids();
        for excluded in [1, 2, 3, 6, 13] {
            assert!(
                !ids.contains(&excluded),
                "limit {} recommended {}",
                limit,
                excluded
            );
        }
    }
}

#[tokio::test]
async fn test_unique_and_bounded_by_limit() {
    let engine = create_test_engine();

    for limit in 1..=15 {
        let ids = engine.recommend(Some(1), limit).await.unwrap().user_ids();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.len() <= limit);
    }
}

#[tokio::test]
async fn test_limit_one_returns_top_candidate() {
    let engine = create_test_engine();
    let set = engine.recommend(Some(1), 1).await.unwrap();

    assert_eq!(set.user_ids(), vec![8]);
}

#[tokio::test]
async fn test_limit_zero_is_empty() {
    let engine = create_test_engine();
    assert!(engine.recommend(Some(1), 0).await.unwrap().is_empty());
    assert!(engine.get_who_to_follow(None, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_quota_caps_source_before_backfill() {
    let engine = create_test_engine();
    let set = engine.recommend(Some(1), 2).await.unwrap();

    let stats = set.stats.as_ref().unwrap();
    let fof = stats.for_source(Source::FriendsOfFriends).unwrap();
    assert_eq!(fof.quota, 1);
    assert_eq!(fof.available, 3);
    assert_eq!(fof.selected, 1);

    assert_eq!(set.entries.len(), 2);
    assert_eq!(set.user_ids(), vec![8, 7]);
    assert_eq!(
        set.entries[1].origin,
        Origin::Personalized(Source::FollowersNotFollowed)
    );
}

#[tokio::test]
async fn test_duplicate_attributed_to_first_source() {
    let engine = create_test_engine();
    let set = engine.recommend(Some(1), 10).await.unwrap();

    // 7 is both a friend of friends and a follower not followed back
    let seven = set.entries.iter().find(|e| e.user_id == 7).unwrap();
    assert_eq!(seven.origin, Origin::Personalized(Source::FriendsOfFriends));
    assert_eq!(seven.score, Some(10.0));

    let stats = set.stats.as_ref().unwrap();
    assert_eq!(
        stats
            .for_source(Source::FollowersNotFollowed)
            .unwrap()
            .duplicates,
        1
    );
}

#[tokio::test]
async fn test_backfill_can_fall_short_of_limit() {
    // 2 personalized candidates, and popularity has only 2 more to give
    let mut graph = SocialGraph::new();
    for id in 1..=6 {
        insert_user(&mut graph, id, id == 6, false);
    }
    insert_follows(&mut graph, &[(1, 2), (2, 3), (4, 1)]);
    let engine = engine_over(GraphStore::new(Arc::new(graph)));

    let set = engine.recommend(Some(1), 5).await.unwrap();

    assert_eq!(set.user_ids(), vec![4, 3, 6, 5]);
    assert_eq!(set.backfilled(), 2);
}

#[tokio::test]
async fn test_unknown_requester_is_an_error() {
    let engine = create_test_engine();
    let err = engine.recommend(Some(99), 5).await.unwrap_err();

    assert!(matches!(
        err,
        EngineError::Store(StoreError::UnknownUser(99))
    ));
}

// ============================================================================
// Anonymous requests
// ============================================================================

#[tokio::test]
async fn test_anonymous_gets_popular_users() {
    let engine = create_test_engine();
    let set = engine.recommend(None, 3).await.unwrap();

    // Verified first, then by follower count
    assert_eq!(set.user_ids(), vec![11, 4, 12]);
    assert!(set.entries.iter().all(|e| e.origin == Origin::Popular));
    assert!(set.stats.is_none());
}

#[tokio::test]
async fn test_anonymous_rows_have_no_relationship_flags() {
    let engine = create_test_engine();
    let items = engine.get_who_to_follow(None, 20).await.unwrap();

    assert_eq!(items.len(), 12);
    assert!(items.iter().all(|i| !i.is_following && !i.is_followed));
    assert!(items.iter().all(|i| i.id != 13));
}

// ============================================================================
// Hydration
// ============================================================================

#[tokio::test]
async fn test_who_to_follow_rows_follow_rank_order() {
    let engine = create_test_engine();
    let items = engine.get_who_to_follow(Some(1), 10).await.unwrap();

    let ids: Vec<UserId> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![8, 4, 5, 7, 9, 10, 11, 12]);

    let seven = items.iter().find(|i| i.id == 7).unwrap();
    assert!(seven.is_followed);
    assert!(!seven.is_following);
    assert!(items.iter().all(|i| !i.is_following));

    let four = items.iter().find(|i| i.id == 4).unwrap();
    assert_eq!(four.follower_count, 2);
    assert_eq!(four.following_count, 2);
}

// ============================================================================
// Failure handling
// ============================================================================

#[tokio::test]
async fn test_failing_source_is_treated_as_empty() {
    let store = FailingStore::new(
        [Source::FriendsOfFriends],
        StoreError::QueryFailed {
            query: Source::FriendsOfFriends,
            reason: "timeout".to_string(),
        },
    );
    let engine = engine_over(store);

    let set = engine.recommend(Some(1), 4).await.unwrap();
    assert_eq!(set.user_ids(), vec![8, 7, 9, 10]);
    assert!(
        set.entries
            .iter()
            .all(|e| e.origin != Origin::Personalized(Source::FriendsOfFriends))
    );
}

#[tokio::test]
async fn test_panicking_source_is_treated_as_empty() {
    let engine = engine_over(PanickingStore(GraphStore::new(Arc::new(
        create_test_graph(),
    ))));

    let set = engine.recommend(Some(1), 4).await.unwrap();
    assert_eq!(set.user_ids(), vec![8, 7, 9, 10]);
}

#[tokio::test]
async fn test_all_sources_failing_falls_back_to_popular() {
    let store = FailingStore::new(
        Source::PRIORITY,
        StoreError::QueryFailed {
            query: Source::Likes,
            reason: "bad plan".to_string(),
        },
    );
    let engine = engine_over(store);

    let set = engine.recommend(Some(1), 3).await.unwrap();
    assert_eq!(set.user_ids(), vec![11, 4, 12]);
    assert_eq!(set.backfilled(), 3);
}

#[tokio::test]
async fn test_unavailable_store_is_fatal() {
    let store = FailingStore::new(
        Source::PRIORITY,
        StoreError::Unavailable("connection refused".to_string()),
    );
    let engine = engine_over(store);

    let err = engine.recommend(Some(1), 5).await.unwrap_err();
    assert!(matches!(err, EngineError::StoreUnavailable(_)));
}

#[tokio::test]
async fn test_unreachable_store_fails_the_same_way_on_every_path() {
    let engine = engine_over(UnreachableStore);

    let err = engine.recommend(Some(1), 5).await.unwrap_err();
    assert!(matches!(err, EngineError::StoreUnavailable(_)));

    let err = engine.recommend(None, 5).await.unwrap_err();
    assert!(matches!(err, EngineError::StoreUnavailable(_)));
}
