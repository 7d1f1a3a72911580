//! Graph-building helpers shared by the unit tests in this crate.

use social_graph::{
    Block, CategoryId, Follow, Interest, Like, SocialGraph, Timestamp, Tweet, TweetId, User,
    UserId,
};

pub fn user(id: UserId) -> User {
    User {
        id,
        name: format!("User {}", id),
        username: format!("user{}", id),
        avatar_url: None,
        verified: false,
        deleted: false,
    }
}

pub fn graph_with_users(ids: impl IntoIterator<Item = UserId>) -> SocialGraph {
    let mut graph = SocialGraph::new();
    for id in ids {
        graph.insert_user(user(id));
    }
    graph
}

pub fn follow(graph: &mut SocialGraph, follower_id: UserId, followee_id: UserId) {
    follow_at(graph, follower_id, followee_id, 0);
}

pub fn follow_at(graph: &mut SocialGraph, follower_id: UserId, followee_id: UserId, at: Timestamp) {
    graph.insert_follow(Follow {
        follower_id,
        followee_id,
        created_at: at,
    });
}

pub fn block(graph: &mut SocialGraph, blocker_id: UserId, blocked_id: UserId) {
    graph.insert_block(Block {
        blocker_id,
        blocked_id,
    });
}

pub fn interest(graph: &mut SocialGraph, user_id: UserId, category_id: CategoryId, score: f32) {
    graph.insert_interest(Interest {
        user_id,
        category_id,
        score,
    });
}

pub fn tweet(graph: &mut SocialGraph, id: TweetId, author_id: UserId, in_reply_to: Option<TweetId>, at: Timestamp) {
    graph.insert_tweet(Tweet {
        id,
        author_id,
        in_reply_to,
        created_at: at,
    });
}

pub fn like(graph: &mut SocialGraph, user_id: UserId, tweet_id: TweetId, at: Timestamp) {
    graph.insert_like(Like {
        user_id,
        tweet_id,
        created_at: at,
    });
}
