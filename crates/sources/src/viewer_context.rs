//! Helper functions to build a ViewerContext from the SocialGraph
//!
//! Every candidate query starts from the same exclusion sets: the requester,
//! the accounts they follow, and the accounts on either side of a block.

use crate::types::ViewerContext;
use social_graph::{GraphError, Result, SocialGraph, UserId};

/// Build a ViewerContext for `user_id`
///
/// Fails with [`GraphError::UserNotFound`] when the requester is not in the graph.
pub fn build_viewer_context(graph: &SocialGraph, user_id: UserId) -> Result<ViewerContext> {
    if graph.get_user(user_id).is_none() {
        return Err(GraphError::UserNotFound(user_id));
    }

    let mut context = ViewerContext::new(user_id);
    context.following = graph
        .following_of(user_id)
        .iter()
        .map(|edge| edge.followee_id)
        .collect();
    context.blocked = graph.block_relations(user_id);

    Ok(context)
}

/// Can `candidate` be recommended to the viewer at all?
///
/// Applies the viewer's exclusions and drops soft-deleted accounts.
pub fn is_eligible(graph: &SocialGraph, context: &ViewerContext, candidate: UserId) -> bool {
    !context.excludes(candidate) && graph.is_active(candidate)
}
