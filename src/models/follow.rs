/// Result of a follow request. An edge is the unique (follower, author) pair
/// stored by the repository; handlers redirect the same way for all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    SelfFollowIgnored,
}
