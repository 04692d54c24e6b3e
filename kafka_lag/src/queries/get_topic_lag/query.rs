#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetTopicLagQueryInternal {
    pub topic_name: String,
    pub group_id: String,
}
