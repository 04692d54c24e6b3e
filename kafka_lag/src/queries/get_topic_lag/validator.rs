use crate::error::LagError;
use crate::queries::get_topic_lag::GetTopicLagQueryInternal;

pub fn validate(
    group_id: Option<String>,
    topic_name: Option<String>,
) -> Result<GetTopicLagQueryInternal, LagError> {
    let group_id = group_id
        .filter(|x| !x.is_empty())
        .ok_or(LagError::MissingParameter("group_id"))?;
    let topic_name = topic_name
        .filter(|x| !x.is_empty())
        .ok_or(LagError::MissingParameter("topic_name"))?;

    Ok(GetTopicLagQueryInternal {
        topic_name,
        group_id,
    })
}
