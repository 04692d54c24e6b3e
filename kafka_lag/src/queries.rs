pub mod get_topic_lag;
