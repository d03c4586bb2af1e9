//! Hand-written protobuf record for the decision log.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//! The scenario and decision ride along as JSON payloads so a log frame
//! is self-contained: replay needs nothing but the log.

use prost::Message;

#[derive(Clone, PartialEq, Message)]
pub struct ProtoDecisionRecord {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(string, tag = "2")]
    pub decision_id: String,
    #[prost(string, tag = "3")]
    pub player_id: String,
    /// Serialized `ethiquest_engine::domain::Scenario`.
    #[prost(string, tag = "4")]
    pub scenario_json: String,
    /// Serialized `ethiquest_engine::domain::Decision`.
    #[prost(string, tag = "5")]
    pub decision_json: String,
}
