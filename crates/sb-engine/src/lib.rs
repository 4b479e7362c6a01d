//! ServiceBay estimation and scheduling engine.
//!
//! The pipeline: free-text symptoms run through the [`matcher`], the
//! [`session`] state machine narrows them to a top-N shortlist through
//! clarification turns, the [`aggregator`] fans the [`estimator`] out
//! across dealerships (each invoking the deterministic [`rules`] engine),
//! and the [`booking`] coordinator commits the customer to one dealership.

pub mod aggregator;
pub mod booking;
pub mod clarify;
pub mod error;
pub mod estimator;
pub mod matcher;
pub mod rules;
pub mod session;

pub use aggregator::{AggregatorConfig, EstimateAggregator};
pub use booking::{BookingLedger, BookingUpdate, NewBooking};
pub use clarify::{HttpQuestionGenerator, QuestionGenerator, TemplateQuestionGenerator};
pub use error::{EngineError, EngineResult};
pub use estimator::{CatalogEstimator, PairEstimator, estimate_pair};
pub use matcher::{LexicalMatcher, ProblemMatcher};
pub use session::{SessionConfig, SessionEngine, SessionReply};
