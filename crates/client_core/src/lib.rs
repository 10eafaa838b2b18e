pub mod config;
pub mod error;
pub mod flow;
pub mod form;
pub mod gateway;
pub mod normalizer;
pub mod sequencer;
pub mod session;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult, ValidationError};
pub use flow::{FlowKind, FlowResult, FlowState};
pub use form::{FieldPath, FieldPathError, FieldUpdate, OperationForm};
pub use gateway::{BackendGateway, HttpGateway, UploadFile};
pub use normalizer::normalize;
pub use sequencer::{FlowOutcome, RequestSequencer, SessionEvent};
pub use session::{SessionState, SessionStateStore};
