//! HTTP API module for the settlement engine.
//!
//! A thin JSON adapter: each route calls one engine operation and maps its
//! error onto a status code.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CorrectionRequest, EmployeeMonthRequest, ProcessAttendanceRequest, ProcessPayrollRequest,
    RankRequest, UploadRequest,
};
pub use response::{ApiError, ApiErrorResponse, ScoreResponse};
pub use state::AppState;
