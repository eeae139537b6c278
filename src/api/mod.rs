//! Tool-facing API
//!
//! The surface an agent drives: a JSON request envelope dispatched to
//! browsing operations (catalog, schema, definitions) and content
//! operations (validate, fix, create, analyze, edit, search). Every
//! content mutation is gated behind validation before the host is
//! contacted.

mod errors;
mod handler;
mod request;
mod response;

pub use errors::{ApiError, ApiResult};
pub use handler::ToolHandler;
pub use request::{
    CreateRequest, EditOperation, EditRequest, Request, SchemaRequest, SearchRequest,
};
pub use response::{ErrorResponse, Response, SuccessResponse};
