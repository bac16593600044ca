//! HTTP REST API endpoints.
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/room-mappings/{hotel_id}` | GET | Rooms of one hotel |
//! | `/room-mappings/batch` | POST | Rooms of many hotels in one round-trip |
//! | `/health` | GET | Store health probe |
//! | `/metrics` | GET | Prometheus metrics (observability router only) |

pub mod routes;
pub mod state;

pub use routes::{
    create_router, create_router_with_body_limit, create_router_with_observability, ApiError,
    BatchLookupBody, DEFAULT_BODY_LIMIT,
};
pub use state::{AppState, DEFAULT_HEALTH_TIMEOUT};
