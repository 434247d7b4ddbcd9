//! API-wide constants.

/// Prefix for all API routes.
pub const API_PREFIX: &str = "/api/v1";

/// The tus protocol version this server speaks.
pub const TUS_VERSION: &str = "1.0.0";

/// tus extensions advertised by the OPTIONS capability descriptor.
pub const TUS_EXTENSIONS: &str = "creation,termination";

/// Platform-wide cap on photos attached to one report.
pub const MAX_PHOTOS_PER_REPORT: usize = 3;
