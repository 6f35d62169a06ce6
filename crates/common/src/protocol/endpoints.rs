// REST endpoint paths of the assist service, kept in step with contracts/assist-api.json.

// ── Assist ─────────────────────────────────────────────────────────
pub const ASSIST: &str = "/api/assist";
pub const PING: &str = "/api/ping";

// ── History ────────────────────────────────────────────────────────
pub const HISTORY: &str = "/api/history";

/// Query parameter scoping history reads and clears to one identity.
pub const CLIENT_ID_PARAM: &str = "clientId";
pub const LIMIT_PARAM: &str = "limit";

/// Every `(method, path)` pair the panel calls.
pub const CONSUMED_ENDPOINTS: &[(&str, &str)] = &[
    ("POST", ASSIST),
    ("GET", PING),
    ("GET", HISTORY),
    ("DELETE", HISTORY),
];
