/// How the tracing subscriber is set up at startup.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        let environment =
            std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string());
        let json_format = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        Self {
            environment,
            json_format,
        }
    }
}
