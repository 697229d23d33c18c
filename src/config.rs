//! Runtime configuration, gathered once from the environment and passed to
//! construction; no component reads env vars at request time.

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    /// Signing secret for session tokens. Optional at startup; any token
    /// operation without it answers 500.
    pub auth_secret: Option<String>,
    /// Allowed CORS origin. Unset means permissive (development).
    pub cors_origin: Option<String>,
    pub s3_bucket: String,
    pub s3_endpoint: Option<String>,
    pub s3_region: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL is required".to_string())?;
        let s3_bucket =
            std::env::var("S3_BUCKET").map_err(|_| "S3_BUCKET is required".to_string())?;
        let port = match std::env::var("PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|_| format!("PORT is not a valid port: {v}"))?,
            Err(_) => 3000,
        };
        Ok(AppConfig {
            database_url,
            auth_secret: env_opt("AUTH_SECRET"),
            cors_origin: env_opt("CORS_ORIGIN"),
            s3_bucket,
            s3_endpoint: env_opt("S3_ENDPOINT"),
            s3_region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_address_joins_host_and_port() {
        let cfg = AppConfig {
            database_url: "postgres://localhost/civicms".into(),
            auth_secret: Some("s".into()),
            cors_origin: None,
            s3_bucket: "media".into(),
            s3_endpoint: None,
            s3_region: "us-east-1".into(),
            host: "127.0.0.1".into(),
            port: 8080,
        };
        assert_eq!(cfg.bind_address(), "127.0.0.1:8080");
    }
}
