use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    /// Base URL under which uploaded objects are publicly reachable
    /// (CDN or direct bucket URL).
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Public base URL of this deployment, used to derive session deep
    /// links in push payloads and user invite links.
    pub public_base_url: String,
    pub push_concurrency: usize,
    pub push_timeout_secs: u64,
    pub push_ttl_secs: u32,
    pub s3: Option<S3Config>,
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| crate::error::AppError::Config("DATABASE_URL missing".into()))?;
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let push_concurrency = env::var("PUSH_CONCURRENCY")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(8);
        let push_timeout_secs = env::var("PUSH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(10);
        let push_ttl_secs = env::var("PUSH_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86_400);

        let s3 = match env::var("S3_BUCKET") {
            Ok(bucket) if !bucket.trim().is_empty() => {
                let public_url = env::var("S3_PUBLIC_URL").unwrap_or_else(|_| {
                    format!("https://{}.s3.amazonaws.com", bucket.trim())
                });
                Some(S3Config {
                    bucket: bucket.trim().to_string(),
                    public_url,
                })
            }
            _ => None,
        };

        Ok(Self {
            database_url,
            port,
            public_base_url,
            push_concurrency,
            push_timeout_secs,
            push_ttl_secs,
            s3,
        })
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            database_url: "postgres://localhost/test".into(),
            port: 3000,
            public_base_url: "http://localhost:3000".into(),
            push_concurrency: 4,
            push_timeout_secs: 5,
            push_ttl_secs: 60,
            s3: None,
        }
    }
}
