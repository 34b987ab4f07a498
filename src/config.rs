use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub mongodb_url: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let mongodb_url = env::var("MONGODB_URL")?;
        let mongodb_db = env::var("MONGODB_DB").unwrap_or_else(|_| "storefront".to_string());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        Ok(Self {
            database_url,
            mongodb_url,
            mongodb_db,
            host,
            port,
        })
    }
}
