//! Redis-backed report job status store

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::report::JobStatus,
    services::jobs::JobStatusStore,
};

#[derive(Clone)]
pub struct RedisJobStore {
    client: Client,
    ttl_secs: u64,
}

impl RedisJobStore {
    /// Create a new Redis job store
    pub async fn new(url: &str, ttl_secs: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client, ttl_secs })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}

fn status_key(task_id: Uuid) -> String {
    format!("report_job:{}", task_id)
}

#[async_trait]
impl JobStatusStore for RedisJobStore {
    async fn put(&self, status: &JobStatus) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let body = serde_json::to_string(status)
            .map_err(|e| AppError::Internal(format!("Failed to serialize job status: {}", e)))?;

        conn.set_ex::<_, _, ()>(status_key(status.task_id), body, self.ttl_secs)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store job status in Redis: {}", e)))?;
        Ok(())
    }

    async fn get(&self, task_id: Uuid) -> AppResult<Option<JobStatus>> {
        let mut conn = self.connection().await?;
        let body: Option<String> = conn
            .get(status_key(task_id))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get job status from Redis: {}", e)))?;

        body.map(|b| {
            serde_json::from_str(&b)
                .map_err(|e| AppError::Internal(format!("Invalid job status in Redis: {}", e)))
        })
        .transpose()
    }
}
