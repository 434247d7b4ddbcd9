use participium_core::AppError;
use sqlx::PgPool;

/// Repository for Telegram account links.
#[derive(Clone)]
pub struct TelegramRepository {
    pool: PgPool,
}

impl TelegramRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record (or refresh) the link between a Telegram chat and an account
    /// token. Re-linking the same chat replaces the stored token.
    pub async fn link_account(&self, chat_id: &str, token: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO telegram_accounts (chat_id, link_token, linked_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (chat_id)
            DO UPDATE SET link_token = EXCLUDED.link_token, linked_at = NOW()
            "#,
        )
        .bind(chat_id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        tracing::info!(chat_id = %chat_id, "Telegram account linked");

        Ok(())
    }
}
