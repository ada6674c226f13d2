use sqlx::{PgConnection, Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::club::ClubContext;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação e define as variáveis RLS (`app.club_id`, `app.user_id`).
/// `set_config(..., true)` só vale dentro da transação, por isso devolvemos ela
/// e o handler faz o commit no final.
pub(crate) async fn begin_club_transaction(
    app_state: &AppState,
    club_ctx: &ClubContext,
    user: &AuthenticatedUser,
) -> Result<Transaction<'static, Postgres>, AppError> {
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut tx = app_state.db_pool.begin().await?;
    set_rls_scope(&mut tx, club_ctx.0, user.0.id).await?;
    Ok(tx)
}

/// Precisa rodar dentro de uma transação aberta.
pub(crate) async fn set_rls_scope(conn: &mut PgConnection, club_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query("SELECT set_config('app.club_id', $1, true)")
        .bind(club_id.to_string())
        .execute(&mut *conn)
        .await?;

    sqlx::query("SELECT set_config('app.user_id', $1, true)")
        .bind(user_id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(())
}
