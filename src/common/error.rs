use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio. Os handlers convertem para ApiError (já traduzido).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Conta suspensa")]
    AccountSuspended,

    #[error("Papel de administrador no cadastro")]
    AdminSignupNotAllowed,

    #[error("Acesso negado")]
    Forbidden,

    #[error("{0} não encontrado")]
    ResourceNotFound(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Transição inválida: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Estoque insuficiente: {0}")]
    InsufficientStock(String),

    #[error("Mesa {0} indisponível")]
    TableUnavailable(i32),

    #[error("Mesa {0} tem histórico de pedidos")]
    TableHasHistory(i32),

    #[error("Pedido fechado")]
    OrderClosed,

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados (exemplo com sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Atalho para transições de status que a máquina de estados recusou.
    pub fn transition(from: impl ToString, to: impl ToString) -> Self {
        AppError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Converte violações de unicidade do Postgres em 409; o resto vira DatabaseError.
    pub fn from_unique(e: sqlx::Error, detail: &str) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::UniqueConstraintViolation(detail.to_string());
            }
        }
        AppError::DatabaseError(e)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::AdminSignupNotAllowed
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::AccountSuspended | AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::UsernameAlreadyExists
            | AppError::UniqueConstraintViolation(_)
            | AppError::InvalidTransition { .. }
            | AppError::InsufficientStock(_)
            | AppError::TableUnavailable(_)
            | AppError::TableHasHistory(_)
            | AppError::OrderClosed => StatusCode::CONFLICT,
            AppError::DatabaseError(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::FontNotFound(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Traduz o erro para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status();

        let error = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(key) => store.translate(lang, key),
                            None => store.translate(lang, &e.code),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                return ApiError {
                    status,
                    error: store.translate(lang, "validation.failed"),
                    details: Some(json!(details)),
                };
            }
            AppError::EmailAlreadyExists => store.translate(lang, "auth.email_exists"),
            AppError::UsernameAlreadyExists => store.translate(lang, "auth.username_exists"),
            AppError::InvalidCredentials => store.translate(lang, "auth.invalid_credentials"),
            AppError::InvalidToken => store.translate(lang, "auth.invalid_token"),
            AppError::UserNotFound => store.translate(lang, "auth.user_not_found"),
            AppError::AccountSuspended => store.translate(lang, "auth.suspended"),
            AppError::AdminSignupNotAllowed => store.translate(lang, "auth.admin_signup"),
            AppError::Forbidden => store.translate(lang, "auth.forbidden"),
            AppError::ResourceNotFound(resource) => {
                store.format(lang, "resource.not_found", &[("resource", resource.clone())])
            }
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                store.format(lang, "resource.not_found", &[("resource", "Registro".into())])
            }
            AppError::UniqueConstraintViolation(detail) => {
                store.format(lang, "resource.conflict", &[("detail", detail.clone())])
            }
            AppError::InvalidTransition { from, to } => store.format(
                lang,
                "transition.invalid",
                &[("from", from.clone()), ("to", to.clone())],
            ),
            AppError::InsufficientStock(product) => {
                store.format(lang, "pos.insufficient_stock", &[("product", product.clone())])
            }
            AppError::TableUnavailable(number) => {
                store.format(lang, "pos.table_unavailable", &[("table", number.to_string())])
            }
            AppError::TableHasHistory(number) => {
                store.format(lang, "pos.table_has_history", &[("table", number.to_string())])
            }
            AppError::OrderClosed => store.translate(lang, "pos.order_closed"),
            AppError::BadRequest(detail) => {
                store.format(lang, "request.bad", &[("detail", detail.clone())])
            }
            // Todos os outros erros viram 500. O detalhe vai só para o log.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                store.translate(lang, "internal.error")
            }
        };

        ApiError {
            status,
            error,
            details: None,
        }
    }
}

// Resposta já traduzida que sai para o cliente
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Quando não há Locale à mão (ex: rejeição de extratores), responde em inglês.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let store = I18nStore::embedded().unwrap_or_default();
        self.to_api_error(&Locale::default(), &store).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn store() -> I18nStore {
        I18nStore::embedded().unwrap()
    }

    #[test]
    fn maps_domain_errors_to_status_codes() {
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::ResourceNotFound("Evento".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::transition("past", "upcoming").status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InsufficientStock("Gin".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::TableUnavailable(4).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn translates_with_parameters() {
        let api = AppError::TableUnavailable(7).to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.error, "A mesa 7 não está disponível.");
        assert!(api.details.is_none());
    }

    #[test]
    fn table_with_history_is_a_translated_conflict() {
        let api = AppError::TableHasHistory(3).to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.error, "A mesa 3 já teve pedidos e não pode ser removida.");
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco: 123"))
            .to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.error, "An unexpected error occurred.");
    }

    #[test]
    fn validation_errors_carry_translated_field_details() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("validation.required".into());
        errors.add("title", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "One or more fields are invalid.");
        assert_eq!(
            api.details.unwrap(),
            json!({ "title": ["This field is required."] })
        );
    }
}
