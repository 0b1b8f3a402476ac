use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::convert::Infallible;

/// Bearer-токен из заголовка Authorization входящего запроса.
/// Usage in handlers: `async fn handler(BearerToken(token): BearerToken) -> Response`
///
/// Токен пересылается во внешний API при создании записей,
/// чтобы записи создавались от имени пользователя панели.
pub struct BearerToken(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        Ok(BearerToken(token))
    }
}
