//! Правила проверки значений ячеек.
//!
//! Каждое правило получает обрезанное значение и возвращает нормализованное
//! значение либо текст ошибки для пользователя.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email regex")
});

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("username regex"));

static SHORT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{2,10}$").expect("short code regex"));

pub const REQUIRED: &str = "This field is required";

/// Обязательное текстовое поле длиной не более `max_len` символов
pub fn required_text(value: &str, max_len: usize) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(REQUIRED.to_string());
    }
    max_length(value, max_len)?;
    Ok(value.to_string())
}

/// Необязательное текстовое поле; пустое значение дает `None`
pub fn optional_text(value: &str, max_len: usize) -> Result<Option<String>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    max_length(value, max_len)?;
    Ok(Some(value.to_string()))
}

pub fn length_between(value: &str, min_len: usize, max_len: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len < min_len {
        return Err(format!("Must be at least {} characters", min_len));
    }
    max_length(value, max_len)
}

fn max_length(value: &str, max_len: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len > max_len {
        return Err(format!(
            "Must be at most {} characters (got {})",
            max_len, len
        ));
    }
    Ok(())
}

/// Короткий код: 2-10 латинских букв или цифр, приводится к верхнему регистру
pub fn short_code(value: &str) -> Result<String, String> {
    let code = value.trim().to_uppercase();
    if code.is_empty() {
        return Err(REQUIRED.to_string());
    }
    if !SHORT_CODE_RE.is_match(&code) {
        return Err("Must be 2-10 letters or digits".to_string());
    }
    Ok(code)
}

/// Email, приводится к нижнему регистру
pub fn email(value: &str) -> Result<String, String> {
    let email = value.trim().to_lowercase();
    if email.is_empty() {
        return Err(REQUIRED.to_string());
    }
    max_length(&email, 254)?;
    if !EMAIL_RE.is_match(&email) {
        return Err("Invalid email address".to_string());
    }
    Ok(email)
}

pub fn username(value: &str) -> Result<String, String> {
    let name = value.trim();
    if name.is_empty() {
        return Err(REQUIRED.to_string());
    }
    length_between(name, 3, 50)?;
    if !USERNAME_RE.is_match(name) {
        return Err("May contain only letters, digits, '_', '.' and '-'".to_string());
    }
    Ok(name.to_string())
}

/// Значение из фиксированного списка, без учета регистра
pub fn one_of<T>(
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
    allowed: &[&str],
) -> Result<T, String> {
    if value.trim().is_empty() {
        return Err(REQUIRED.to_string());
    }
    parse(value).ok_or_else(|| format!("Must be one of: {}", allowed.join(", ")))
}

/// Как `one_of`, но пустое значение заменяется на `default`
pub fn one_of_or<T>(
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
    allowed: &[&str],
    default: T,
) -> Result<T, String> {
    if value.trim().is_empty() {
        return Ok(default);
    }
    one_of(value, parse, allowed)
}
