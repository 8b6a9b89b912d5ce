//! Ошибки конфигурации (ловятся при спавне, не в runtime)

use thiserror::Error;

/// Невалидная конфигурация entity или мира.
///
/// Runtime-путь симуляции ошибок не возвращает: все edge cases
/// сводятся к безопасному состоянию (Wandering/Idle).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number > 0 (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must be a finite number >= 0 (got {value})")]
    Negative { field: &'static str, value: f32 },

    #[error("{field}: min ({min}) must not exceed max ({max})")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{field} must be finite")]
    NotFinite { field: &'static str },
}

/// Проверка `value > 0` (и finite)
pub fn ensure_positive(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Проверка `value >= 0` (и finite)
pub fn ensure_non_negative(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

/// Проверка диапазона `[min, max]` (оба >= 0)
pub fn ensure_range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    ensure_non_negative(field, min)?;
    ensure_non_negative(field, max)?;
    if min > max {
        return Err(ConfigError::InvertedRange { field, min, max });
    }
    Ok(())
}
