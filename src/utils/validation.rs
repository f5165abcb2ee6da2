//! Utilidades de validación
//!
//! Funciones helper usadas por los derives de `validator` en los DTOs.

use uuid::Uuid;
use validator::ValidationError;

/// Validar que un string sea un UUID
pub fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value.trim()).map(|_| ()).map_err(|_| {
        let mut error = ValidationError::new("uuid");
        error.add_param("value".into(), &value.to_string());
        error
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("7f9c24e8-3b12-4fef-91e0-3a4b5c6d7e8f").is_ok());
        assert!(validate_uuid(" 7f9c24e8-3b12-4fef-91e0-3a4b5c6d7e8f ").is_ok());
        assert!(validate_uuid("event-1").is_err());
    }
}
