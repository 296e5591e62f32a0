//! Utilidades de validación
//!
//! Validadores personalizados usados desde `#[validate(custom = ...)]` en los DTOs.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref LICENSE_PLATE: Regex =
        Regex::new(r"^[A-Z0-9ÄÖÜ][A-Z0-9ÄÖÜ \-]{1,14}$").expect("valid license plate regex");
    static ref VIN: Regex = Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").expect("valid VIN regex");
    static ref TIME_HH_MM: Regex =
        Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid time regex");
}

fn error(code: &'static str, message: &'static str, value: &str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error.add_param("value".into(), &value.to_string());
    error
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("not_blank", "must not be blank", value));
    }
    Ok(())
}

/// Matrícula: letras, dígitos, espacios y guiones
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    if !LICENSE_PLATE.is_match(&normalize_license_plate(value)) {
        return Err(error("license_plate", "invalid license plate", value));
    }
    Ok(())
}

/// VIN de 17 caracteres (sin I, O ni Q); vacío significa sin VIN
pub fn validate_vin(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    if !VIN.is_match(&value.trim().to_uppercase()) {
        return Err(error("vin", "VIN must have 17 characters without I, O or Q", value));
    }
    Ok(())
}

/// Hora en formato HH:MM; vacío significa sin hora
pub fn validate_time(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    if !TIME_HH_MM.is_match(value.trim()) {
        return Err(error("time", "time must use the HH:MM format", value));
    }
    Ok(())
}

/// Matrícula en mayúsculas con espacios simples
pub fn normalize_license_plate(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Convierte strings vacíos en `None`
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_plate() {
        assert!(validate_license_plate("M-AB 1234").is_ok());
        assert!(validate_license_plate("  b-xy   99 ").is_ok());
        assert!(validate_license_plate("Ö-A 1").is_ok());
        assert!(validate_license_plate("").is_err());
        assert!(validate_license_plate("M_AB#1").is_err());
    }

    #[test]
    fn test_vin() {
        assert!(validate_vin("WVWZZZ1JZXW000001").is_ok());
        assert!(validate_vin("wvwzzz1jzxw000001").is_ok());
        assert!(validate_vin("WVWZZZ1JZXW00000").is_err());
        assert!(validate_vin("WVWZZZ1JZXW00000O").is_err());
        assert!(validate_vin("").is_ok());
    }

    #[test]
    fn test_time() {
        assert!(validate_time("08:30").is_ok());
        assert!(validate_time("23:59").is_ok());
        assert!(validate_time("24:00").is_err());
        assert!(validate_time("8:30").is_err());
        assert!(validate_time(" ").is_ok());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_license_plate(" m-ab   12 "), "M-AB 12");
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(Some(" x ".to_string())), Some("x".to_string()));
    }
}
