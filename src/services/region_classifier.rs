//! Clasificación geográfica de direcciones de recogida
//!
//! Extrae el primer código postal de 5 dígitos de una dirección libre y lo
//! agrupa en una región metropolitana por rangos numéricos. Es una heurística
//! gruesa: sin geocodificación ni distancias reales.

use lazy_static::lazy_static;
use regex::Regex;

/// Código postal centinela cuando la dirección no trae ninguno
pub const UNKNOWN_ZIP: &str = "99999";

/// Rangos cerrados de códigos postales por región
const REGION_RANGES: &[(u32, u32, &str)] = &[
    (80200, 80299, "Denver, CO"),
    (10000, 11999, "New York, NY"),
    (20000, 20599, "Washington, DC"),
    (90000, 90999, "Los Angeles, CA"),
];

lazy_static! {
    static ref ZIP_REGEX: Regex = Regex::new(r"(?-u:\b)([0-9]{5})(?-u:\b)").expect("zip code regex is valid");
}

/// Resultado de clasificar una dirección
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedAddress {
    pub zip_code: String,
    pub region: String,
}

/// Extraer el primer token numérico aislado de 5 dígitos
pub fn extract_zip_code(address: &str) -> String {
    ZIP_REGEX
        .captures(address)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_ZIP.to_string())
}

/// Región de un código postal; sin rango conocido, la región es el propio código
pub fn region_for_zip(zip_code: &str) -> String {
    zip_code
        .parse::<u32>()
        .ok()
        .and_then(|zip| {
            REGION_RANGES
                .iter()
                .find(|(from, to, _)| (*from..=*to).contains(&zip))
        })
        .map(|(_, _, name)| name.to_string())
        .unwrap_or_else(|| zip_code.to_string())
}

/// Función total: siempre devuelve una etiqueta de región
pub fn classify(address: &str) -> ClassifiedAddress {
    let zip_code = extract_zip_code(address);
    let region = region_for_zip(&zip_code);
    ClassifiedAddress { zip_code, region }
}
