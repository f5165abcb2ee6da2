//! Middleware del sistema
//! 
//! Este módulo contiene la configuración de CORS.

pub mod cors;

pub use cors::*;
