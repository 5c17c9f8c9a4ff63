//! # Recursos del sistema de archivos
//! src/handlers/resource.rs
//!
//! Un `Resource` es el archivo al que apunta el target de un request:
//! `<document root>` + target sin la barra inicial. El servidor solo lee
//! recursos; nunca los crea ni los borra.

use crate::http::headers::StandardHeaders;
use crate::http::StatusCode;
use std::fs::{self, Metadata};
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Archivo resuelto y sus metadatos al momento del request
#[derive(Debug, Clone)]
pub struct Resource {
    /// Target tal como vino en el request (ej: "/cgi_bin/basic.cgi")
    target: String,

    /// Ruta en disco
    path: PathBuf,

    metadata: Metadata,
}

impl Resource {
    /// Resuelve un target contra el document root
    ///
    /// # Errores (como código de estado)
    ///
    /// - `403 Forbidden`: el target contiene un segmento `..`
    /// - `404 Not Found`: no existe
    /// - `400 Bad Request`: es un directorio
    pub fn resolve(root: &Path, target: &str) -> Result<Self, StatusCode> {
        let relative = Path::new(target.trim_start_matches('/'));
        if relative.components().any(|c| c == Component::ParentDir) {
            return Err(StatusCode::Forbidden);
        }

        let path = root.join(relative);
        let metadata = fs::metadata(&path).map_err(|_| StatusCode::NotFound)?;

        if metadata.is_dir() {
            return Err(StatusCode::BadRequest);
        }

        Ok(Self {
            target: target.to_string(),
            path,
            metadata,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tamaño en bytes
    pub fn len(&self) -> u64 {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fecha de modificación truncada a segundos
    ///
    /// Las fechas HTTP tienen resolución de un segundo; truncar evita que un
    /// `If-Modified-Since` igual al `Last-Modified` enviado parezca anterior.
    pub fn last_modified(&self) -> SystemTime {
        let modified = self.metadata.modified().unwrap_or(UNIX_EPOCH);
        let secs = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    /// Extensión del nombre del archivo (lo que sigue al último punto)
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    /// ¿Tiene extensión `cgi` (sin importar mayúsculas)?
    pub fn is_cgi(&self) -> bool {
        self.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("cgi"))
    }

    /// ¿Se sirve como texto (`txt` o `html`)?
    pub fn is_text(&self) -> bool {
        matches!(self.extension(), Some("txt" | "html"))
    }

    /// Headers estándar para servir este archivo
    pub fn file_headers(&self) -> StandardHeaders {
        StandardHeaders::for_file(self.extension(), self.len(), self.last_modified())
    }

    /// Headers estándar para la salida de este script
    pub fn cgi_headers(&self, output_length: u64) -> StandardHeaders {
        StandardHeaders::for_cgi(output_length, self.last_modified())
    }
}
