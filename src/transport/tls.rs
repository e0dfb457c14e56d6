//! TLS material loading for outbound connections.

use std::fs;
use std::path::Path;

use crate::config::TlsConfig;
use crate::error::InvokeError;

/// PEM material validated and ready to hand to the HTTP client.
#[derive(Debug, Clone, Default)]
pub struct TlsMaterial {
    /// Extra trust anchors (PEM, one or more certificates).
    pub ca_bundle: Option<Vec<u8>>,
    /// Client certificate chain followed by its private key (PEM).
    pub identity_pem: Option<Vec<u8>>,
    /// Skip server certificate verification.
    pub insecure_skip_verify: bool,
}

/// Load and validate the files referenced by `config`.
pub fn load_tls_material(config: &TlsConfig) -> Result<TlsMaterial, InvokeError> {
    let ca_bundle = match &config.ca_path {
        Some(path) => {
            let pem = read_pem(path, "CA bundle")?;
            ensure_certificates(path, &pem)?;
            Some(pem)
        }
        None => None,
    };

    let identity_pem = match (&config.cert_path, &config.key_path) {
        (Some(cert_path), Some(key_path)) => {
            let mut cert = read_pem(cert_path, "Certificate")?;
            ensure_certificates(cert_path, &cert)?;

            let key = read_pem(key_path, "Private key")?;
            ensure_private_key(key_path, &key)?;

            if !cert.ends_with(b"\n") {
                cert.push(b'\n');
            }
            cert.extend_from_slice(&key);
            Some(cert)
        }
        (None, None) => None,
        _ => {
            return Err(InvokeError::Tls(
                "cert_path and key_path must be configured together".to_string(),
            ))
        }
    };

    Ok(TlsMaterial {
        ca_bundle,
        identity_pem,
        insecure_skip_verify: config.insecure_skip_verify,
    })
}

fn read_pem(path: &Path, what: &str) -> Result<Vec<u8>, InvokeError> {
    if !path.exists() {
        return Err(InvokeError::Tls(format!("{} file not found: {:?}", what, path)));
    }
    fs::read(path).map_err(|e| InvokeError::Tls(format!("{} file {:?}: {}", what, path, e)))
}

fn ensure_certificates(path: &Path, pem: &[u8]) -> Result<(), InvokeError> {
    let certs = rustls_pemfile::certs(&mut &pem[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| InvokeError::Tls(format!("invalid certificate PEM {:?}: {}", path, e)))?;

    if certs.is_empty() {
        return Err(InvokeError::Tls(format!("no certificates found in {:?}", path)));
    }
    Ok(())
}

fn ensure_private_key(path: &Path, pem: &[u8]) -> Result<(), InvokeError> {
    match rustls_pemfile::private_key(&mut &pem[..]) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(InvokeError::Tls(format!("no private key found in {:?}", path))),
        Err(e) => Err(InvokeError::Tls(format!("invalid private key PEM {:?}: {}", path, e))),
    }
}
