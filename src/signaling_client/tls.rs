use rustls::{ClientConfig, RootCertStore, pki_types::CertificateDer};
use rustls_pemfile::certs;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
    sync::Arc,
};

/// Builds a `RootCertStore` that trusts ONLY the CA(s) in `reader`.
///
/// # Errors
///
/// Returns an `io::Error` if the PEM is invalid or contains no certificates.
pub fn pinned_root_store(reader: &mut dyn BufRead) -> io::Result<RootCertStore> {
    let ca_certs: Vec<CertificateDer<'static>> = certs(reader)
        .collect::<Result<_, _>>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("invalid CA PEM: {e}")))?;

    if ca_certs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "CA PEM did not contain any certificates",
        ));
    }

    let mut root_store = RootCertStore::empty();
    for cert in ca_certs {
        root_store
            .add(cert)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("bad CA cert: {e}")))?;
    }
    Ok(root_store)
}

/// ClientConfig for `wss://` endpoints signed by a private CA.
///
/// Without a pinned CA the websocket layer falls back to the webpki roots.
///
/// # Errors
///
/// Returns an `io::Error` if the file cannot be opened or holds no usable CA.
pub fn pinned_client_config(ca_path: &Path) -> io::Result<Arc<ClientConfig>> {
    let file = File::open(ca_path)
        .map_err(|e| io::Error::new(e.kind(), format!("opening CA {}: {e}", ca_path.display())))?;
    let root_store = pinned_root_store(&mut BufReader::new(file))?;

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(Arc::new(config))
}
