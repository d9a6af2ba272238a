//! Hand-written HTTP/1.1 exchange over a plain or TLS stream.
//!
//! The request is a fixed `GET` with `Host`, `Connection: close` and
//! `User-Agent`; the response parser expects CRLF line endings and a blank
//! line terminating the headers, then reads the remainder of the stream as
//! the body (valid because the connection closes).

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, OnceLock};

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use url::Url;

use crate::{FetchError, Response};

pub const USER_AGENT: &str = "weft/0.1";

pub(crate) fn fetch_remote(url: &Url) -> Result<Response, FetchError> {
    let host = url
        .host_str()
        .ok_or_else(|| FetchError::BadTarget(url.to_string()))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| FetchError::BadTarget(url.to_string()))?;

    log::debug!("GET {url} ({host}:{port})");
    let tcp = TcpStream::connect((host, port))?;
    let mut transport = if url.scheme() == "https" {
        Transport::tls(tcp, host)?
    } else {
        Transport::Plain(tcp)
    };

    transport.write_all(build_request(url).as_bytes())?;
    transport.flush()?;

    let mut reader = BufReader::new(transport);
    read_response(&mut reader)
}

fn build_request(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let path = url.path();
    format!(
        "GET {path} HTTP/1.1\r\n\
         Host: {host}\r\n\
         Connection: close\r\n\
         User-Agent: {USER_AGENT}\r\n\
         \r\n"
    )
}

// Status line + headers + body from any buffered reader, so the parser is
// testable against in-memory byte buffers.
fn read_response<R: BufRead>(reader: &mut R) -> Result<Response, FetchError> {
    let mut status_line = String::new();
    if reader.read_line(&mut status_line)? == 0 {
        return Err(FetchError::MalformedResponse("empty response"));
    }
    let status_line = status_line.trim_end_matches(['\r', '\n']);
    let mut parts = status_line.splitn(3, ' ');
    let _version = parts
        .next()
        .ok_or(FetchError::MalformedResponse("missing status line"))?;
    let status: u16 = parts
        .next()
        .and_then(|code| code.parse().ok())
        .ok_or(FetchError::MalformedResponse("missing status code"))?;
    let reason = parts.next().unwrap_or_default().to_string();
    if status != 200 {
        return Err(FetchError::Http { status, reason });
    }

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            log::warn!("skipping malformed header line: {line:?}");
            continue;
        };
        headers.insert(key.to_ascii_lowercase(), value.trim().to_string());
    }

    for key in ["transfer-encoding", "content-encoding"] {
        if headers.contains_key(key) {
            return Err(FetchError::UnsupportedEncoding(key.to_string()));
        }
    }

    let mut body = String::new();
    reader.read_to_string(&mut body)?;
    Ok(Response { headers, body })
}

enum Transport {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Transport {
    fn tls(tcp: TcpStream, host: &str) -> Result<Self, FetchError> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| FetchError::BadTarget(host.to_string()))?;
        let connection = ClientConnection::new(tls_config(), server_name)?;
        Ok(Transport::Tls(Box::new(StreamOwned::new(connection, tcp))))
    }
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Transport::Plain(stream) => stream.read(buf),
            Transport::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Transport::Plain(stream) => stream.write(buf),
            Transport::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Transport::Plain(stream) => stream.flush(),
            Transport::Tls(stream) => stream.flush(),
        }
    }
}

// One process-wide client config; building the native root store is not
// free and the config is immutable once built.
fn tls_config() -> Arc<ClientConfig> {
    static CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();
    CONFIG
        .get_or_init(|| {
            let mut roots = RootCertStore::empty();
            let native = rustls_native_certs::load_native_certs();
            for err in &native.errors {
                log::warn!("native root cert error: {err}");
            }
            let (added, ignored) = roots.add_parsable_certificates(native.certs);
            log::debug!("loaded {added} native roots ({ignored} ignored)");
            Arc::new(
                ClientConfig::builder()
                    .with_root_certificates(roots)
                    .with_no_client_auth(),
            )
        })
        .clone()
}
