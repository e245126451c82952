//! Shared WebSocket client: perpetual runtime, connect/reconnect, replay
//!
//! Rust realization of the source's "perpetual mode" I/O runtime: a single
//! `tokio::runtime::Handle` is constructed once per adapter and outlives
//! every individual connection. Reconnect spawns a fresh task on the same
//! handle instead of tearing down and recreating the runtime, which is the
//! structural guarantee the source's ASIO-with-TLS runtime made.

use crate::error::{ GatewayError, Result };
use crate::fabric::AdapterStatusKind;
use futures_util::{ SinkExt, StreamExt };
use parking_lot::Mutex;
use rustls::client::danger::{ HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier };
use rustls::pki_types::{ CertificateDer, ServerName, UnixTime };
use rustls::{ DigitallySignedStruct, SignatureScheme };
use std::sync::atomic::{ AtomicBool, AtomicU32, Ordering };
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{ AsyncReadExt, AsyncWriteExt };
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{ client_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream };

/// WebSocket client configuration. Defaults mirror the gateway-wide
/// defaults: proxy enabled to localhost:7890, TLS verification off (venue
/// testnets often present self-signed chains), ping every 30 seconds.
#[derive(Debug, Clone)]
pub struct WsClientConfig {
    pub verify_ssl: bool,
    pub use_proxy: bool,
    pub proxy_host: String,
    pub proxy_port: u16,
    pub connect_timeout_sec: u64,
    pub ping_interval_sec: u64,
    /// Maximum outbound control-message rate during subscription replay.
    pub max_send_rate_per_sec: u32,
}

impl Default for WsClientConfig {
    fn default() -> Self {
        Self {
            verify_ssl: false,
            use_proxy: true,
            proxy_host: "127.0.0.1".to_string(),
            proxy_port: 7890,
            connect_timeout_sec: 10,
            ping_interval_sec: 30,
            max_send_rate_per_sec: 5,
        }
    }
}

struct ParsedUrl {
    host: String,
    port: u16,
    tls: bool,
}

/// Accepts any server certificate. Backs `verify_ssl=false`, matching the
/// source's `verify_ssl` toggle for venue testnets that present
/// self-signed chains.
#[derive(Debug)]
struct NoCertVerification;

impl ServerCertVerifier for NoCertVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA1,
            SignatureScheme::ECDSA_SHA1_Legacy,
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519
        ]
    }
}

static INSTALL_CRYPTO_PROVIDER: std::sync::Once = std::sync::Once::new();

/// `rustls::ClientConfig::builder()` needs a process-level default crypto
/// provider installed before it can be called; do so once, lazily, rather
/// than requiring every binary that links this crate to do it itself.
fn ensure_crypto_provider() {
    INSTALL_CRYPTO_PROVIDER.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Build the rustls `Connector` this client dials with: the default
/// webpki root store when `verify_ssl` is set, a verifier that accepts
/// any certificate when it isn't.
fn build_tls_connector(verify_ssl: bool) -> Connector {
    ensure_crypto_provider();
    let config = if verify_ssl {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        rustls::ClientConfig::builder().with_root_certificates(roots).with_no_client_auth()
    } else {
        rustls::ClientConfig
            ::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoCertVerification))
            .with_no_client_auth()
    };
    Connector::Rustls(Arc::new(config))
}

fn parse_ws_url(url: &str) -> Result<ParsedUrl> {
    let (scheme, rest) = url.split_once("://").ok_or_else(|| GatewayError::config(format!("malformed websocket url: {url}")))?;
    let tls = match scheme {
        "wss" => true,
        "ws" => false,
        other => return Err(GatewayError::config(format!("unsupported websocket scheme: {other}"))),
    };
    let authority = rest.split(['/', '?']).next().unwrap_or(rest);
    let (host, port) = match authority.rsplit_once(':') {
        Some((h, p)) => (h.to_string(), p.parse::<u16>().unwrap_or(if tls { 443 } else { 80 })),
        None => (authority.to_string(), if tls { 443 } else { 80 }),
    };
    Ok(ParsedUrl { host, port, tls })
}

/// One adapter-wide perpetual client. Construct once; `connect` may be
/// called repeatedly (e.g. once per `WsConnectionType`) since each spawns
/// its own task on the shared runtime handle.
pub struct WsClient {
    runtime: Handle,
    config: WsClientConfig,
    tls_connector: Connector,
    outbound_tx: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    subscriptions: Mutex<Vec<String>>,
    connected: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    reconnects: AtomicU32,
}

impl WsClient {
    pub fn new(runtime: Handle, config: WsClientConfig) -> Self {
        let tls_connector = build_tls_connector(config.verify_ssl);
        Self {
            runtime,
            config,
            tls_connector,
            outbound_tx: Mutex::new(None),
            subscriptions: Mutex::new(Vec::new()),
            connected: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
            reconnects: AtomicU32::new(0),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn reconnect_count(&self) -> u32 {
        self.reconnects.load(Ordering::Relaxed)
    }

    /// The subscription replay set: every message passed to `subscribe`
    /// still active (not since removed by `unsubscribe`), in the order
    /// they'll be replayed on the next reconnect.
    pub fn recorded_subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().clone()
    }

    /// Connect (and auto-reconnect) to `url`, invoking `on_message` for
    /// every text frame and `on_status` on every lifecycle transition.
    /// Returns once the connect loop task has been spawned; connection
    /// completion is asynchronous.
    pub fn connect(
        self: &Arc<Self>,
        url: String,
        on_message: impl Fn(String) + Send + Sync + 'static,
        on_status: impl Fn(AdapterStatusKind) + Send + Sync + 'static
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.outbound_tx.lock() = Some(tx);
        let client = self.clone();
        let on_message = Arc::new(on_message);
        let on_status = Arc::new(on_status);
        self.runtime.spawn(async move {
            client.run_forever(url, rx, on_message, on_status).await;
        });
    }

    async fn run_forever(
        self: Arc<Self>,
        url: String,
        mut rx: mpsc::UnboundedReceiver<Message>,
        on_message: Arc<dyn Fn(String) + Send + Sync>,
        on_status: Arc<dyn Fn(AdapterStatusKind) + Send + Sync>
    ) {
        let mut attempt: u32 = 0;
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }
            on_status(if attempt == 0 { AdapterStatusKind::Connecting } else { AdapterStatusKind::Reconnecting });

            match self.connect_once(&url, &mut rx, on_message.clone()).await {
                Ok(()) => {
                    attempt = 0;
                }
                Err(err) => {
                    tracing::warn!(error = %err, attempt, "websocket connection ended");
                }
            }

            self.connected.store(false, Ordering::Release);
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }
            on_status(AdapterStatusKind::Disconnected);
            self.reconnects.fetch_add(1, Ordering::Relaxed);

            let backoff = reconnect_backoff(attempt);
            attempt = attempt.saturating_add(1);
            tokio::time::sleep(backoff).await;
        }
    }

    async fn dial(&self, url: &str) -> Result<WebSocketStream<MaybeTlsStream<TcpStream>>> {
        let parsed = parse_ws_url(url)?;
        let timeout = Duration::from_secs(self.config.connect_timeout_sec);

        let tcp = tokio::time::timeout(timeout, async {
            if self.config.use_proxy {
                connect_through_proxy(&self.config.proxy_host, self.config.proxy_port, &parsed.host, parsed.port).await
            } else {
                TcpStream::connect((parsed.host.as_str(), parsed.port)).await.map_err(GatewayError::from)
            }
        }).await
            .map_err(|_| GatewayError::Timeout)??;

        let (stream, _response) = tokio::time::timeout(
            timeout,
            client_async_tls_with_config(url, tcp, None, Some(self.tls_connector.clone()))
        )
            .await
            .map_err(|_| GatewayError::Timeout)?
            .map_err(|e| GatewayError::socket(format!("websocket handshake failed: {e}")))?;

        Ok(stream)
    }

    async fn connect_once(
        &self,
        url: &str,
        rx: &mut mpsc::UnboundedReceiver<Message>,
        on_message: Arc<dyn Fn(String) + Send + Sync>
    ) -> Result<()> {
        let stream = self.dial(url).await?;
        self.connected.store(true, Ordering::Release);
        let (mut write, mut read) = stream.split();

        // Replay every previously-issued subscription, in order, throttled
        // so a reconnect storm does not trip the venue's rate limiter.
        let replay: Vec<String> = self.subscriptions.lock().clone();
        let min_gap = Duration::from_millis(1000 / self.config.max_send_rate_per_sec.max(1) as u64);
        for message in replay {
            if write.send(Message::Text(message)).await.is_err() {
                return Err(GatewayError::socket("failed to replay subscription after reconnect"));
            }
            tokio::time::sleep(min_gap).await;
        }

        let ping_interval = Duration::from_secs(self.config.ping_interval_sec.max(1));
        let mut ping_timer = tokio::time::interval(ping_interval);
        ping_timer.tick().await; // first tick fires immediately

        loop {
            tokio::select! {
                _ = ping_timer.tick() => {
                    if write.send(Message::Ping(Vec::new())).await.is_err() {
                        return Err(GatewayError::socket("ping send failed"));
                    }
                }
                outbound = rx.recv() => {
                    match outbound {
                        Some(message) => {
                            if write.send(message).await.is_err() {
                                return Err(GatewayError::socket("outbound send failed"));
                            }
                        }
                        None => return Ok(()),
                    }
                }
                inbound = read.next() => {
                    match inbound {
                        Some(Ok(Message::Text(text))) => on_message(text),
                        Some(Ok(Message::Binary(bytes))) => {
                            if let Ok(text) = String::from_utf8(bytes) {
                                on_message(text);
                            }
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            let _ = write.send(Message::Pong(payload)).await;
                        }
                        Some(Ok(Message::Pong(_))) => {}
                        Some(Ok(Message::Close(_))) | None => return Ok(()),
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(err)) => return Err(GatewayError::socket(format!("websocket read error: {err}"))),
                    }
                }
            }
        }
    }

    /// Send a control message and record it for replay on reconnect.
    pub fn subscribe(&self, message: String) -> Result<()> {
        self.subscriptions.lock().push(message.clone());
        self.send(message)
    }

    /// Remove a previously recorded subscription and send the inverse
    /// message the caller supplies.
    pub fn unsubscribe(&self, original_message: &str, inverse_message: String) -> Result<()> {
        self.subscriptions.lock().retain(|m| m != original_message);
        self.send(inverse_message)
    }

    pub fn send(&self, message: String) -> Result<()> {
        let guard = self.outbound_tx.lock();
        match guard.as_ref() {
            Some(tx) => tx.send(Message::Text(message)).map_err(|_| GatewayError::socket("websocket outbound channel closed")),
            None => Err(GatewayError::socket("websocket client not connected")),
        }
    }

    /// Close the active connection and stop the reconnect loop. Mirrors
    /// the source's shutdown sequence: stop ping, close with going-away,
    /// stop perpetual mode. Here "stop perpetual mode" is the `shutdown`
    /// flag observed by `run_forever` on its next loop iteration.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        *self.outbound_tx.lock() = None;
        self.connected.store(false, Ordering::Release);
    }
}

fn reconnect_backoff(attempt: u32) -> Duration {
    const BASE_MS: u64 = 200;
    const MAX_MS: u64 = 30_000;
    let exp = BASE_MS.saturating_mul(1u64 << attempt.min(10));
    Duration::from_millis(exp.min(MAX_MS))
}

async fn connect_through_proxy(proxy_host: &str, proxy_port: u16, target_host: &str, target_port: u16) -> Result<TcpStream> {
    let mut stream = TcpStream::connect((proxy_host, proxy_port)).await?;
    let request = format!("CONNECT {target_host}:{target_port} HTTP/1.1\r\nHost: {target_host}:{target_port}\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut buf = [0u8; 512];
    let n = stream.read(&mut buf).await?;
    let response = String::from_utf8_lossy(&buf[..n]);
    let status_line = response.lines().next().unwrap_or("");
    if !status_line.contains("200") {
        return Err(GatewayError::socket(format!("proxy CONNECT rejected: {status_line}")));
    }
    Ok(stream)
}
