//! Conexão MQTT: assina o tópico de alertas e alimenta a inbox.
//!
//! [`connect`] faz o handshake (CONNACK + SUBACK) de forma síncrona, para
//! que falhas de conexão cheguem à UI como `Err`. Depois disso, uma thread
//! dedicada decodifica cada PUBLISH e faz `push` na [`Inbox`]. Nada além da
//! inbox e do [`LinkState`] é tocado por essa thread.
//!
//! A UI não chama [`connect`] direto: usa [`connect_in_background`], que
//! roda o handshake numa thread própria e entrega o resultado por channel.

use alert_core::config::BrokerConfig;
use alert_core::decoder::decode_payload;
use alert_core::inbox::Inbox;
use alert_core::shutdown::{self, Shutdown, ShutdownTrigger};
use crossbeam_channel::{Receiver, TryRecvError, bounded};
use parking_lot::RwLock;
use rumqttc::{
    Client, ConnectReturnCode, Connection, ConnectionError, Event, MqttOptions, Outgoing, Packet,
    QoS, RecvTimeoutError, SubscribeReasonCode,
};
use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// Capacidade do channel de requisições do cliente.
const REQUEST_CAPACITY: usize = 10;
/// Granularidade com que a thread checa o sinal de encerramento.
const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Pausa após erro de rede antes do próximo poll (que reconecta).
const ERROR_PAUSE: Duration = Duration::from_secs(2);
/// Tempo máximo para o DISCONNECT sair no encerramento.
const DISCONNECT_GRACE: Duration = Duration::from_millis(500);

/// Erros ao conectar no broker.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Configuração inválida: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error("Conexão recusada pelo broker: {0:?}")]
    Refused(ConnectReturnCode),

    #[error("Assinatura de '{0}' rejeitada pelo broker")]
    SubscribeRejected(String),

    #[error("Falha de conexão: {0}")]
    Connection(String),

    #[error("Tempo esgotado após {0}s aguardando o broker")]
    Timeout(u64),

    #[error("Conexão cancelada pelo encerramento")]
    Cancelled,

    #[error("Erro do cliente MQTT: {0}")]
    Client(#[from] rumqttc::ClientError),
}

/// Estado do link com o broker, exibido na barra de status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Connected,
    Lost(String),
    Closed,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Connected => write!(f, "Conectado"),
            LinkState::Lost(reason) => write!(f, "Conexão perdida: {reason}"),
            LinkState::Closed => write!(f, "Desconectado"),
        }
    }
}

/// Conexão ativa com o broker. Dropar o handle encerra a thread de rede.
pub struct BrokerHandle {
    link: Arc<RwLock<LinkState>>,
    stop: ShutdownTrigger,
    thread: Option<JoinHandle<()>>,
    address: String,
    topic: String,
}

impl BrokerHandle {
    pub fn link_state(&self) -> LinkState {
        self.link.read().clone()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Desconecta e espera a thread de rede terminar.
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        // A thread de rede envia o DISCONNECT ao ver o sinal.
        self.stop.trigger();
        if thread.join().is_err() {
            error!("Thread MQTT terminou em pânico");
        }
        info!("Desconectado de {}", self.address);
    }
}

impl Drop for BrokerHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Conecta no broker e assina o tópico configurado.
///
/// Bloqueia até o SUBACK ou até `connect_timeout_secs`. Mensagens que
/// chegarem já são empurradas para `inbox`. A thread de rede termina quando
/// `shutdown` dispara ou quando o handle é fechado.
pub fn connect(
    config: &BrokerConfig,
    inbox: Arc<Inbox>,
    shutdown: Shutdown,
) -> Result<BrokerHandle, BrokerError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(BrokerError::InvalidConfig(errors));
    }

    let address = config.address();
    let topic = config.topic.trim().to_string();
    info!("Conectando a {address} – tópico '{topic}'");

    let mut options = MqttOptions::new(&config.client_id, config.host.trim(), config.port);
    options.set_keep_alive(config.keep_alive());
    options.set_clean_session(true);

    let (client, mut connection) = Client::new(options, REQUEST_CAPACITY);
    // Fica na fila até o CONNACK; assinatura antes de qualquer entrega.
    client.subscribe(topic.as_str(), QoS::AtMostOnce)?;

    wait_for_session(&mut connection, &topic, &inbox, config, &shutdown)?;
    info!("Conectado a {address}, assinando '{topic}'");

    let link = Arc::new(RwLock::new(LinkState::Connected));
    let (stop, local) = shutdown::channel();

    let thread = {
        let link = Arc::clone(&link);
        let topic = topic.clone();
        std::thread::Builder::new()
            .name("mqtt-receiver".into())
            .spawn(move || {
                let tokens = [shutdown, local];
                let disconnected =
                    receiver_loop(&mut connection, &client, &topic, &inbox, &link, &tokens);
                if !disconnected {
                    disconnect_gracefully(&mut connection, &client);
                }
                *link.write() = LinkState::Closed;
            })
            .expect("Falha ao criar thread MQTT")
    };

    Ok(BrokerHandle {
        link,
        stop,
        thread: Some(thread),
        address,
        topic,
    })
}

/// Aguarda CONNACK e SUBACK dentro do timeout configurado.
fn wait_for_session(
    connection: &mut Connection,
    topic: &str,
    inbox: &Inbox,
    config: &BrokerConfig,
    shutdown: &Shutdown,
) -> Result<(), BrokerError> {
    let deadline = Instant::now()
        .checked_add(config.connect_timeout())
        .ok_or_else(|| {
            BrokerError::InvalidConfig(vec![format!(
                "Timeout de conexão inválido: {}s",
                config.connect_timeout_secs
            )])
        })?;

    loop {
        if shutdown.is_triggered() {
            return Err(BrokerError::Cancelled);
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(BrokerError::Timeout(config.connect_timeout_secs));
        }

        match connection.recv_timeout(remaining.min(POLL_INTERVAL)) {
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return Err(BrokerError::Connection("event loop encerrado".into()));
            }
            Ok(Err(ConnectionError::ConnectionRefused(code))) => {
                return Err(BrokerError::Refused(code));
            }
            Ok(Err(e)) => return Err(BrokerError::Connection(e.to_string())),
            Ok(Ok(Event::Incoming(Packet::ConnAck(ack)))) => {
                if ack.code != ConnectReturnCode::Success {
                    return Err(BrokerError::Refused(ack.code));
                }
                debug!("CONNACK recebido (session_present={})", ack.session_present);
            }
            Ok(Ok(Event::Incoming(Packet::SubAck(ack)))) => {
                if ack
                    .return_codes
                    .iter()
                    .any(|c| matches!(c, SubscribeReasonCode::Failure))
                {
                    return Err(BrokerError::SubscribeRejected(topic.to_string()));
                }
                return Ok(());
            }
            Ok(Ok(Event::Incoming(Packet::Publish(publish)))) => {
                inbox.push(decode_payload(&publish.payload));
            }
            Ok(Ok(event)) => trace!("Handshake: {event:?}"),
        }
    }
}

/// Tentativa de conexão rodando fora da thread da UI.
pub struct PendingConnect {
    result: Receiver<Result<BrokerHandle, BrokerError>>,
    thread: Option<JoinHandle<()>>,
    address: String,
}

impl PendingConnect {
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Resultado da tentativa, se ela já terminou.
    pub fn try_finish(&mut self) -> Option<Result<BrokerHandle, BrokerError>> {
        let result = match self.result.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                Err(BrokerError::Connection("tentativa de conexão abortada".into()))
            }
        };
        self.join();
        Some(result)
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Thread de conexão MQTT terminou em pânico");
            }
        }
    }
}

impl Drop for PendingConnect {
    // Sem `shutdown` disparado, espera até `connect_timeout_secs`.
    fn drop(&mut self) {
        self.join();
    }
}

/// Roda [`connect`] numa thread `mqtt-connect` e chama `notify` quando o
/// resultado estiver pronto.
pub fn connect_in_background<F>(
    config: &BrokerConfig,
    inbox: Arc<Inbox>,
    shutdown: Shutdown,
    notify: F,
) -> PendingConnect
where
    F: Fn() + Send + 'static,
{
    let (tx, rx) = bounded(1);
    let config = config.clone();
    let address = config.address();

    let thread = std::thread::Builder::new()
        .name("mqtt-connect".into())
        .spawn(move || {
            let result = connect(&config, inbox, shutdown);
            // Se ninguém espera mais, o handle volta no erro e é dropado aqui.
            if tx.send(result).is_err() {
                debug!("Resultado de conexão descartado");
            }
            notify();
        })
        .expect("Falha ao criar thread de conexão MQTT");

    PendingConnect {
        result: rx,
        thread: Some(thread),
        address,
    }
}

fn receiver_loop(
    connection: &mut Connection,
    client: &Client,
    topic: &str,
    inbox: &Inbox,
    link: &RwLock<LinkState>,
    tokens: &[Shutdown],
) -> bool {
    let stopping = || tokens.iter().any(Shutdown::is_triggered);

    while !stopping() {
        match connection.recv_timeout(POLL_INTERVAL) {
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return true,
            Ok(Ok(Event::Incoming(Packet::Publish(publish)))) => {
                trace!("PUBLISH em '{}' ({} bytes)", publish.topic, publish.payload.len());
                inbox.push(decode_payload(&publish.payload));
            }
            Ok(Ok(Event::Incoming(Packet::ConnAck(_)))) => {
                // Sessão limpa: a assinatura se perde a cada reconexão.
                info!("Reconectado, assinando '{topic}' novamente");
                if let Err(e) = client.try_subscribe(topic, QoS::AtMostOnce) {
                    warn!("Falha ao reenviar assinatura: {e}");
                }
                *link.write() = LinkState::Connected;
            }
            Ok(Ok(Event::Incoming(Packet::SubAck(ack)))) => {
                if ack
                    .return_codes
                    .iter()
                    .any(|c| matches!(c, SubscribeReasonCode::Failure))
                {
                    error!("Assinatura de '{topic}' rejeitada pelo broker");
                    *link.write() = LinkState::Lost(format!("assinatura de '{topic}' rejeitada"));
                }
            }
            Ok(Ok(Event::Outgoing(Outgoing::Disconnect))) => return true,
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                warn!("Erro na conexão MQTT: {e}");
                *link.write() = LinkState::Lost(e.to_string());
                // O próximo poll tenta reconectar; a pausa evita laço quente.
                let paused = Instant::now();
                while paused.elapsed() < ERROR_PAUSE && !stopping() {
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        }
    }
    false
}

fn disconnect_gracefully(connection: &mut Connection, client: &Client) {
    if client.try_disconnect().is_err() {
        return;
    }
    let deadline = Instant::now() + DISCONNECT_GRACE;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            debug!("DISCONNECT não confirmado dentro do prazo");
            return;
        }
        match connection.recv_timeout(remaining) {
            Ok(Ok(Event::Outgoing(Outgoing::Disconnect))) => return,
            Ok(Ok(_)) => {}
            Ok(Err(_)) | Err(_) => return,
        }
    }
}
