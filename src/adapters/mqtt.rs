//! MQTT messaging adapter (rumqttc, TLS).
//!
//! Implements [`Publisher`] for outbound state and forwards inbound `/set`
//! commands into the coordinator queue.  The rumqttc connection is driven
//! on its own thread; iterating it is what performs network I/O and
//! automatic reconnection.
//!
//! ## Connection lifecycle
//!
//! | Notification           | Action                                 |
//! |------------------------|----------------------------------------|
//! | `ConnAck`              | (re)subscribe to the three `/set` topics |
//! | `Publish` on a `/set`  | push `Event::Remote` (non-blocking)    |
//! | connection error       | warn, back off, let rumqttc reconnect  |
//! | error after disconnect | thread exits                           |

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{info, warn};
use rumqttc::{
    Client, Connection, Event as MqttEvent, MqttOptions, Packet, QoS, TlsConfiguration, Transport,
};

use crate::app::commands::CommandTopics;
use crate::app::ports::Publisher;
use crate::config::MqttConfig;
use crate::error::{CommsError, Error, Result};
use crate::events::{Event, EventSender};

const KEEP_ALIVE: Duration = Duration::from_secs(60);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
/// Outstanding requests the client may queue before `publish` blocks.
const REQUEST_CAP: usize = 32;

pub struct MqttClient {
    client: Client,
    closing: Arc<AtomicBool>,
}

impl MqttClient {
    /// Start connecting to the broker.  Fails only on local setup errors
    /// (CA bundle, thread spawn); broker availability is handled by the
    /// reconnect loop.
    pub fn connect(config: &MqttConfig, events: EventSender) -> Result<Self> {
        let ca = std::fs::read(&config.ca_certs).map_err(|e| {
            warn!("Cannot read CA bundle {}: {}", config.ca_certs.display(), e);
            CommsError::CaBundleUnreadable
        })?;

        let (client, connection) = Client::new(options(config, ca), REQUEST_CAP);
        let closing = Arc::new(AtomicBool::new(false));

        let topics = CommandTopics::new(config);
        let subscriber = client.clone();
        let thread_closing = Arc::clone(&closing);
        thread::Builder::new()
            .name("mqtt".into())
            .spawn(move || drive(connection, &subscriber, &topics, &events, &thread_closing))
            .map_err(|e| Error::Spawn(e.to_string()))?;

        info!("MQTT connecting to {}:{}", config.server, config.port);
        Ok(Self { client, closing })
    }
}

fn options(config: &MqttConfig, ca: Vec<u8>) -> MqttOptions {
    let mut opts = MqttOptions::new(&config.user, &config.server, config.port);
    opts.set_credentials(&config.user, &config.password);
    opts.set_keep_alive(KEEP_ALIVE);
    opts.set_transport(Transport::tls_with_config(TlsConfiguration::Simple {
        ca,
        alpn: None,
        client_auth: None,
    }));
    opts
}

fn drive(
    mut connection: Connection,
    subscriber: &Client,
    topics: &CommandTopics,
    events: &EventSender,
    closing: &AtomicBool,
) {
    for notification in connection.iter() {
        match notification {
            Ok(MqttEvent::Incoming(Packet::ConnAck(_))) => {
                info!("MQTT connected");
                for topic in topics.all() {
                    if let Err(e) = subscriber.try_subscribe(topic, QoS::AtMostOnce) {
                        warn!("Subscribe to {} failed: {}", topic, e);
                    }
                }
            }
            Ok(MqttEvent::Incoming(Packet::Publish(p))) => {
                if let Some(command) = topics.parse(&p.topic, &p.payload) {
                    info!("MQTT {} <- {:?}", p.topic, command);
                    events.push(Event::Remote(command));
                }
            }
            Ok(_) => {}
            Err(e) => {
                if closing.load(Ordering::Acquire) {
                    break;
                }
                warn!("Unexpected MQTT disconnection: {}", e);
                thread::sleep(RECONNECT_DELAY);
            }
        }
    }
    info!("MQTT connection thread exited");
}

impl Publisher for MqttClient {
    fn publish(&self, topic: &str, payload: &str, retain: bool) -> core::result::Result<(), CommsError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, retain, payload.as_bytes().to_vec())
            .map_err(|_| CommsError::PublishFailed)
    }

    fn disconnect(&self) {
        self.closing.store(true, Ordering::Release);
        if let Err(e) = self.client.try_disconnect() {
            warn!("MQTT disconnect failed: {}", e);
        }
        info!("MQTT disconnected");
    }
}
