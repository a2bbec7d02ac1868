use std::io::{self, ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log;
use ssh2::{Channel, Session};

use crate::config::TunnelConfig;
use crate::error::{Error, Result};

const BUFFER_SIZE: usize = 16 * 1024;
const IDLE_PAUSE: Duration = Duration::from_millis(1);

/// Local port forwarding over ssh, `127.0.0.1:<local_port>` reaches the configured remote address.
/// The tunnel is torn down when the value is dropped.
pub struct SshTunnel {
    local_port: u16,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SshTunnel {
    /// Connect and authenticate. Blocks, call it off the async runtime.
    pub fn open(config: &TunnelConfig) -> Result<Self> {
        log::debug!(
            "opening ssh tunnel via {}:{} to {}:{}",
            config.ssh_host,
            config.ssh_port,
            config.remote_host,
            config.remote_port
        );
        let tcp = TcpStream::connect((config.ssh_host.as_str(), config.ssh_port))?;
        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.handshake()?;
        session.userauth_password(&config.username, &config.password)?;
        if !session.authenticated() {
            return Err(Error::SshAuth(config.username.clone()));
        }

        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        listener.set_nonblocking(true)?;
        let local_port = listener.local_addr()?.port();

        let stop = Arc::new(AtomicBool::new(false));
        let forwarder = Forwarder {
            session,
            listener,
            remote_host: config.remote_host.clone(),
            remote_port: config.remote_port,
            stop: Arc::clone(&stop),
            links: Vec::new(),
        };
        let worker = thread::Builder::new()
            .name("ssh-tunnel".to_owned())
            .spawn(move || forwarder.run())?;
        log::info!("ssh tunnel open on 127.0.0.1:{}", local_port);
        Ok(Self {
            local_port,
            stop,
            worker: Some(worker),
        })
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }
}

impl Drop for SshTunnel {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("ssh tunnel worker panicked");
            }
        }
        log::info!("ssh tunnel on 127.0.0.1:{} closed", self.local_port);
    }
}

fn would_block(e: &io::Error) -> bool {
    e.kind() == ErrorKind::WouldBlock
}

/// One accepted local connection and its ssh channel
struct Link {
    stream: TcpStream,
    channel: Channel,
    upstream: Vec<u8>,
    downstream: Vec<u8>,
    closed: bool,
}

impl Link {
    /// Move whatever is ready in both directions, true if any byte moved
    fn pump(&mut self, buf: &mut [u8]) -> io::Result<bool> {
        let mut progress = false;

        if self.upstream.is_empty() {
            match self.stream.read(buf) {
                Ok(0) => self.closed = true,
                Ok(n) => {
                    self.upstream.extend_from_slice(&buf[..n]);
                    progress = true;
                }
                Err(e) if would_block(&e) => {}
                Err(e) => return Err(e),
            }
        }
        if !self.upstream.is_empty() {
            match self.channel.write(&self.upstream) {
                Ok(n) => {
                    self.upstream.drain(..n);
                    progress |= n > 0;
                }
                Err(e) if would_block(&e) => {}
                Err(e) => return Err(e),
            }
        }

        if self.downstream.is_empty() {
            match self.channel.read(buf) {
                Ok(0) => self.closed |= self.channel.eof(),
                Ok(n) => {
                    self.downstream.extend_from_slice(&buf[..n]);
                    progress = true;
                }
                Err(e) if would_block(&e) => {}
                Err(e) => return Err(e),
            }
        }
        if !self.downstream.is_empty() {
            match self.stream.write(&self.downstream) {
                Ok(n) => {
                    self.downstream.drain(..n);
                    progress |= n > 0;
                }
                Err(e) if would_block(&e) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(progress)
    }
}

struct Forwarder {
    session: Session,
    listener: TcpListener,
    remote_host: String,
    remote_port: u16,
    stop: Arc<AtomicBool>,
    links: Vec<Link>,
}

impl Forwarder {
    fn run(mut self) {
        self.session.set_blocking(false);
        let mut buf = vec![0u8; BUFFER_SIZE];
        while !self.stop.load(Ordering::SeqCst) {
            let mut progress = self.accept();
            for link in self.links.iter_mut() {
                match link.pump(&mut buf) {
                    Ok(moved) => progress |= moved,
                    Err(e) => {
                        log::warn!("dropping tunnel connection: {}", e);
                        link.closed = true;
                    }
                }
            }
            self.links.retain(|link| !link.closed);
            if !progress {
                thread::sleep(IDLE_PAUSE);
            }
        }
        self.links.clear();
        self.session.set_blocking(true);
        if let Err(e) = self.session.disconnect(None, "tunnel closed", None) {
            log::warn!("ssh disconnect failed: {}", e);
        }
    }

    fn accept(&mut self) -> bool {
        let stream = match self.listener.accept() {
            Ok((stream, peer)) => {
                log::debug!("tunnel connection from {}", peer);
                stream
            }
            Err(e) if would_block(&e) => return false,
            Err(e) => {
                log::error!("tunnel accept failed: {}", e);
                return false;
            }
        };
        // channel setup is a short handshake, do it blocking
        self.session.set_blocking(true);
        let channel = self
            .session
            .channel_direct_tcpip(&self.remote_host, self.remote_port, None);
        self.session.set_blocking(false);
        match (channel, stream.set_nonblocking(true)) {
            (Ok(channel), Ok(())) => self.links.push(Link {
                stream,
                channel,
                upstream: Vec::new(),
                downstream: Vec::new(),
                closed: false,
            }),
            (Err(e), _) => log::error!(
                "could not open channel to {}:{}: {}",
                self.remote_host,
                self.remote_port,
                e
            ),
            (_, Err(e)) => log::error!("tunnel connection setup failed: {}", e),
        }
        true
    }
}
