//! Connection registry
//!
//! Connections own an unbounded outbound queue drained by a per-socket
//! writer task; the registry maps connections to players and back. A failed
//! send just drops the mapping - the peer is treated as offline from then
//! on.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::protocol::ServerMessage;

#[derive(Default)]
pub struct ConnectionRegistry {
    senders: HashMap<String, UnboundedSender<ServerMessage>>,
    player_by_conn: HashMap<String, String>,
    conn_by_player: HashMap<String, String>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, conn_id: &str, sender: UnboundedSender<ServerMessage>) {
        self.senders.insert(conn_id.to_string(), sender);
    }

    /// Attach a player to a connection; a reconnect displaces the old
    /// connection's binding
    pub fn bind_player(&mut self, conn_id: &str, player_id: &str) {
        if let Some(old_conn) = self.conn_by_player.remove(player_id) {
            self.player_by_conn.remove(&old_conn);
        }
        self.player_by_conn
            .insert(conn_id.to_string(), player_id.to_string());
        self.conn_by_player
            .insert(player_id.to_string(), conn_id.to_string());
    }

    /// Detach the player from its connection without dropping the socket
    pub fn unbind_player(&mut self, player_id: &str) {
        if let Some(conn) = self.conn_by_player.remove(player_id) {
            self.player_by_conn.remove(&conn);
        }
    }

    /// Drop a closed connection; returns the player that was bound to it
    pub fn unregister(&mut self, conn_id: &str) -> Option<String> {
        self.senders.remove(conn_id);
        let player = self.player_by_conn.remove(conn_id);
        if let Some(p) = &player {
            self.conn_by_player.remove(p);
        }
        player
    }

    pub fn player_of(&self, conn_id: &str) -> Option<&str> {
        self.player_by_conn.get(conn_id).map(String::as_str)
    }

    /// Queue a frame; a failed send is logged and otherwise ignored (the
    /// socket close event does the authoritative cleanup)
    pub fn send_to_conn(&mut self, conn_id: &str, msg: ServerMessage) {
        if let Some(tx) = self.senders.get(conn_id) {
            if tx.send(msg).is_err() {
                debug!(conn = %conn_id, "send to closed connection dropped");
            }
        }
    }

    /// Best-effort delivery; offline players (and bots, which never bind a
    /// connection) silently miss out
    pub fn send_to_player(&mut self, player_id: &str, msg: ServerMessage) {
        if let Some(conn) = self.conn_by_player.get(player_id).cloned() {
            self.send_to_conn(&conn, msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_bind_and_send() {
        let mut reg = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        reg.register("c1", tx);
        reg.bind_player("c1", "p1");
        reg.send_to_player("p1", ServerMessage::info("hello"));
        assert!(matches!(
            rx.try_recv(),
            Ok(ServerMessage::Info { message }) if message == "hello"
        ));
    }

    #[test]
    fn test_reconnect_displaces_old_binding() {
        let mut reg = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        reg.register("c1", tx1);
        reg.register("c2", tx2);
        reg.bind_player("c1", "p1");
        reg.bind_player("c2", "p1");
        reg.send_to_player("p1", ServerMessage::info("again"));
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_send_to_closed_connection_is_silent() {
        let mut reg = ConnectionRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        reg.register("c1", tx);
        reg.bind_player("c1", "p1");
        drop(rx);
        // Tolerated; the binding stays until the disconnect event
        reg.send_to_player("p1", ServerMessage::info("void"));
        assert_eq!(reg.player_of("c1"), Some("p1"));
    }

    #[test]
    fn test_unregister_returns_player() {
        let mut reg = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        reg.register("c1", tx);
        reg.bind_player("c1", "p1");
        assert_eq!(reg.unregister("c1").as_deref(), Some("p1"));
        assert_eq!(reg.unregister("c1"), None);
    }
}
