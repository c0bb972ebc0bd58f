use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use tracing::{debug, warn};

use crate::bridge::{AudioChannel, Looper, MethodCall, MethodResult, RETRY_FETCH_SONGS, Reply};
use crate::config::Settings;
use crate::index::MediaIndex;
use crate::library::MediaLibraryScanner;
use crate::permission::PermissionGate;

use super::host::{CliPermissionHost, HostEvent, LoopbackMessenger};

const POLL: Duration = Duration::from_millis(50);

/// One foreground context driving the audio channel the way the UI layer would.
pub struct Session {
    looper: Looper,
    channel: AudioChannel,
    events: Receiver<HostEvent>,
    replies_tx: mpsc::Sender<(String, MethodResult)>,
    replies: Receiver<(String, MethodResult)>,
    pending: usize,
}

impl Session {
    pub fn new(
        settings: &Settings,
        index: Arc<dyn MediaIndex>,
        deny: bool,
        grant_on_request: bool,
    ) -> Self {
        let (events_tx, events) = mpsc::channel::<HostEvent>();
        let host = Arc::new(CliPermissionHost::new(deny, grant_on_request, events_tx.clone()));
        let gate = Arc::new(PermissionGate::new(
            host,
            settings.permission.api_level,
            settings.permission.request_code,
        ));
        let scanner = Arc::new(MediaLibraryScanner::new(index, gate, &settings.scanner));

        let looper = Looper::new();
        let channel = AudioChannel::new(
            &settings.channel.namespace,
            scanner,
            looper.handle(),
            Arc::new(LoopbackMessenger::new(events_tx)),
        );
        let (replies_tx, replies) = mpsc::channel();

        Self {
            looper,
            channel,
            events,
            replies_tx,
            replies,
            pending: 0,
        }
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    fn dispatch(&mut self, call: MethodCall) {
        let tx = self.replies_tx.clone();
        let method = call.method.clone();
        self.pending += 1;
        self.channel.handle(
            call,
            Reply::new(move |result| {
                if tx.send((method, result)).is_err() {
                    warn!("session closed; dropping reply");
                }
            }),
        );
    }

    /// Send `method`, then keep pumping until every reply is in and the host
    /// has nothing left to say. Returns the replies in arrival order.
    pub fn run(&mut self, method: &str) -> Vec<(String, MethodResult)> {
        self.dispatch(MethodCall::new(method));

        let mut out = Vec::new();
        loop {
            self.looper.run_pending();

            while let Ok(reply) = self.replies.try_recv() {
                self.pending = self.pending.saturating_sub(1);
                out.push(reply);
            }

            let mut had_event = false;
            while let Ok(event) = self.events.try_recv() {
                had_event = true;
                match event {
                    HostEvent::PermissionResult {
                        request_code,
                        results,
                    } => self
                        .channel
                        .on_request_permissions_result(request_code, &results),
                    HostEvent::Invoke { channel, call } => {
                        if channel == self.channel.name() && call.method == RETRY_FETCH_SONGS {
                            debug!(%channel, "UI layer retrying fetch");
                            self.dispatch(call);
                        } else {
                            warn!(%channel, method = %call.method, "ignoring outgoing call");
                        }
                    }
                }
            }

            if self.pending == 0 && !had_event {
                return out;
            }
            if !had_event {
                self.looper.run_one(POLL);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::GET_SONGS;
    use crate::index::{MediaRow, MemoryMediaIndex};

    fn index_with_one_song(dir: &std::path::Path) -> Arc<dyn MediaIndex> {
        let path = dir.join("song.mp3");
        std::fs::write(&path, vec![0u8; 60 * 1024]).unwrap();
        Arc::new(MemoryMediaIndex::new(vec![MediaRow {
            data: Some(path.to_str().unwrap().to_string()),
            date_added: Some(1),
            duration: Some(30_000),
            is_music: true,
            ..MediaRow::default()
        }]))
    }

    #[test]
    fn granted_session_returns_songs() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(
            &Settings::default(),
            index_with_one_song(dir.path()),
            false,
            false,
        );
        let replies = session.run(GET_SONGS);
        assert_eq!(replies.len(), 1);
        assert!(matches!(&replies[0].1, MethodResult::Success(v) if v.as_array().unwrap().len() == 1));
    }

    #[test]
    fn grant_on_request_runs_the_retry_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(
            &Settings::default(),
            index_with_one_song(dir.path()),
            true,
            true,
        );
        let replies = session.run(GET_SONGS);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].0, GET_SONGS);
        assert_eq!(replies[0].1.error_code(), Some("PERMISSION_DENIED"));
        assert_eq!(replies[1].0, RETRY_FETCH_SONGS);
        assert!(matches!(&replies[1].1, MethodResult::Success(v) if v.as_array().unwrap().len() == 1));
    }

    struct PanickingIndex;

    impl MediaIndex for PanickingIndex {
        fn query(
            &self,
            _query: &crate::index::AudioQuery,
            _visit: crate::index::RowVisitor<'_>,
        ) -> Result<(), crate::error::IndexError> {
            panic!("corrupt media file");
        }
    }

    #[test]
    fn crashed_scan_ends_the_session_with_a_fetch_error() {
        let mut session = Session::new(&Settings::default(), Arc::new(PanickingIndex), false, false);
        let replies = session.run(GET_SONGS);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].1.error_code(), Some("FETCH_ERROR"));
    }

    #[test]
    fn refused_request_stops_after_the_denial() {
        let mut session = Session::new(
            &Settings::default(),
            Arc::new(MemoryMediaIndex::default()),
            true,
            false,
        );
        let replies = session.run(GET_SONGS);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].1.error_code(), Some("PERMISSION_DENIED"));
    }
}
