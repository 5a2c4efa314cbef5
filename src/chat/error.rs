use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Another turn landed in the session between reading its history
    /// and writing the reply.
    #[error("Session {session_id} changed while the reply was being generated")]
    HistoryChanged { session_id: String },
}
