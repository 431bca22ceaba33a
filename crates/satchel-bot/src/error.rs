use thiserror::Error;
use uuid::Uuid;

/// What a command, conversation or callback handler can fail with. The
/// router turns everything except `Internal` into a recovery message in
/// the chat; `Internal` propagates to the webhook handler and is the only
/// thing that produces a 500.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("chat has no linked account")]
    NotLinked,

    #[error("assignment {0} not found")]
    AssignmentNotFound(Uuid),

    #[error("conversation session is missing {0}")]
    CorruptSession(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type BotResult<T> = std::result::Result<T, BotError>;
