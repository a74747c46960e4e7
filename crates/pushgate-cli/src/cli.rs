use std::path::PathBuf;

use clap::Parser;

use pushgate_core::{DEFAULT_MAX_PAYLOAD_BYTES, Persistence};

#[derive(Debug, Parser)]
#[command(name = "pushgate")]
#[command(about = "Create and immediately send a push notification to registered devices")]
#[command(version)]
pub struct Cli {
    /// The main message to be sent in the notification
    #[arg(long, default_value = "")]
    pub message: String,

    /// The badge number of the notification
    #[arg(long)]
    pub badge: Option<String>,

    /// The sound for the notification
    #[arg(long, default_value = "")]
    pub sound: String,

    /// The id of the gateway to send this notification through
    #[arg(long)]
    pub service: i64,

    /// Custom notification payload values as a JSON object
    #[arg(long)]
    pub extra: Option<String>,

    /// Save the notification in history after pushing it
    #[arg(long, conflicts_with = "no_persist")]
    pub persist: bool,

    /// Prevent saving the notification in history after pushing it
    #[arg(long)]
    pub no_persist: bool,

    /// Notifications are sent to devices in batches; this controls the
    /// batch size
    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Maximum allowed serialized payload size in bytes
    #[arg(
        long,
        env = "PUSHGATE_MAX_PAYLOAD_BYTES",
        default_value_t = DEFAULT_MAX_PAYLOAD_BYTES
    )]
    pub max_payload_bytes: usize,

    /// How many batches may be in flight at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Path to the gateway config file
    #[arg(long, env = "PUSHGATE_CONFIG", default_value = "pushgate.toml")]
    pub config: PathBuf,

    /// Print the dispatch report as JSON instead of plain text
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Fold the two mutually-exclusive persistence flags into the
    /// tri-state the core works with.
    pub fn persistence(&self) -> Persistence {
        if self.persist {
            Persistence::Persist
        } else if self.no_persist {
            Persistence::DoNotPersist
        } else {
            Persistence::Unset
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn persist_flags_are_mutually_exclusive() {
        let err = Cli::try_parse_from([
            "pushgate",
            "--service",
            "1",
            "--persist",
            "--no-persist",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn persistence_tri_state() {
        let unset = Cli::try_parse_from(["pushgate", "--service", "1"]).unwrap();
        assert_eq!(unset.persistence(), Persistence::Unset);
        assert_eq!(unset.batch_size, 100);
        assert_eq!(unset.max_payload_bytes, DEFAULT_MAX_PAYLOAD_BYTES);

        let yes = Cli::try_parse_from(["pushgate", "--service", "1", "--persist"]).unwrap();
        assert_eq!(yes.persistence(), Persistence::Persist);

        let no = Cli::try_parse_from(["pushgate", "--service", "1", "--no-persist"]).unwrap();
        assert_eq!(no.persistence(), Persistence::DoNotPersist);
    }

    #[test]
    fn service_is_required() {
        let err = Cli::try_parse_from(["pushgate", "--message", "hi"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }
}
