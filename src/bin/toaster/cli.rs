use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use humantime::parse_duration;
use toaster::ToastKind;

#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug)]
#[command(author, version, about = "Affiche des toasts sur une surface headless et imprime leurs événements", long_about = None)]
pub struct Cli {
    /// Chemin du fichier TOML de réglages communs à tout le service.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Type de toast : info, success, warning ou error.
    #[arg(long, default_value = "info")]
    pub kind: ToastKind,

    /// Titre affiché au-dessus de chaque message.
    #[arg(long)]
    pub title: Option<String>,

    /// Message à afficher ; répéter l'option pour plusieurs toasts.
    #[arg(long = "message", value_name = "TEXT", required = true)]
    pub messages: Vec<String>,

    /// Délai avant fermeture (ex. "3s") ; "0s" garde les toasts jusqu'à interruption.
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Ajoute un bouton de fermeture à chaque toast.
    #[arg(long, action = ArgAction::SetTrue)]
    pub close_button: bool,

    /// Affiche une barre de progression décroissante.
    #[arg(long, action = ArgAction::SetTrue)]
    pub progress_bar: bool,

    /// Ignore un message identique au précédent.
    #[arg(long, action = ArgAction::SetTrue)]
    pub prevent_duplicates: bool,

    /// Clique sur le toast le plus récent après ce délai.
    #[arg(long, value_parser = parse_duration, value_name = "DELAY")]
    pub click_after: Option<Duration>,

    /// Utilise un layer JSON pour les logs (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Filtre de logs explicite (ex. "toaster=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use std::time::Duration;
    use toaster::ToastKind;

    #[test]
    fn repeated_messages_and_durations_parse() {
        let cli = match Cli::try_parse_from([
            "toaster",
            "--kind",
            "warning",
            "--message",
            "one",
            "--message",
            "two",
            "--timeout",
            "2s",
        ]) {
            Ok(cli) => cli,
            Err(err) => panic!("arguments should parse: {err}"),
        };
        assert_eq!(cli.kind, ToastKind::Warning);
        assert_eq!(cli.messages, ["one", "two"]);
        assert_eq!(cli.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn at_least_one_message_is_required() {
        assert!(Cli::try_parse_from(["toaster"]).is_err());
    }
}
