use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

use crate::Result;
use crate::error::Error;

const FALLBACK_FILTER: &str = "info";

/// Initialise tracing avec un filtre optionnel et un mode JSON conditionnel.
///
/// Le filtre retenu est le premier valide parmi `explicit_filter`, `RUST_LOG`
/// et `info`.
///
/// # Errors
///
/// Retourne une erreur si aucun filtre n'est valide, si la couche JSON est
/// demandée alors que la fonctionnalité n'est pas compilée, ou si un
/// subscriber global est déjà installé.
pub fn init_tracing(explicit_filter: Option<&str>, use_json: bool) -> Result<()> {
    let filter = select_filter(explicit_filter, std::env::var("RUST_LOG").ok())?;

    #[cfg(feature = "json-logs")]
    if use_json {
        let subscriber = Registry::default().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr)
                .json()
                .flatten_event(true),
        );
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|err| Error::Telemetry(err.to_string()))?;
        return Ok(());
    }

    #[cfg(not(feature = "json-logs"))]
    if use_json {
        return Err(Error::Telemetry(
            "la fonctionnalité `json-logs` n'est pas compilée".to_string(),
        ));
    }

    let subscriber = Registry::default().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr),
    );
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| Error::Telemetry(err.to_string()))
}

fn select_filter(explicit: Option<&str>, from_env: Option<String>) -> Result<EnvFilter> {
    explicit
        .map(str::to_string)
        .into_iter()
        .chain(from_env)
        .chain(std::iter::once(FALLBACK_FILTER.to_string()))
        .find_map(|candidate| EnvFilter::try_new(candidate).ok())
        .ok_or_else(|| Error::Telemetry("invalid log filter".to_string()))
}

#[cfg(test)]
mod tests {
    use super::select_filter;

    #[test]
    fn explicit_filter_wins_over_environment() {
        let filter = match select_filter(Some("toaster=debug"), Some("warn".to_string())) {
            Ok(filter) => filter,
            Err(err) => panic!("filter should parse: {err}"),
        };
        assert_eq!(filter.to_string(), "toaster=debug");
    }

    #[test]
    fn invalid_candidates_fall_back_to_info() {
        let filter = match select_filter(Some("toaster=loud"), Some("app=verbose".to_string())) {
            Ok(filter) => filter,
            Err(err) => panic!("fallback should parse: {err}"),
        };
        assert_eq!(filter.to_string(), "info");
    }
}
