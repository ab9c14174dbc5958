use std::fs::OpenOptions;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{FormatFields, format::Writer},
    layer::{Context, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::{FlowError, LogEntry, Logger};

const DEFAULT_LOG_FILTER: &str = "debug,hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn";

pub(crate) struct GlobalFlowLogger {
    /// Optional external log listener, that can receive a stream of log statements
    pub(crate) log_listener: Option<Box<dyn Logger>>,
}

impl<S> Layer<S> for GlobalFlowLogger
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().level() <= &Level::INFO
            && let Some(s) = self.log_listener.as_ref()
        {
            let mut buf = String::new();
            let writer = Writer::new(&mut buf);

            if tracing_subscriber::fmt::format::DefaultFields::new()
                .format_fields(writer, event)
                .is_ok()
            {
                s.log(LogEntry {
                    line: buf,
                    level: event.metadata().level().to_string(),
                });
            }
        }
    }
}

/// Installs the global tracing subscriber. Fails when the log file cannot be
/// opened or a global subscriber is already set.
pub fn init_logging(
    log_dir: &str,
    app_logger: Option<Box<dyn Logger>>,
    log_filter: Option<String>,
) -> Result<(), FlowError> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(format!("{log_dir}/wallet-flows.log"))
        .map_err(|e| FlowError::Generic(e.to_string()))?;

    let filter = log_filter.unwrap_or(DEFAULT_LOG_FILTER.to_string());
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_line_number(true)
                .with_writer(log_file),
        )
        .with(GlobalFlowLogger {
            log_listener: app_logger,
        });

    subscriber
        .try_init()
        .map_err(|e| FlowError::Generic(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::layer::SubscriberExt;

    use super::GlobalFlowLogger;
    use crate::{LogEntry, Logger};

    struct CollectingLogger(Arc<Mutex<Vec<LogEntry>>>);

    impl Logger for CollectingLogger {
        fn log(&self, l: LogEntry) {
            self.0.lock().unwrap().push(l);
        }
    }

    #[test]
    fn test_forwards_info_and_above() {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(GlobalFlowLogger {
            log_listener: Some(Box::new(CollectingLogger(entries.clone()))),
        });

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden");
            tracing::info!("shown");
            tracing::warn!("also shown");
        });

        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].line, "shown");
        assert_eq!(entries[0].level, "INFO");
        assert_eq!(entries[1].level, "WARN");
    }
}
